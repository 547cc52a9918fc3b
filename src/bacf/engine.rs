use alloc::{boxed::Box, vec};

use micromath::F32Ext;
use tracing::trace;

use crate::common::{BitBuffer, BitStorage, WORD_BITS};
use crate::error::{Error, Result};

/// The smallest supported window size in bits. The half window compared
/// against its shifted copies must hold at least one storage word.
pub const MIN_WINDOW_SIZE: usize = 2 * WORD_BITS;

/// The largest supported window size in bits. Correlogram counts never
/// exceed half the window size and are stored as `u16`.
pub const MAX_WINDOW_SIZE: usize = 1 << 16;

/// The outcome of the most recent correlation sweep.
#[derive(Clone, Debug)]
pub struct BacfInfo {
    /// The number of differing bits between the window and itself shifted by
    /// a given lag, indexed by lag. Lags below the minimum period are not
    /// computed and stay zero.
    pub correlation: Box<[u16]>,
    /// The largest count of the sweep.
    pub max_count: u16,
    /// The smallest count of the sweep.
    pub min_count: u16,
    /// The lag with the smallest count. Ties resolve to the shortest lag.
    pub estimated_lag: usize,
    /// The number of falling edges within the window.
    pub falling_edges: usize,
}

/// Bitstream autocorrelation.
///
/// Collects windows of single bit samples and computes a correlogram for each
/// completed window. Every window starts on a falling edge, i.e the first
/// bit of a window is always `false`.
#[derive(Clone, Debug)]
pub struct Bacf<S = BitBuffer> {
    bits: S,
    /// The number of bits written to the current window.
    count: usize,
    falling_edges: usize,
    min_period: usize,
    info: BacfInfo,
}

/// Returns the analysis window size, in bits, needed to fit two periods of
/// `lowest_freq`: the smallest power of two not less than twice the
/// period in samples, rounded up.
pub fn window_size(lowest_freq: f32, sample_rate: u32) -> usize {
    let period = F32Ext::ceil(sample_rate as f32 / lowest_freq) as usize;
    (2 * period).next_power_of_two()
}

/// Returns the shortest lag, in samples, considered when searching for
/// the period: the period of `highest_freq`, rounded down.
pub fn min_period(highest_freq: f32, sample_rate: u32) -> usize {
    F32Ext::floor(sample_rate as f32 / highest_freq) as usize
}

/// Checks that a detection range and sample rate make sense together.
pub(crate) fn validate_range(lowest_freq: f32, highest_freq: f32, sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(Error::ZeroSampleRate);
    }
    for freq in [lowest_freq, highest_freq] {
        if !freq.is_finite() || freq <= 0.0 {
            return Err(Error::InvalidFrequency(freq));
        }
    }
    if highest_freq <= lowest_freq {
        return Err(Error::InvertedFrequencyRange {
            lowest: lowest_freq,
            highest: highest_freq,
        });
    }
    let nyquist = 0.5 * sample_rate as f32;
    if highest_freq > nyquist {
        return Err(Error::AboveNyquist {
            highest: highest_freq,
            nyquist,
        });
    }
    Ok(())
}

impl Bacf<BitBuffer> {
    /// Creates an instance detecting periods of frequencies between
    /// `lowest_freq` and `highest_freq` Hz.
    pub fn new(lowest_freq: f32, highest_freq: f32, sample_rate: u32) -> Result<Self> {
        validate_range(lowest_freq, highest_freq, sample_rate)?;
        let size = window_size(lowest_freq, sample_rate);
        validate_window_size(size)?;
        Bacf::with_storage(BitBuffer::new(size), min_period(highest_freq, sample_rate))
    }
}

fn validate_window_size(size: usize) -> Result<()> {
    if size < MIN_WINDOW_SIZE {
        return Err(Error::WindowTooSmall {
            size,
            minimum: MIN_WINDOW_SIZE,
        });
    }
    if size > MAX_WINDOW_SIZE {
        return Err(Error::WindowTooLarge {
            size,
            maximum: MAX_WINDOW_SIZE,
        });
    }
    Ok(())
}

impl<S: BitStorage> Bacf<S> {
    /// Creates an instance using the provided bit storage as window. Lags from
    /// `min_period` up to half the storage size are searched.
    pub fn with_storage(bits: S, min_period: usize) -> Result<Self> {
        let size = bits.size();
        validate_window_size(size)?;
        if min_period == 0 || min_period >= size / 2 {
            return Err(Error::invalid_param(
                "min_period",
                "must be greater than 0 and less than half the window size",
            ));
        }

        Ok(Bacf {
            bits,
            count: 0,
            falling_edges: 0,
            min_period,
            info: BacfInfo {
                correlation: vec![0; size / 2].into_boxed_slice(),
                max_count: 0,
                min_count: 0,
                estimated_lag: min_period,
                falling_edges: 0,
            },
        })
    }

    /// The window size in bits.
    pub fn size(&self) -> usize {
        self.bits.size()
    }

    /// The shortest lag searched.
    pub fn min_period(&self) -> usize {
        self.min_period
    }

    /// Returns true if no bits of the next window have been collected yet.
    pub fn is_start(&self) -> bool {
        self.count == 0
    }

    /// Returns the result of the most recently completed window.
    pub fn result(&self) -> &BacfInfo {
        &self.info
    }

    /// Appends a bit to the current window. Returns true if the bit completed
    /// the window, in which case a new correlogram is available from
    /// [`result`](Self::result).
    pub fn push(&mut self, bit: bool) -> bool {
        // Wait for a falling edge before starting a window
        if self.count == 0 && bit {
            return false;
        }

        if self.count > 0 && !bit && self.bits.get(self.count - 1) {
            self.falling_edges += 1;
        }
        self.bits.set(self.count, bit);
        self.count += 1;

        if self.count == self.bits.size() {
            self.info.falling_edges = self.falling_edges;
            self.correlate();
            self.count = 0;
            self.falling_edges = 0;
            return true;
        }
        false
    }

    fn correlate(&mut self) {
        let bits = &self.bits;
        let info = &mut self.info;
        info.max_count = 0;
        info.min_count = u16::MAX;
        info.estimated_lag = self.min_period;

        for lag in self.min_period..bits.size() / 2 {
            let count = bits.shifted_distance(lag) as u16;
            info.correlation[lag] = count;
            if count > info.max_count {
                info.max_count = count;
            }
            if count < info.min_count {
                info.min_count = count;
                info.estimated_lag = lag;
            }
        }

        trace!(
            lag = info.estimated_lag,
            falling_edges = info.falling_edges,
            min_count = info.min_count,
            max_count = info.max_count,
            "bacf window complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(bacf: &mut Bacf, bits: impl Iterator<Item = bool>) -> usize {
        bits.filter(|bit| bacf.push(*bit)).count()
    }

    #[test]
    fn test_window_size_and_min_period() {
        for sample_rate in [8000, 22050, 44100, 48000, 96000] {
            for lowest in [30.0_f32, 55.0, 80.0, 100.0, 220.0] {
                let size = window_size(lowest, sample_rate);
                let two_periods = 2 * (sample_rate as f64 / lowest as f64).ceil() as usize;
                assert!(size.is_power_of_two());
                assert!(size >= two_periods);
                assert!(size / 2 < two_periods);
            }
            for highest in [500.0_f32, 1000.0, 1500.0] {
                let expected = (sample_rate as f64 / highest as f64).floor() as usize;
                assert_eq!(min_period(highest, sample_rate), expected);
            }
        }
        assert_eq!(window_size(80.0, 44100), 2048);
        assert_eq!(min_period(1000.0, 44100), 44);
    }

    #[test]
    fn test_periodic_pattern() {
        // 256 bit window, lags 4..128
        let mut bacf = Bacf::new(10.0, 250.0, 1000).unwrap();
        assert_eq!(bacf.size(), 256);
        assert_eq!(bacf.min_period(), 4);

        for period in [5, 17, 20, 33, 64] {
            let pattern = (0..256).map(|i| (i % period) >= period / 2);
            assert_eq!(push_all(&mut bacf, pattern), 1);

            let info = bacf.result();
            assert_eq!(info.min_count, 0);
            assert_eq!(info.estimated_lag, period);
            assert_eq!(info.correlation[period], 0);
            assert!(info.max_count > 0);
            assert_eq!(info.falling_edges, 255 / period);
            assert!(bacf.is_start());
        }
    }

    #[test]
    fn test_waits_for_falling_edge() {
        let mut bacf = Bacf::new(10.0, 250.0, 1000).unwrap();
        for _ in 0..1000 {
            assert!(!bacf.push(true));
            assert!(bacf.is_start());
        }
        assert!(!bacf.push(false));
        assert!(!bacf.is_start());
        // High bits are accepted once the window has started
        assert!(!bacf.push(true));
    }

    #[test]
    fn test_ready_once_per_window() {
        let mut bacf = Bacf::new(10.0, 250.0, 1000).unwrap();
        // A pattern that starts every window on a low bit
        let pattern = (0..3 * 256).map(|i| (i % 16) >= 8);
        assert_eq!(push_all(&mut bacf, pattern), 3);
    }

    #[test]
    fn test_max_count_comes_from_sweep() {
        let mut bacf = Bacf::new(10.0, 250.0, 1000).unwrap();
        // High bits in the middle of a window leave the previous result untouched
        bacf.push(false);
        for _ in 0..100 {
            bacf.push(true);
        }
        assert_eq!(bacf.result().max_count, 0);

        // A constant window has no differing bits at any lag
        let mut bacf = Bacf::new(10.0, 250.0, 1000).unwrap();
        assert_eq!(push_all(&mut bacf, (0..256).map(|_| false)), 1);
        assert_eq!(bacf.result().max_count, 0);
        assert_eq!(bacf.result().min_count, 0);
        assert_eq!(bacf.result().estimated_lag, 4);
    }

    #[test]
    fn test_lag_stays_in_range() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(42);
        let mut bacf = Bacf::new(80.0, 1000.0, 44100).unwrap();
        let mut windows = 0;
        for _ in 0..10 * bacf.size() {
            if bacf.push(rng.gen::<bool>()) {
                windows += 1;
                let lag = bacf.result().estimated_lag;
                assert!(lag >= bacf.min_period() && lag < bacf.size() / 2);
            }
        }
        assert!(windows >= 8);
    }

    #[test]
    fn test_invalid_configuration() {
        assert_eq!(Bacf::new(80.0, 1000.0, 0).unwrap_err(), Error::ZeroSampleRate);
        assert_eq!(
            Bacf::new(1000.0, 80.0, 44100).unwrap_err(),
            Error::InvertedFrequencyRange {
                lowest: 1000.0,
                highest: 80.0
            }
        );
        assert_eq!(
            Bacf::new(0.0, 80.0, 44100).unwrap_err(),
            Error::InvalidFrequency(0.0)
        );
        assert!(matches!(
            Bacf::new(80.0, 30000.0, 44100),
            Err(Error::AboveNyquist { .. })
        ));
        assert!(matches!(
            Bacf::new(10.0, 40.0, 100),
            Err(Error::WindowTooSmall { .. })
        ));
        assert!(matches!(
            Bacf::new(0.5, 1000.0, 44100),
            Err(Error::WindowTooLarge { .. })
        ));
        assert!(Bacf::with_storage(BitBuffer::new(256), 128).is_err());
        assert!(Bacf::with_storage(BitBuffer::new(256), 0).is_err());
    }
}
