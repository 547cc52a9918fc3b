use micromath::F32Ext;
use tracing::{debug, trace};

use super::engine::{validate_range, Bacf, BacfInfo};
use super::zero_crossing::ZeroCrossing;
use crate::common::{BitBuffer, BitStorage};
use crate::error::{Error, Result};

/// Windows with a periodicity below this value are rejected.
pub const MIN_PERIODICITY: f32 = 0.8;

/// How far above the minimum count, as a fraction of the maximum count,
/// a sub-multiple of the best lag may be and still be taken as the period.
pub const HARMONIC_TOLERANCE: f32 = 0.05;

/// Relative tolerance when comparing a frequency to an octave of another.
pub const OCTAVE_TOLERANCE: f32 = 0.06;

/// Estimates the fundamental frequency of a signal one window at a time.
///
/// Samples are converted to bits by a zero crossing tracker and fed to a
/// [`Bacf`]. When a window completes, the best lag is checked for
/// periodicity, corrected for landing on a multiple of the period and
/// converted to a frequency. Between windows, the distance between falling
/// edges gives a rough prediction.
#[derive(Clone, Debug)]
pub struct PeriodEstimator<S = BitBuffer> {
    bacf: Bacf<S>,
    zero_crossing: ZeroCrossing,
    sample_rate: u32,
    frequency: f32,
    /// The frequency of the last window that passed the periodicity check.
    confident_frequency: f32,
    periodicity: f32,
    half_cycle: bool,
}

fn validate_threshold(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(Error::invalid_param(
            "threshold",
            "must be a finite, non-negative amplitude",
        ));
    }
    Ok(())
}

impl PeriodEstimator<BitBuffer> {
    /// Creates an estimator for frequencies between `lowest_freq` and
    /// `highest_freq`. Samples within `threshold` of zero do not change the
    /// bit stream.
    pub fn new(
        lowest_freq: f32,
        highest_freq: f32,
        sample_rate: u32,
        threshold: f32,
    ) -> Result<Self> {
        validate_range(lowest_freq, highest_freq, sample_rate)?;
        let bacf = Bacf::new(lowest_freq, highest_freq, sample_rate)?;
        PeriodEstimator::with_engine(bacf, sample_rate, threshold)
    }
}

impl<S: BitStorage> PeriodEstimator<S> {
    pub fn with_engine(bacf: Bacf<S>, sample_rate: u32, threshold: f32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::ZeroSampleRate);
        }
        validate_threshold(threshold)?;

        debug!(
            window_size = bacf.size(),
            min_period = bacf.min_period(),
            sample_rate,
            threshold,
            "created period estimator"
        );

        let zero_crossing = ZeroCrossing::new(threshold, bacf.min_period(), bacf.size() / 2);
        Ok(PeriodEstimator {
            bacf,
            zero_crossing,
            sample_rate,
            frequency: 0.0,
            confident_frequency: 0.0,
            periodicity: 0.0,
            half_cycle: false,
        })
    }

    /// Processes one sample. Returns true if the sample completed a window,
    /// in which case the frequency, periodicity and half cycle flag have been
    /// updated.
    pub fn process(&mut self, sample: f32) -> bool {
        let bit = self.zero_crossing.update(sample);
        if self.bacf.push(bit) {
            self.evaluate();
            return true;
        }
        false
    }

    /// The frequency of the last window, or 0 if it was not periodic enough
    /// or no window has completed yet.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// A frequency estimate from the two most recent falling edge intervals,
    /// available before a window completes. Returns 0 if the intervals
    /// disagree, the last edge is too old or the interval is out of range.
    pub fn predict_frequency(&self) -> f32 {
        match self.zero_crossing.stable_period() {
            Some(period) => self.sample_rate as f32 / period as f32,
            None => 0.0,
        }
    }

    /// True if the last window's frequency is an octave above or below the
    /// frequency of the window before it, i.e the period estimate may have
    /// jumped to a multiple or a half of the true period.
    pub fn is_half_cycle(&self) -> bool {
        self.half_cycle
    }

    /// How periodic the last window was, from 0 (no periodicity) to 1.
    pub fn periodicity(&self) -> f32 {
        self.periodicity
    }

    pub fn window(&self) -> &Bacf<S> {
        &self.bacf
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn evaluate(&mut self) {
        let info = self.bacf.result();
        self.periodicity = if info.max_count == 0 {
            0.0
        } else {
            1.0 - info.min_count as f32 / info.max_count as f32
        };

        if info.max_count == 0 || self.periodicity < MIN_PERIODICITY {
            self.frequency = 0.0;
            self.half_cycle = false;
            trace!(periodicity = self.periodicity, "rejected window");
            return;
        }

        let period = refine_period(info, self.bacf.min_period());

        // A periodic bit stream falls once per period at least. Fewer edges
        // mean part of the window was constant, e.g silence before an onset.
        let expected_edges = (self.bacf.size() as f32 / period) as usize;
        if info.falling_edges + 1 < expected_edges {
            self.frequency = 0.0;
            self.half_cycle = false;
            trace!(
                period,
                falling_edges = info.falling_edges,
                "rejected window with too few edges"
            );
            return;
        }

        let frequency = self.sample_rate as f32 / period;
        self.half_cycle =
            self.confident_frequency > 0.0 && is_octave_apart(frequency, self.confident_frequency);
        self.frequency = frequency;
        self.confident_frequency = frequency;

        trace!(
            lag = info.estimated_lag,
            period,
            frequency,
            periodicity = self.periodicity,
            half_cycle = self.half_cycle,
            "evaluated window"
        );
    }
}

/// Returns the period in (fractional) samples for the best lag of a sweep.
///
/// A periodic signal has a near zero count at every multiple of its period
/// and the minimum may land on any of them. The shortest sub-multiple of the
/// best lag whose count is close enough to the minimum is taken instead.
fn refine_period(info: &BacfInfo, min_period: usize) -> f32 {
    let lag = info.estimated_lag;
    let last_lag = info.correlation.len() - 1;
    let max_accepted =
        info.min_count as f32 + HARMONIC_TOLERANCE * info.max_count as f32;

    for divisor in (2..=lag / min_period).rev() {
        let candidate = lag as f32 / divisor as f32;
        let nearest = F32Ext::round(candidate) as usize;
        let first = core::cmp::max(nearest.saturating_sub(1), min_period);
        let last = core::cmp::min(nearest + 1, last_lag);
        let best = info.correlation[first..=last]
            .iter()
            .copied()
            .min()
            .unwrap_or(u16::MAX);
        if best as f32 <= max_accepted {
            return candidate;
        }
    }
    lag as f32
}

fn is_octave_apart(frequency: f32, reference: f32) -> bool {
    let ratio = frequency / reference;
    F32Ext::abs(ratio - 2.0) <= 2.0 * OCTAVE_TOLERANCE
        || F32Ext::abs(ratio - 0.5) <= 0.5 * OCTAVE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const SAMPLE_RATE: u32 = 44100;

    /// Returns a sine generator that keeps its phase when the frequency changes.
    fn sine(sample_rate: u32) -> impl FnMut(f32) -> f32 {
        let mut phase = 0.0_f32;
        move |freq| {
            let value = (2.0 * core::f32::consts::PI * phase).sin();
            phase = (phase + freq / sample_rate as f32).fract();
            value
        }
    }

    fn estimator() -> PeriodEstimator {
        PeriodEstimator::new(80.0, 1000.0, SAMPLE_RATE, 0.001).unwrap()
    }

    #[test]
    fn test_sine_period() {
        for freq in [82.41_f32, 110.0, 196.0, 220.0, 329.63, 440.0, 659.26, 880.0] {
            let mut estimator = estimator();
            let mut generator = sine(SAMPLE_RATE);
            let mut windows = 0;
            while windows < 3 {
                if estimator.process(0.5 * generator(freq)) {
                    windows += 1;
                }
            }
            let true_period = SAMPLE_RATE as f32 / freq;
            let period = SAMPLE_RATE as f32 / estimator.frequency();
            assert!(
                (period - true_period).abs() <= 1.0,
                "expected period {} for {} Hz, got {}",
                true_period,
                freq,
                period
            );
            assert!(estimator.periodicity() >= MIN_PERIODICITY);
            assert!(!estimator.is_half_cycle());
        }
    }

    #[test]
    fn test_noise_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut estimator = estimator();
        let mut windows = 0;
        while windows < 10 {
            if estimator.process(rng.gen_range(-1.0..1.0)) {
                windows += 1;
                assert_eq!(estimator.frequency(), 0.0);
                assert!(estimator.periodicity() < MIN_PERIODICITY);
            }
        }
    }

    #[test]
    fn test_silence() {
        let mut estimator = estimator();
        for _ in 0..4 * estimator.window().size() {
            estimator.process(0.0);
        }
        assert_eq!(estimator.frequency(), 0.0);
        assert_eq!(estimator.predict_frequency(), 0.0);
        assert_eq!(estimator.periodicity(), 0.0);
    }

    #[test]
    fn test_prediction_before_first_window() {
        let mut estimator = estimator();
        let mut generator = sine(SAMPLE_RATE);
        for _ in 0..1000 {
            assert!(!estimator.process(0.5 * generator(220.0)));
        }
        assert_eq!(estimator.frequency(), 0.0);
        let predicted = estimator.predict_frequency();
        assert!((predicted - 220.0).abs() <= 2.0, "predicted {}", predicted);
    }

    #[test]
    fn test_octave_jump_raises_half_cycle() {
        let mut estimator = estimator();
        let mut generator = sine(SAMPLE_RATE);
        for _ in 0..SAMPLE_RATE / 2 {
            estimator.process(0.5 * generator(220.0));
        }
        assert!(!estimator.is_half_cycle());

        let mut half_cycle_windows = 0;
        for _ in 0..SAMPLE_RATE / 2 {
            if estimator.process(0.5 * generator(440.0)) && estimator.is_half_cycle() {
                half_cycle_windows += 1;
            }
        }
        assert!(half_cycle_windows >= 1);
        // The flag only lasts for the window that jumped
        assert!(!estimator.is_half_cycle());
        assert!((estimator.frequency() - 440.0).abs() <= 5.0);
    }

    #[test]
    fn test_refines_multiple_of_period() {
        // Zero counts at 20, 40 and 60 with the minimum reported at 40
        let mut correlation = vec![500_u16; 128];
        for lag in [20, 40, 60] {
            correlation[lag] = 0;
        }
        let info = BacfInfo {
            correlation: correlation.into_boxed_slice(),
            max_count: 500,
            min_count: 0,
            estimated_lag: 40,
            falling_edges: 12,
        };
        assert_eq!(refine_period(&info, 4), 20.0);

        // Nothing but the lag itself matches
        let mut correlation = vec![500_u16; 128];
        correlation[33] = 0;
        let info = BacfInfo {
            correlation: correlation.into_boxed_slice(),
            max_count: 500,
            min_count: 0,
            estimated_lag: 33,
            falling_edges: 7,
        };
        assert_eq!(refine_period(&info, 4), 33.0);
    }

    #[test]
    fn test_onset_after_silence() {
        let mut estimator = estimator();
        let size = estimator.window().size();
        let mut generator = sine(SAMPLE_RATE);
        // The first window is mostly silence, with a note starting near its end
        let onset = size - 300;
        let mut windows = 0;
        for i in 0..3 * size {
            let s = if i < onset { 0.0 } else { 0.5 * generator(220.0) };
            if estimator.process(s) {
                windows += 1;
                let f = estimator.frequency();
                assert!(f == 0.0 || (f - 220.0).abs() <= 2.0, "window {} gave {} Hz", windows, f);
            }
        }
        assert!((estimator.frequency() - 220.0).abs() <= 2.0);
    }

    #[test]
    fn test_octave_comparison() {
        assert!(is_octave_apart(440.0, 220.0));
        assert!(is_octave_apart(110.0, 220.0));
        assert!(is_octave_apart(450.0, 220.0));
        assert!(!is_octave_apart(330.0, 220.0));
        assert!(!is_octave_apart(220.0, 220.0));
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(PeriodEstimator::new(80.0, 1000.0, SAMPLE_RATE, -1.0).is_err());
        assert!(PeriodEstimator::new(80.0, 1000.0, SAMPLE_RATE, f32::NAN).is_err());
        assert_eq!(
            PeriodEstimator::new(80.0, 1000.0, 0, 0.001).unwrap_err(),
            Error::ZeroSampleRate
        );
    }
}
