use micromath::F32Ext;
use tracing::{debug, trace};

use super::{Config, FollowerState};
use crate::bacf::PeriodEstimator;
use crate::common::{freq_to_midi_note, Decibel, RingBuffer};
use crate::dynamics::{
    hard_clip, BandLimiter, EnvelopeShaper, FastEnvelopeFollower, GainComputer,
    OnePoleLowpass, PeakEnvelopeFollower, SoftKneeCompressor, WindowComparator,
};
use crate::error::Result;

/// The default bit stream hysteresis, an amplitude of -60 dB.
pub const DEFAULT_THRESHOLD: f32 = 0.001;

/// The number of recent frequencies kept for bridging octave jumps and gaps.
const TAIL_CAPACITY: usize = 4;

/// Cutoff of the lowpass filter smoothing frequency changes, in Hz.
const TAIL_CUTOFF: f32 = 1.;

/// Relative distance to the estimate below which an octave glide ends.
const SMOOTHING_TOLERANCE: f32 = 0.015;

/// Follows the pitch and amplitude envelope of a monophonic signal, one sample at
/// a time.
///
/// The input is band limited to the detection range, gated, compressed and
/// passed to a [`PeriodEstimator`]. While a note is playing, the estimator's
/// frequency is reported, smoothed when it jumps by an octave. Between notes
/// the last frequency is held and slowly glides toward recent values, so
/// once a frequency has been detected the reported frequency never returns to 0.
///
/// ```
/// use micropitch::{Config, FollowerState, PitchFollower};
/// use micropitch::common::Decibel;
///
/// let config = Config {
///     note_threshold: Decibel(-30.0),
///     ..Default::default()
/// };
/// let mut follower = PitchFollower::from_options(config, 50.0, 800.0, 48000, 0.001).unwrap();
/// let mut buffer = [0.0; 512];
/// follower.process_buffer(&mut buffer);
/// assert_eq!(follower.state(), FollowerState::Idle);
/// assert_eq!(follower.frequency(), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct PitchFollower {
    band_limiter: BandLimiter,
    envelope_follower: PeakEnvelopeFollower,
    fast_envelope_follower: FastEnvelopeFollower,
    envelope_shaper: EnvelopeShaper,
    compressor: SoftKneeCompressor,
    gate: WindowComparator,
    estimator: PeriodEstimator,

    makeup_gain: f32,
    note_threshold: f32,
    envelope: f32,
    frequency: f32,
    state: FollowerState,

    tail: RingBuffer,
    tail_lowpass: OnePoleLowpass,
    /// True while gliding toward the estimate after an octave jump.
    smoothing: bool,
    /// Consecutive samples without a note, up to one window.
    silence_count: usize,
}

impl PitchFollower {
    /// Creates a follower for frequencies between `lowest_freq` and `highest_freq`
    /// Hz using the default configuration.
    pub fn new(lowest_freq: f32, highest_freq: f32, sample_rate: u32) -> Result<Self> {
        PitchFollower::from_options(
            Config::default(),
            lowest_freq,
            highest_freq,
            sample_rate,
            DEFAULT_THRESHOLD,
        )
    }

    /// Creates a follower with custom settings. `threshold` is the amplitude a
    /// conditioned sample must exceed (in either direction) to flip the bit stream.
    pub fn from_options(
        config: Config,
        lowest_freq: f32,
        highest_freq: f32,
        sample_rate: u32,
        threshold: f32,
    ) -> Result<Self> {
        config.validate()?;
        let estimator = PeriodEstimator::new(lowest_freq, highest_freq, sample_rate, threshold)?;

        debug!(
            lowest_freq,
            highest_freq,
            sample_rate,
            window_size = estimator.window().size(),
            min_period = estimator.window().min_period(),
            gate_on = config.gate_on_threshold.0,
            gate_off = config.gate_off_threshold.0,
            note_threshold = config.note_threshold.0,
            "created pitch follower"
        );

        Ok(PitchFollower {
            band_limiter: BandLimiter::new(lowest_freq, highest_freq, sample_rate),
            envelope_follower: PeakEnvelopeFollower::new(config.comp_release, sample_rate),
            fast_envelope_follower: FastEnvelopeFollower::new(config.env_hold, sample_rate),
            envelope_shaper: EnvelopeShaper::new(
                config.attack,
                config.decay,
                config.release,
                config.release_threshold,
                sample_rate,
            ),
            compressor: SoftKneeCompressor::new(
                config.comp_threshold,
                config.comp_width,
                config.comp_slope,
            ),
            gate: WindowComparator::new(
                config.gate_off_threshold.to_linear(),
                config.gate_on_threshold.to_linear(),
            ),
            estimator,
            makeup_gain: config.comp_gain,
            note_threshold: config.note_threshold.to_linear(),
            envelope: 0.,
            frequency: 0.,
            state: FollowerState::Idle,
            tail: RingBuffer::new(TAIL_CAPACITY),
            tail_lowpass: OnePoleLowpass::new(TAIL_CUTOFF, sample_rate),
            smoothing: false,
            silence_count: 0,
        })
    }

    /// Processes one sample and returns the conditioned (band limited, gated and
    /// compressed) sample.
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut s = self.band_limiter.process(sample);

        let env = self.envelope_follower.process(F32Ext::abs(s));
        if self.gate.process(env) {
            let gain = self.compressor.gain(Decibel::from_linear(env)).to_linear();
            s = hard_clip(s * gain * self.makeup_gain);
        } else {
            s = 0.;
        }

        let ready = self.estimator.process(s);

        let note_env = self.fast_envelope_follower.process(F32Ext::abs(s));
        let state = if note_env > self.note_threshold {
            self.track(ready);
            FollowerState::Tracking
        } else {
            self.hold()
        };
        self.set_state(state);

        self.envelope = self.envelope_shaper.process(note_env);
        s
    }

    /// Processes a buffer in place, replacing each sample with its conditioned
    /// counterpart.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// The synthesized amplitude envelope, between 0 and 1.
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// The current frequency in Hz, 0 until a note has been detected.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// The current frequency as a fractional MIDI note number, if any.
    pub fn midi_note_number(&self) -> Option<f32> {
        if self.frequency > 0. {
            Some(freq_to_midi_note(self.frequency))
        } else {
            None
        }
    }

    pub fn state(&self) -> FollowerState {
        self.state
    }

    pub fn estimator(&self) -> &PeriodEstimator {
        &self.estimator
    }

    pub fn sample_rate(&self) -> u32 {
        self.estimator.sample_rate()
    }

    fn track(&mut self, ready: bool) {
        let previous = self.frequency;
        let mut f = self.estimator.frequency();
        if f == 0. {
            f = self.estimator.predict_frequency();
        }

        let half_cycle = self.estimator.is_half_cycle();
        if half_cycle && !self.smoothing {
            // Glide from the frequency before the jump instead of following it
            self.tail_lowpass.set(if previous > 0. { previous } else { f });
            self.smoothing = true;
        }

        if self.smoothing {
            if f > 0. {
                self.frequency = self.tail_lowpass.process(f);
                if F32Ext::abs(self.frequency - f) <= SMOOTHING_TOLERANCE * f {
                    self.smoothing = false;
                }
            }
        } else if f > 0. {
            self.frequency = f;
        }

        if half_cycle && ready && self.frequency > 0. {
            self.tail.push(self.frequency);
        }

        self.silence_count = 0;
    }

    fn hold(&mut self) -> FollowerState {
        self.silence_count += 1;
        if self.silence_count >= self.estimator.window().size() {
            self.silence_count = 0;
            if self.frequency > 0. {
                let current = self.frequency;
                let target = self.tail.newest().unwrap_or(current);
                if self.state != FollowerState::Decaying || self.tail_lowpass.value() == 0. {
                    self.tail_lowpass.set(current);
                }
                self.smoothing = false;
                self.frequency = self.tail_lowpass.process(target);
                self.tail.push(current);
                return FollowerState::Decaying;
            }
        }

        if self.state == FollowerState::Decaying {
            FollowerState::Decaying
        } else if self.gate.is_on() {
            FollowerState::Gated
        } else {
            FollowerState::Idle
        }
    }

    fn set_state(&mut self, state: FollowerState) {
        if state != self.state {
            trace!(from = ?self.state, to = ?state, frequency = self.frequency, "state change");
            self.state = state;
        }
    }
}
