use core::time::Duration;

use crate::common::{duration_to_samples, smoothing_coefficient, Decibel};

/// Follows the peaks of a rectified signal. Rises instantly and falls
/// exponentially with the given release time.
#[derive(Clone, Debug)]
pub struct PeakEnvelopeFollower {
    release: f32,
    y: f32,
}

impl PeakEnvelopeFollower {
    pub fn new(release: Duration, sample_rate: u32) -> Self {
        PeakEnvelopeFollower {
            release: smoothing_coefficient(duration_to_samples(release, sample_rate)),
            y: 0.,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if input > self.y {
            self.y = input;
        } else {
            self.y += self.release * (input - self.y);
        }
        self.y
    }

    pub fn value(&self) -> f32 {
        self.y
    }
}

/// A peak follower with a short response time and no ripple.
///
/// Two peak holders track the input, and every `hold` one of them (in turn)
/// is cleared. The output is the larger of the two, so a peak is held for
/// between one and two hold periods and then dropped at once.
#[derive(Clone, Debug)]
pub struct FastEnvelopeFollower {
    peaks: [f32; 2],
    hold: usize,
    tick: usize,
    next_reset: usize,
}

impl FastEnvelopeFollower {
    pub fn new(hold: Duration, sample_rate: u32) -> Self {
        let hold = duration_to_samples(hold, sample_rate) as usize;
        FastEnvelopeFollower {
            peaks: [0.; 2],
            hold: hold.max(1),
            tick: 0,
            next_reset: 0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.tick += 1;
        if self.tick >= self.hold {
            self.tick = 0;
            self.peaks[self.next_reset] = 0.;
            self.next_reset ^= 1;
        }
        for peak in self.peaks.iter_mut() {
            if input > *peak {
                *peak = input;
            }
        }
        self.value()
    }

    pub fn value(&self) -> f32 {
        self.peaks[0].max(self.peaks[1])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Release,
}

/// Shapes an amplitude envelope into a synthesizer style envelope with
/// attack, decay and release stages.
///
/// While the input is above the output, the output rises toward it with the
/// attack time. Otherwise it falls toward the input with the decay time, until
/// the input drops below the release threshold, after which it falls toward
/// zero with the release time.
#[derive(Clone, Debug)]
pub struct EnvelopeShaper {
    attack: f32,
    decay: f32,
    release: f32,
    release_threshold: f32,
    stage: EnvelopeStage,
    y: f32,
}

impl EnvelopeShaper {
    pub fn new(
        attack: Duration,
        decay: Duration,
        release: Duration,
        release_threshold: Decibel,
        sample_rate: u32,
    ) -> Self {
        let coefficient = |d| smoothing_coefficient(duration_to_samples(d, sample_rate));
        EnvelopeShaper {
            attack: coefficient(attack),
            decay: coefficient(decay),
            release: coefficient(release),
            release_threshold: release_threshold.to_linear(),
            stage: EnvelopeStage::Release,
            y: 0.,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let (stage, target, coefficient) = if input > self.y {
            (EnvelopeStage::Attack, input, self.attack)
        } else if input > self.release_threshold {
            (EnvelopeStage::Decay, input, self.decay)
        } else {
            (EnvelopeStage::Release, 0., self.release)
        };
        self.stage = stage;
        self.y += coefficient * (target - self.y);
        self.y = self.y.clamp(0., 1.);
        self.y
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn value(&self) -> f32 {
        self.y
    }
}
