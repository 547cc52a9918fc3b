use micromath::F32Ext;

use crate::common::Decibel;

/// Maps an envelope level to a gain.
pub trait GainComputer {
    /// Returns the gain to apply to a signal with the given envelope level.
    fn gain(&self, envelope: Decibel) -> Decibel;
}

/// A [dynamic range compressor](https://en.wikipedia.org/wiki/Dynamic_range_compression)
/// gain computer with a soft knee.
///
/// Levels well below `threshold` pass unchanged and levels well above it
/// are reduced by `slope` (the inverse of the compression ratio). Within
/// `width` dB around the threshold, a quadratic curve joins the two segments.
#[derive(Clone, Debug)]
pub struct SoftKneeCompressor {
    threshold: f32,
    width: f32,
    slope: f32,
}

impl SoftKneeCompressor {
    pub fn new(threshold: Decibel, width: Decibel, slope: f32) -> Self {
        SoftKneeCompressor {
            threshold: threshold.0,
            width: width.0,
            slope,
        }
    }

    /// The output level for a given input level.
    pub fn level(&self, input: Decibel) -> Decibel {
        let x = input.0;
        let over = x - self.threshold;
        let w = self.width;
        if 2. * over < -w {
            input
        } else if w > 0. && 2. * F32Ext::abs(over) <= w {
            let t = over + w / 2.;
            Decibel(x + (self.slope - 1.) * t * t / (2. * w))
        } else {
            Decibel(self.threshold + over * self.slope)
        }
    }
}

impl GainComputer for SoftKneeCompressor {
    fn gain(&self, envelope: Decibel) -> Decibel {
        Decibel(self.level(envelope).0 - envelope.0)
    }
}

/// Limits a sample to [-1, 1].
#[inline]
pub fn hard_clip(sample: f32) -> f32 {
    sample.clamp(-1., 1.)
}
