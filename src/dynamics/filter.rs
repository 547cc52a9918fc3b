use crate::common::one_minus_exp_neg;

/// A one pole [lowpass filter](https://en.wikipedia.org/wiki/Low-pass_filter#Simple_infinite_impulse_response_filter),
/// `y += a * (x - y)` with `a = 1 - e^(-2π fc / fs)`.
#[derive(Clone, Debug)]
pub struct OnePoleLowpass {
    a: f32,
    y: f32,
}

impl OnePoleLowpass {
    pub fn new(cutoff: f32, sample_rate: u32) -> Self {
        let x = 2. * core::f32::consts::PI * cutoff / sample_rate as f32;
        OnePoleLowpass {
            a: one_minus_exp_neg(x),
            y: 0.,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.y += self.a * (input - self.y);
        self.y
    }

    /// Overwrites the filter state, i.e the current output.
    pub fn set(&mut self, value: f32) {
        self.y = value;
    }

    pub fn value(&self) -> f32 {
        self.y
    }
}

/// A first order band pass made of two lowpass filters. The input is lowpassed
/// at the highest frequency and the result of lowpassing that at the lowest
/// frequency is subtracted.
#[derive(Clone, Debug)]
pub struct BandLimiter {
    upper: OnePoleLowpass,
    lower: OnePoleLowpass,
}

impl BandLimiter {
    pub fn new(lowest_freq: f32, highest_freq: f32, sample_rate: u32) -> Self {
        BandLimiter {
            upper: OnePoleLowpass::new(highest_freq, sample_rate),
            lower: OnePoleLowpass::new(lowest_freq, sample_rate),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let s = self.upper.process(input);
        s - self.lower.process(s)
    }
}
