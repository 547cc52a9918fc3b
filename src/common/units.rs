//! Level and time conversions.

use core::time::Duration;
use micromath::F32Ext;

/// The smallest linear amplitude that is converted to decibels. Quieter
/// levels clamp to -200 dB.
const MIN_AMPLITUDE: f32 = 1e-10;

/// A level in decibels, relative to an amplitude of 1, i.e 0 dB
/// corresponds to a level of 1.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Decibel(pub f32);

impl Decibel {
    pub fn from_linear(amplitude: f32) -> Self {
        Decibel(20. * F32Ext::log10(amplitude.max(MIN_AMPLITUDE)))
    }

    pub fn to_linear(self) -> f32 {
        F32Ext::powf(10., self.0 / 20.)
    }
}

/// Returns a (possibly fractional) number of samples spanning `duration`.
pub fn duration_to_samples(duration: Duration, sample_rate: u32) -> f32 {
    duration.as_secs_f32() * (sample_rate as f32)
}

/// Computes `1 - e^-x` for `x >= 0`.
///
/// Smoothing coefficients are typically tiny (a 1 Hz lowpass at 44.1 kHz
/// has a coefficient around 1.4e-4), and evaluating `1 - exp(-x)` with an
/// approximate `exp` cancels almost all significant digits. Small arguments
/// use a truncated Taylor series instead.
pub fn one_minus_exp_neg(x: f32) -> f32 {
    if x < 0.5 {
        x * (1. - x / 2. * (1. - x / 3. * (1. - x / 4. * (1. - x / 5. * (1. - x / 6.)))))
    } else {
        1. - F32Ext::exp(-x)
    }
}

/// The coefficient `a` of a smoother `y += a * (x - y)` with a time constant
/// of `samples` samples. Zero length time constants give an immediate
/// response (`a = 1`).
pub fn smoothing_coefficient(samples: f32) -> f32 {
    if samples <= 0. {
        return 1.;
    }
    one_minus_exp_neg(1. / samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_decibel_conversion() {
        assert_abs_diff_eq!(Decibel(0.).to_linear(), 1., epsilon = 1e-2);
        assert_abs_diff_eq!(Decibel(-6.0206).to_linear(), 0.5, epsilon = 5e-3);
        assert_abs_diff_eq!(Decibel(-36.).to_linear(), 0.015849, epsilon = 3e-4);
        assert_abs_diff_eq!(Decibel::from_linear(0.5).0, -6.0206, epsilon = 0.05);
        assert_abs_diff_eq!(Decibel::from_linear(1.).0, 0., epsilon = 0.05);
    }

    #[test]
    fn test_silence_clamps() {
        assert_abs_diff_eq!(Decibel::from_linear(0.).0, -200., epsilon = 0.5);
    }

    #[test]
    fn test_duration_to_samples() {
        let samples = duration_to_samples(Duration::from_millis(10), 44100);
        assert_abs_diff_eq!(samples, 441., epsilon = 1e-3);
    }

    #[test]
    fn test_one_minus_exp_neg() {
        for i in 0..1000 {
            let x = (i as f64) * 0.005;
            let expected = 1. - (-x).exp();
            let actual = one_minus_exp_neg(x as f32) as f64;
            assert!((expected - actual).abs() <= 1e-2 * expected.max(1e-3));
        }
        // The small argument branch keeps relative precision.
        let x = 1.4247e-4_f64;
        let expected = 1. - (-x).exp();
        let actual = one_minus_exp_neg(x as f32) as f64;
        assert!((expected - actual).abs() / expected <= 1e-5);
    }

    #[test]
    fn test_zero_time_constant() {
        assert_eq!(smoothing_coefficient(0.), 1.);
    }
}
