use thiserror::Error;

/// Result type for fallible construction.
pub type Result<T> = core::result::Result<T, Error>;

/// Configuration errors, reported when an estimator or follower is created.
/// Processing samples never fails.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("sample rate must be greater than 0")]
    ZeroSampleRate,

    #[error("frequency must be a positive, finite number of Hz, got {0}")]
    InvalidFrequency(f32),

    #[error("highest frequency {highest} Hz must be greater than lowest frequency {lowest} Hz")]
    InvertedFrequencyRange { lowest: f32, highest: f32 },

    #[error("highest frequency {highest} Hz exceeds the Nyquist frequency {nyquist} Hz")]
    AboveNyquist { highest: f32, nyquist: f32 },

    /// The lowest frequency is too high (or the sample rate too low) to fill
    /// a usable analysis window.
    #[error("analysis window of {size} bits is smaller than the minimum of {minimum} bits")]
    WindowTooSmall { size: usize, minimum: usize },

    #[error("analysis window of {size} bits is larger than the maximum of {maximum} bits")]
    WindowTooLarge { size: usize, maximum: usize },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid_param(name: &'static str, reason: &'static str) -> Self {
        Error::InvalidParameter { name, reason }
    }
}
