//! Bitstream autocorrelation (BACF) period estimation.
//!
//! Each sample is reduced to a single bit (is the signal above or below zero?), and windows of
//! bits are compared to shifted copies of themselves using XOR and population count. The lag
//! giving the fewest differing bits is the period candidate. Compared to regular autocorrelation
//! this is cheap enough to run continuously on every incoming sample.
//!
//! * [`Bacf`] collects windows and computes correlograms.
//! * [`PeriodEstimator`] turns correlograms into frequencies and flags octave jumps.
//! * [`ZeroCrossing`] produces the bit stream and a rough period from edge intervals.
//!
//! # Examples
//!
//! ```
//! use micropitch::bacf::PeriodEstimator;
//!
//! let sample_rate = 44100;
//! let mut estimator = PeriodEstimator::new(80.0, 1000.0, sample_rate, 0.001).unwrap();
//!
//! let mut windows = 0;
//! let mut i = 0;
//! while windows < 2 {
//!     let t = i as f32 / sample_rate as f32;
//!     if estimator.process((2.0 * core::f32::consts::PI * 440.0 * t).sin()) {
//!         windows += 1;
//!     }
//!     i += 1;
//! }
//! assert!((estimator.frequency() - 440.0).abs() < 5.0);
//! ```

mod engine;
mod estimator;
mod zero_crossing;

pub use engine::{min_period, window_size, Bacf, BacfInfo, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
pub use estimator::{PeriodEstimator, HARMONIC_TOLERANCE, MIN_PERIODICITY, OCTAVE_TOLERANCE};
pub use zero_crossing::ZeroCrossing;
