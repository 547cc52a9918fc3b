//! A real time, single voice [pitch](https://en.wikipedia.org/wiki/Pitch_%28music%29) follower
//! built around bitstream autocorrelation (BACF).
//!
//! Every incoming sample is reduced to a single bit, and the periodicity of a window
//! of bits is measured by XOR-ing the window with shifted copies of itself and counting
//! the differing bits. This is a lot cheaper than full precision autocorrelation, which
//! makes it possible to track pitch sample by sample inside an audio callback. The
//! follower wraps the estimator with band limiting, gating and compression, and smooths
//! over octave errors and silence so that the reported frequency can drive a synthesizer.
//!
//! Features
//! * No allocations after construction, suitable for real time audio use.
//! * `no_std` compatible (requires `alloc`).
//! * Independent instances, one per channel. There is no global state.
//!
//! # Examples
//!
//! ```
//! use micropitch::PitchFollower;
//!
//! let sample_rate = 44100;
//! let mut follower = PitchFollower::new(80.0, 1000.0, sample_rate).unwrap();
//!
//! // One second of a 220 Hz tone at -6 dB
//! for i in 0..sample_rate {
//!     let t = i as f32 / sample_rate as f32;
//!     let sample = 0.5 * (2.0 * core::f32::consts::PI * 220.0 * t).sin();
//!     let _processed = follower.process(sample);
//! }
//!
//! assert!((follower.frequency() - 220.0).abs() <= 2.0);
//! assert!(follower.envelope() > 0.0);
//! ```
//!
//! The lower level building blocks are available too. The [bacf] module contains the
//! bitstream autocorrelation engine and the period estimator, the [dynamics] module
//! contains the filters, envelope followers, gate and compressor used for conditioning.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod bacf;
pub mod common;
pub mod dynamics;
mod error;
pub mod follower;

pub use error::{Error, Result};
pub use follower::{Config, FollowerState, PitchFollower};
