use core::time::Duration;

use crate::common::Decibel;
use crate::error::{Error, Result};

/// Pitch follower settings.
///
/// With the `serde` feature enabled, missing fields take their default
/// values when deserializing, so a settings document only needs to list the
/// fields it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    /// Hold time of the fast envelope follower driving note detection.
    pub env_hold: Duration,

    /// Release time of the envelope follower driving the gate and compressor.
    pub comp_release: Duration,
    pub comp_threshold: Decibel,
    /// Width of the compressor's soft knee.
    pub comp_width: Decibel,
    /// Compressor slope above the knee, the inverse of the ratio.
    pub comp_slope: f32,
    /// Linear makeup gain applied after compression.
    pub comp_gain: f32,

    pub gate_on_threshold: Decibel,
    pub gate_off_threshold: Decibel,

    pub attack: Duration,
    pub decay: Duration,
    pub release: Duration,
    /// Envelope level below which the output envelope starts its release.
    pub release_threshold: Decibel,

    /// Envelope level above which the signal is considered a note.
    pub note_threshold: Decibel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            env_hold: Duration::from_millis(10),
            comp_release: Duration::from_millis(30),
            comp_threshold: Decibel(-18.),
            comp_width: Decibel(3.),
            comp_slope: 0.25,
            comp_gain: 4.,
            gate_on_threshold: Decibel(-36.),
            gate_off_threshold: Decibel(-60.),
            attack: Duration::from_millis(100),
            decay: Duration::from_millis(300),
            release: Duration::from_millis(800),
            release_threshold: Decibel(-40.),
            note_threshold: Decibel(-36.),
        }
    }
}

impl Config {
    /// Checks that all settings are in range.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("env_hold", self.env_hold),
            ("comp_release", self.comp_release),
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ];
        for (name, duration) in durations {
            if duration.is_zero() {
                return Err(Error::invalid_param(name, "must be greater than zero"));
            }
        }

        let levels = [
            ("comp_threshold", self.comp_threshold),
            ("comp_width", self.comp_width),
            ("gate_on_threshold", self.gate_on_threshold),
            ("gate_off_threshold", self.gate_off_threshold),
            ("release_threshold", self.release_threshold),
            ("note_threshold", self.note_threshold),
        ];
        for (name, level) in levels {
            if !level.0.is_finite() {
                return Err(Error::invalid_param(name, "must be a finite number of dB"));
            }
        }

        if self.comp_width.0 < 0. {
            return Err(Error::invalid_param("comp_width", "must not be negative"));
        }
        if !(self.comp_slope > 0. && self.comp_slope <= 1.) {
            return Err(Error::invalid_param(
                "comp_slope",
                "must be greater than 0 and at most 1",
            ));
        }
        if !(self.comp_gain.is_finite() && self.comp_gain > 0.) {
            return Err(Error::invalid_param(
                "comp_gain",
                "must be a finite number greater than 0",
            ));
        }
        if self.gate_on_threshold < self.gate_off_threshold {
            return Err(Error::invalid_param(
                "gate_on_threshold",
                "must not be below gate_off_threshold",
            ));
        }
        Ok(())
    }
}
