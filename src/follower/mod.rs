//! Real time pitch and envelope following for a single voice.

mod config;
mod pitch_follower;
mod state;

pub use config::Config;
pub use pitch_follower::{PitchFollower, DEFAULT_THRESHOLD};
pub use state::FollowerState;
