//! Signal conditioning and envelope building blocks: filters, envelope
//! followers, a noise gate and a compressor.

mod compressor;
mod envelope;
mod filter;
mod gate;

pub use compressor::{hard_clip, GainComputer, SoftKneeCompressor};
pub use envelope::{EnvelopeShaper, EnvelopeStage, FastEnvelopeFollower, PeakEnvelopeFollower};
pub use filter::{BandLimiter, OnePoleLowpass};
pub use gate::WindowComparator;
