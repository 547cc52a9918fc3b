//! Common building blocks and utilities.

mod bit_buffer;
mod midi;
mod ring_buffer;
mod units;

pub use bit_buffer::{BitBuffer, BitStorage, WORD_BITS};
pub use midi::{freq_to_midi_note, midi_note_to_freq};
pub use ring_buffer::RingBuffer;
pub use units::{duration_to_samples, one_minus_exp_neg, smoothing_coefficient, Decibel};
