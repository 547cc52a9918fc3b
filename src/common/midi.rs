use micromath::F32Ext;

/// log2(440) * 12 - 69, the offset between 12 * log2(f) and the note number.
const NOTE_OFFSET: f32 = 36.376316562295926;

/// Converts a frequency in Hz to a [MIDI](https://en.wikipedia.org/wiki/MIDI) note number (with a fractional part).
/// A4 at 440 Hz is note 69.
pub fn freq_to_midi_note(freq: f32) -> f32 {
    12.0 * F32Ext::log2(freq) - NOTE_OFFSET
}

/// Converts a (fractional) MIDI note number to a frequency in Hz.
pub fn midi_note_to_freq(note: f32) -> f32 {
    F32Ext::powf(2.0, (note + NOTE_OFFSET) / 12.0)
}
