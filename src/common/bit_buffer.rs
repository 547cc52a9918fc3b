use alloc::{boxed::Box, vec};

/// The number of bits in a storage word.
pub const WORD_BITS: usize = u32::BITS as usize;

/// Storage for one analysis window of single bit samples.
///
/// The autocorrelation engine only needs to set bits and to measure how
/// much the window differs from a shifted view of itself, so alternative
/// implementations (SIMD, hardware population count, wider words)
/// can be plugged in without touching the estimator.
pub trait BitStorage {
    /// The number of bits in the window. Always a power of two.
    fn size(&self) -> usize;

    fn set(&mut self, position: usize, bit: bool);

    fn get(&self, position: usize) -> bool;

    /// Returns the number of differing bits between the first `size / 2` bits
    /// and the `size / 2` bits starting at `lag`, i.e the
    /// [Hamming distance](https://en.wikipedia.org/wiki/Hamming_distance)
    /// between the window and itself shifted by `lag`. `lag` must be less
    /// than `size / 2`.
    fn shifted_distance(&self, lag: usize) -> u32;

    /// Sets all bits to zero.
    fn clear(&mut self);
}

/// A fixed size, word packed bit array. Bit `i` is stored in word `i / 32`
/// at bit position `i % 32`.
#[derive(Clone, Debug)]
pub struct BitBuffer {
    words: Box<[u32]>,
}

impl BitBuffer {
    /// Creates a buffer of `size` zero bits. `size` must be a power of two
    /// and at least two words long.
    pub fn new(size: usize) -> Self {
        if !size.is_power_of_two() {
            panic!("Bit buffer size must be a power of two, got {}", size)
        }
        if size < 2 * WORD_BITS {
            panic!(
                "Bit buffer size must be at least {} bits, got {}",
                2 * WORD_BITS,
                size
            )
        }
        BitBuffer {
            words: vec![0; size / WORD_BITS].into_boxed_slice(),
        }
    }
}

impl BitStorage for BitBuffer {
    fn size(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    #[inline]
    fn set(&mut self, position: usize, bit: bool) {
        let mask = 1 << (position % WORD_BITS);
        let word = &mut self.words[position / WORD_BITS];
        if bit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    #[inline]
    fn get(&self, position: usize) -> bool {
        (self.words[position / WORD_BITS] >> (position % WORD_BITS)) & 1 == 1
    }

    fn shifted_distance(&self, lag: usize) -> u32 {
        let half = self.words.len() / 2;
        let index = lag / WORD_BITS;
        let shift = lag % WORD_BITS;
        let (window, shifted) = (&self.words[..half], &self.words[index..]);

        if shift == 0 {
            return window
                .iter()
                .zip(shifted.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum();
        }

        // Lags are below size / 2, so the word after the last shifted word
        // is still inside the buffer.
        window
            .iter()
            .zip(shifted.windows(2))
            .map(|(a, pair)| {
                let b = (pair[0] >> shift) | (pair[1] << (WORD_BITS - shift));
                (a ^ b).count_ones()
            })
            .sum()
    }

    fn clear(&mut self) {
        for word in self.words.iter_mut() {
            *word = 0;
        }
    }
}
