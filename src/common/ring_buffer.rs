use alloc::{boxed::Box, vec};

/// A fixed capacity ring buffer of `f32` values. Pushing to a full buffer
/// overwrites the oldest value.
#[derive(Clone, Debug)]
pub struct RingBuffer {
    values: Box<[f32]>,
    /// Index of the next write.
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            panic!("Ring buffer capacity must be greater than 0")
        }
        RingBuffer {
            values: vec![0.0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: f32) {
        self.values[self.head] = value;
        self.head = (self.head + 1) % self.capacity();
        self.len = core::cmp::min(self.len + 1, self.capacity());
    }

    /// The most recently pushed value.
    pub fn newest(&self) -> Option<f32> {
        self.get(0)
    }

    /// The least recently pushed value still in the buffer.
    pub fn oldest(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        self.get(self.len - 1)
    }

    /// Returns the value pushed `age` pushes ago, where 0 is the newest.
    pub fn get(&self, age: usize) -> Option<f32> {
        if age >= self.len {
            return None;
        }
        let capacity = self.capacity();
        Some(self.values[(self.head + capacity - 1 - age) % capacity])
    }

    /// Iterates from the newest to the oldest value.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).filter_map(move |age| self.get(age))
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
