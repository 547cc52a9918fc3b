/// A comparator with hysteresis. Switches on when the input rises above the
/// on threshold and off when it falls below the off threshold.
#[derive(Clone, Debug)]
pub struct WindowComparator {
    off_threshold: f32,
    on_threshold: f32,
    state: bool,
}

impl WindowComparator {
    pub fn new(off_threshold: f32, on_threshold: f32) -> Self {
        if on_threshold < off_threshold {
            panic!(
                "On threshold {} must not be below off threshold {}",
                on_threshold, off_threshold
            )
        }
        WindowComparator {
            off_threshold,
            on_threshold,
            state: false,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> bool {
        if input > self.on_threshold {
            self.state = true;
        } else if input < self.off_threshold {
            self.state = false;
        }
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state
    }
}
