/// Converts samples to bits and measures the distance between falling edges.
///
/// A sample above `threshold` sets the output bit, a sample below `-threshold`
/// clears it. Samples inside the band leave the bit unchanged, which keeps low
/// level noise around zero from producing spurious edges.
#[derive(Clone, Debug)]
pub struct ZeroCrossing {
    threshold: f32,
    state: bool,
    /// Samples since the last falling edge.
    samples_since_edge: usize,
    /// The two most recent falling edge intervals, newest first.
    intervals: [usize; 2],
    /// The number of falling edges seen, saturating at 3.
    edge_count: usize,
    min_period: usize,
    max_period: usize,
}

impl ZeroCrossing {
    /// Creates a tracker accepting falling edge intervals between `min_period`
    /// and `max_period` samples as stable periods.
    pub fn new(threshold: f32, min_period: usize, max_period: usize) -> Self {
        ZeroCrossing {
            threshold,
            state: false,
            samples_since_edge: 0,
            intervals: [0; 2],
            edge_count: 0,
            min_period,
            max_period,
        }
    }

    /// Processes one sample and returns the resulting bit.
    pub fn update(&mut self, sample: f32) -> bool {
        let previous = self.state;
        if sample > self.threshold {
            self.state = true;
        } else if sample < -self.threshold {
            self.state = false;
        }

        self.samples_since_edge = self.samples_since_edge.saturating_add(1);
        if previous && !self.state {
            if self.edge_count > 0 {
                self.intervals = [self.samples_since_edge, self.intervals[0]];
            }
            self.edge_count = core::cmp::min(self.edge_count + 1, 3);
            self.samples_since_edge = 0;
        }

        self.state
    }

    /// Returns the most recent falling edge interval if the two most recent
    /// intervals agree, the last edge is recent and the interval is within
    /// the accepted range.
    pub fn stable_period(&self) -> Option<usize> {
        if self.edge_count < 3 || self.samples_since_edge > self.max_period {
            return None;
        }
        let [newest, previous] = self.intervals;
        if newest < self.min_period || newest > self.max_period {
            return None;
        }
        let tolerance = core::cmp::max(1, newest / 32);
        if newest.abs_diff(previous) > tolerance {
            return None;
        }
        Some(newest)
    }
}
