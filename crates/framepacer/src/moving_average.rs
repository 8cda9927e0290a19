//! Fixed-window moving average over durations.

use std::time::Duration;

/// Moving average of the most recent N duration samples.
///
/// Used by the scheduler to smooth inter-frame wall-clock spacing; a fixed
/// window keeps the estimate responsive to frame-rate changes mid-stream.
#[derive(Debug)]
pub struct MovingAverage {
    samples: Vec<Duration>,
    next: usize,
    count: usize,
    sum: Duration,
}

impl MovingAverage {
    /// Creates a moving average over the last `window` samples.
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "moving average window must be non-zero");
        Self {
            samples: vec![Duration::ZERO; window],
            next: 0,
            count: 0,
            sum: Duration::ZERO,
        }
    }

    /// Adds a sample, evicting the oldest once the window is full.
    pub fn add_sample(&mut self, sample: Duration) {
        if self.count == self.samples.len() {
            self.sum -= self.samples[self.next];
        } else {
            self.count += 1;
        }
        self.sum += sample;
        self.samples[self.next] = sample;
        self.next = (self.next + 1) % self.samples.len();
    }

    /// Number of samples currently in the window.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The current average, or zero if no samples have been added.
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.sum / self.count as u32
    }

    /// Discards all samples.
    pub fn reset(&mut self) {
        self.samples.fill(Duration::ZERO);
        self.next = 0;
        self.count = 0;
        self.sum = Duration::ZERO;
    }
}
