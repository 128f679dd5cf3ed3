//! Bounded history of recent posture scores.

use std::collections::VecDeque;
use std::time::Duration;

/// Maximum number of retained samples.
pub const MAX_HISTORY_SAMPLES: usize = 1000;

/// Ring buffer of `(epoch seconds, score)` samples.
///
/// Oldest samples are evicted once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct ScoreHistory {
    samples: VecDeque<(u64, f32)>,
    capacity: usize,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_SAMPLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, now_s: u64, score: f32) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((now_s, score));
    }

    /// Mean score of samples no older than `window` at `now_s`; 0.0 if none.
    pub fn average(&self, now_s: u64, window: Duration) -> f32 {
        self.recent_average(now_s, window).unwrap_or(0.0)
    }

    /// Like `average`, but `None` when the window holds no samples.
    pub fn recent_average(&self, now_s: u64, window: Duration) -> Option<f32> {
        let window_s = window.as_secs();
        let (sum, count) = self
            .samples
            .iter()
            .filter(|(t, _)| *t <= now_s && now_s - *t <= window_s)
            .fold((0.0f32, 0usize), |(sum, count), (_, score)| {
                (sum + score, count + 1)
            });
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new()
    }
}
