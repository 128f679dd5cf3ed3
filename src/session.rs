//! Turns a stream of sampled verdicts into timed posture events.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gaps at least this long are treated as the user being away.
pub const DEFAULT_AWAY_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// A span of time attributed to good or bad posture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureEvent {
    pub is_good_posture: bool,
    pub duration_secs: u64,
}

/// Tracks the previous sample time and attributes elapsed time to verdicts.
///
/// The time since the previous sample is attributed to the verdict of the sample
/// just taken. Spans of `away_threshold` or longer, and clocks that moved
/// backwards, are discarded rather than logged.
#[derive(Clone, Debug)]
pub struct SessionTracker {
    away_threshold: Duration,
    last_sample_s: Option<u64>,
}

impl SessionTracker {
    pub fn new(away_threshold: Duration) -> Self {
        Self {
            away_threshold,
            last_sample_s: None,
        }
    }

    pub fn away_threshold(&self) -> Duration {
        self.away_threshold
    }

    pub fn last_sample_s(&self) -> Option<u64> {
        self.last_sample_s
    }

    /// Record a sample taken at `now_s` (seconds since epoch).
    pub fn observe(&mut self, now_s: u64, is_good_posture: bool) -> Option<PostureEvent> {
        let previous = self.last_sample_s.replace(now_s)?;
        let Some(elapsed) = now_s.checked_sub(previous) else {
            log::warn!(
                "clock moved backwards ({} -> {}); discarding span",
                previous,
                now_s
            );
            return None;
        };
        if elapsed >= self.away_threshold.as_secs() {
            log::info!("{}s since last sample; treating gap as away time", elapsed);
            return None;
        }
        Some(PostureEvent {
            is_good_posture,
            duration_secs: elapsed,
        })
    }

    /// Forget the previous sample, e.g. when monitoring is paused.
    pub fn reset(&mut self) {
        self.last_sample_s = None;
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_AWAY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_only_anchors() {
        let mut tracker = SessionTracker::default();
        assert_eq!(tracker.observe(1_000, false), None);
        assert_eq!(tracker.last_sample_s(), Some(1_000));
    }

    #[test]
    fn consecutive_samples_emit_elapsed_duration() {
        let mut tracker = SessionTracker::default();
        tracker.observe(0, false);
        assert_eq!(
            tracker.observe(30, false),
            Some(PostureEvent {
                is_good_posture: false,
                duration_secs: 30
            })
        );
    }

    #[test]
    fn away_gap_is_discarded_and_counting_resumes() {
        let mut tracker = SessionTracker::default();
        tracker.observe(0, false);
        tracker.observe(30, false);
        assert_eq!(tracker.observe(330, true), None);
        assert_eq!(
            tracker.observe(360, true),
            Some(PostureEvent {
                is_good_posture: true,
                duration_secs: 30
            })
        );
    }

    #[test]
    fn backwards_clock_is_discarded() {
        let mut tracker = SessionTracker::default();
        tracker.observe(100, true);
        assert_eq!(tracker.observe(50, true), None);
        assert_eq!(tracker.observe(60, true).map(|e| e.duration_secs), Some(10));
    }

    #[test]
    fn reset_drops_anchor() {
        let mut tracker = SessionTracker::new(Duration::from_secs(60));
        tracker.observe(0, true);
        tracker.reset();
        assert_eq!(tracker.observe(10, true), None);
    }
}
