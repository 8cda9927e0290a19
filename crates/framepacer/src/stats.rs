//! Playback scheduling telemetry.
//!
//! Counters are updated by the scheduler as a side effect of normal
//! operation and can be snapshotted from any thread, so a UI or test harness
//! can observe drop/glitch behavior without touching the scheduler itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Scheduling counters behind a cloneable handle.
///
/// Cloning shares the underlying counters; updates are lock-free.
#[derive(Clone, Default)]
pub struct SchedulerStats {
    inner: Arc<StatsInner>,
}

#[derive(Default)]
struct StatsInner {
    /// Render calls that returned a frame.
    frames_rendered: AtomicU64,
    /// Frames discarded without ever being composited.
    frames_dropped: AtomicU64,
    /// Renders where the selected frame exceeded the drift bound or broke
    /// cadence.
    glitched_renders: AtomicU64,
    /// Committed cadence transitions (including to/from "no cadence").
    cadence_changes: AtomicU64,
    /// Frames removed by expiration sweeps.
    frames_expired: AtomicU64,
}

impl SchedulerStats {
    /// Creates a fresh set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_render(&self, glitched: bool) {
        self.inner.frames_rendered.fetch_add(1, Ordering::Relaxed);
        if glitched {
            self.inner.glitched_renders.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_dropped(&self, count: usize) {
        if count > 0 {
            self.inner
                .frames_dropped
                .fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_cadence_change(&self) {
        self.inner.cadence_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expired(&self, count: usize) {
        if count > 0 {
            self.inner
                .frames_expired
                .fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> SchedulerStatsSnapshot {
        SchedulerStatsSnapshot {
            frames_rendered: self.inner.frames_rendered.load(Ordering::Relaxed),
            frames_dropped: self.inner.frames_dropped.load(Ordering::Relaxed),
            glitched_renders: self.inner.glitched_renders.load(Ordering::Relaxed),
            cadence_changes: self.inner.cadence_changes.load(Ordering::Relaxed),
            frames_expired: self.inner.frames_expired.load(Ordering::Relaxed),
        }
    }

    /// Zeroes all counters.
    pub fn reset(&self) {
        self.inner.frames_rendered.store(0, Ordering::Relaxed);
        self.inner.frames_dropped.store(0, Ordering::Relaxed);
        self.inner.glitched_renders.store(0, Ordering::Relaxed);
        self.inner.cadence_changes.store(0, Ordering::Relaxed);
        self.inner.frames_expired.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of [`SchedulerStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatsSnapshot {
    /// Render calls that returned a frame.
    pub frames_rendered: u64,
    /// Frames discarded without ever being composited.
    pub frames_dropped: u64,
    /// Renders flagged as glitched.
    pub glitched_renders: u64,
    /// Committed cadence transitions.
    pub cadence_changes: u64,
    /// Frames removed by expiration sweeps.
    pub frames_expired: u64,
}

impl SchedulerStatsSnapshot {
    /// Percentage of renders that were glitched.
    pub fn glitch_percentage(&self) -> f64 {
        if self.frames_rendered == 0 {
            0.0
        } else {
            (self.glitched_renders as f64 / self.frames_rendered as f64) * 100.0
        }
    }
}

impl std::fmt::Display for SchedulerStatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rendered={}, dropped={}, expired={}, glitched={} ({:.1}%), cadence_changes={}",
            self.frames_rendered,
            self.frames_dropped,
            self.frames_expired,
            self.glitched_renders,
            self.glitch_percentage(),
            self.cadence_changes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = SchedulerStats::new();
        stats.record_render(false);
        stats.record_render(true);
        stats.record_dropped(3);
        stats.record_expired(2);
        stats.record_cadence_change();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_rendered, 2);
        assert_eq!(snap.frames_dropped, 3);
        assert_eq!(snap.frames_expired, 2);
        assert_eq!(snap.glitched_renders, 1);
        assert_eq!(snap.cadence_changes, 1);
        assert!((snap.glitch_percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_handles_share_counters() {
        let stats = SchedulerStats::new();
        let observer = stats.clone();
        stats.record_render(false);
        assert_eq!(observer.snapshot().frames_rendered, 1);

        observer.reset();
        assert_eq!(stats.snapshot().frames_rendered, 0);
    }
}
