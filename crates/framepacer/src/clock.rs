//! Media-time to wall-clock conversion.
//!
//! Converting a presentation timestamp into the wall-clock instant at which
//! the frame should appear depends on state the scheduler doesn't own: when
//! playback started, the current playback rate, whether the pipeline is
//! paused. The conversion is injected through [`MediaClock`] so the scheduler
//! stays a pure function of its queue, and tests can substitute a closure.

use std::time::{Duration, Instant};

/// Converts media timestamps to wall-clock display times.
///
/// Returns `None` while no wall-clock reference exists (startup before the
/// first frame, or paused with no resume point). The scheduler treats that as
/// a degraded-but-normal condition, not an error.
///
/// Implementations must be pure with respect to the scheduler: two calls with
/// the same timestamp between scheduler mutations should return the same
/// instant.
pub trait MediaClock: Send {
    /// Returns the wall-clock instant at which a frame with this presentation
    /// timestamp should be displayed, or `None` if wall-clock time is not
    /// currently established.
    fn wall_time_for(&self, pts: Duration) -> Option<Instant>;
}

impl<F> MediaClock for F
where
    F: Fn(Duration) -> Option<Instant> + Send,
{
    fn wall_time_for(&self, pts: Duration) -> Option<Instant> {
        self(pts)
    }
}

/// A [`MediaClock`] for steady playback from a fixed origin.
///
/// Maps `pts` to `origin + pts / rate`. A rate of 1.0 is normal speed, 2.0 is
/// double speed. Non-positive rates report time as unavailable, which is what
/// a paused pipeline looks like to the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackClock {
    origin: Instant,
    rate: f64,
}

impl PlaybackClock {
    /// Creates a clock mapping media time zero to `origin` at the given rate.
    pub fn new(origin: Instant, rate: f64) -> Self {
        Self { origin, rate }
    }

    /// The wall-clock instant corresponding to media time zero.
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// The playback rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl MediaClock for PlaybackClock {
    fn wall_time_for(&self, pts: Duration) -> Option<Instant> {
        if self.rate <= 0.0 {
            return None;
        }
        Some(self.origin + pts.div_f64(self.rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_clock_identity_rate() {
        let origin = Instant::now();
        let clock = PlaybackClock::new(origin, 1.0);
        assert_eq!(
            clock.wall_time_for(Duration::from_millis(500)),
            Some(origin + Duration::from_millis(500))
        );
    }

    #[test]
    fn test_playback_clock_double_rate() {
        let origin = Instant::now();
        let clock = PlaybackClock::new(origin, 2.0);
        // At 2x speed, one second of media time passes in half a wall second.
        assert_eq!(
            clock.wall_time_for(Duration::from_secs(1)),
            Some(origin + Duration::from_millis(500))
        );
    }

    #[test]
    fn test_playback_clock_paused() {
        let clock = PlaybackClock::new(Instant::now(), 0.0);
        assert_eq!(clock.wall_time_for(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_closure_clock() {
        let origin = Instant::now();
        let clock = move |pts: Duration| Some(origin + pts);
        assert_eq!(
            clock.wall_time_for(Duration::from_millis(33)),
            Some(origin + Duration::from_millis(33))
        );
    }
}
