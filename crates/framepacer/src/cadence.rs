//! Render-cadence detection.
//!
//! When the video frame rate and the display refresh rate are related by a
//! small integer ratio, each frame should occupy a fixed number of refresh
//! intervals: 30 fps in 60 Hz shows every frame twice, 120 fps in 60 Hz shows
//! every other frame once. Rendering on that cadence gives smoother pacing
//! than greedily maximizing per-interval coverage, so the scheduler prefers a
//! cadence-based pick whenever one exists.
//!
//! A cadence is only worth committing to if the rounding error between the
//! true ratio and the small-integer approximation accumulates slowly: the
//! scheduler periodically has to repeat or skip a frame to pay the error
//! back, and doing so more often than once per [`PatternCadenceEstimator`]'s
//! minimum glitch spacing looks worse than having no cadence at all.

use std::time::Duration;

/// How long a candidate cadence must be observed before it replaces the
/// current one. Keeps a single noisy render interval from flipping cadence.
pub const CADENCE_HYSTERESIS: Duration = Duration::from_millis(100);

/// Default minimum acceptable spacing between cadence-induced glitches.
///
/// Accumulated drift forces a frame repeat or skip once it reaches the drift
/// bound; if that would happen more often than this, the cadence is rejected.
pub const DEFAULT_MINIMUM_TIME_BETWEEN_GLITCHES: Duration = Duration::from_secs(8);

/// Detects a repeating render-count pattern relating frame duration to the
/// display's render interval.
///
/// The estimator is a collaborator of the scheduler with a deliberately
/// narrow contract so tests can substitute a scripted fake.
pub trait CadenceEstimator: Send {
    /// Re-evaluates the cadence for the given render interval and average
    /// frame duration. `max_acceptable_drift` bounds how much accumulated
    /// error is tolerable before a correction becomes visible.
    ///
    /// Returns true if the committed cadence changed (including changing to
    /// or from "no cadence").
    fn update_estimate(
        &mut self,
        render_interval: Duration,
        frame_duration: Duration,
        max_acceptable_drift: Duration,
    ) -> bool;

    /// Whether a cadence is currently established.
    fn has_cadence(&self) -> bool;

    /// Ideal render count for the frame `frame_index` positions after the
    /// cadence reference point. Zero when no cadence is established.
    fn cadence_for_frame(&self, frame_index: u64) -> u32;

    /// Clears any established or pending cadence.
    fn reset(&mut self);
}

/// Production cadence estimator.
///
/// Detects two pattern shapes, both represented as a repeating sequence of
/// per-frame render counts:
///
/// - integer cadence `[n]`: each frame occupies `n` refresh intervals
///   (frame duration ≈ n × render interval);
/// - fractional cadence `[1, 0, …, 0]` of length `k`: only every k-th frame
///   is rendered (render interval ≈ k × frame duration).
///
/// A candidate pattern must hold for [`CADENCE_HYSTERESIS`] worth of render
/// intervals before it is committed.
#[derive(Debug)]
pub struct PatternCadenceEstimator {
    minimum_time_between_glitches: Duration,
    pattern: Vec<u32>,
    pending_pattern: Vec<u32>,
    pending_held_for: Duration,
}

impl PatternCadenceEstimator {
    /// Creates an estimator with the given minimum glitch spacing.
    pub fn new(minimum_time_between_glitches: Duration) -> Self {
        Self {
            minimum_time_between_glitches,
            pattern: Vec::new(),
            pending_pattern: Vec::new(),
            pending_held_for: Duration::ZERO,
        }
    }

    /// The committed pattern; empty when no cadence is established.
    pub fn pattern(&self) -> &[u32] {
        &self.pattern
    }

    /// Computes the cadence pattern the given timing would support, without
    /// hysteresis. Empty when no acceptable cadence exists.
    fn calculate_cadence(
        &self,
        render_interval: Duration,
        frame_duration: Duration,
        max_acceptable_drift: Duration,
    ) -> Vec<u32> {
        if render_interval.is_zero() || frame_duration.is_zero() {
            return Vec::new();
        }

        let ratio = frame_duration.as_secs_f64() / render_interval.as_secs_f64();

        // Integer cadence: the frame spans n render intervals. The rounding
        // error recurs once per frame, so drift reaches the bound after
        // max_drift / error frames.
        let n = (ratio.round() as u32).max(1);
        let error = frame_duration.abs_diff(render_interval * n);
        if error.is_zero() {
            return vec![n];
        }
        let frames_until_max_drift =
            max_acceptable_drift.as_secs_f64() / error.as_secs_f64();
        if frame_duration.mul_f64(frames_until_max_drift) >= self.minimum_time_between_glitches {
            return vec![n];
        }

        // Fractional cadence: k frames arrive per render interval and only
        // one of them is shown. The error recurs once per render interval.
        let k = (1.0 / ratio).round() as u32;
        if k >= 2 {
            let error = render_interval.abs_diff(frame_duration * k);
            let acceptable = error.is_zero() || {
                let intervals_until_max_drift =
                    max_acceptable_drift.as_secs_f64() / error.as_secs_f64();
                render_interval.mul_f64(intervals_until_max_drift)
                    >= self.minimum_time_between_glitches
            };
            if acceptable {
                let mut pattern = vec![0; k as usize];
                pattern[0] = 1;
                return pattern;
            }
        }

        Vec::new()
    }
}

impl Default for PatternCadenceEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_TIME_BETWEEN_GLITCHES)
    }
}

impl CadenceEstimator for PatternCadenceEstimator {
    fn update_estimate(
        &mut self,
        render_interval: Duration,
        frame_duration: Duration,
        max_acceptable_drift: Duration,
    ) -> bool {
        let candidate =
            self.calculate_cadence(render_interval, frame_duration, max_acceptable_drift);

        if candidate == self.pattern {
            self.pending_pattern.clear();
            self.pending_held_for = Duration::ZERO;
            return false;
        }

        if candidate == self.pending_pattern {
            self.pending_held_for += render_interval;
        } else {
            self.pending_pattern = candidate;
            self.pending_held_for = render_interval;
        }

        if self.pending_held_for < CADENCE_HYSTERESIS {
            return false;
        }

        tracing::debug!(
            "cadence changed: {:?} -> {:?} (render_interval={:?}, frame_duration={:?})",
            self.pattern,
            self.pending_pattern,
            render_interval,
            frame_duration
        );
        self.pattern = std::mem::take(&mut self.pending_pattern);
        self.pending_held_for = Duration::ZERO;
        true
    }

    fn has_cadence(&self) -> bool {
        !self.pattern.is_empty()
    }

    fn cadence_for_frame(&self, frame_index: u64) -> u32 {
        if self.pattern.is_empty() {
            return 0;
        }
        self.pattern[(frame_index % self.pattern.len() as u64) as usize]
    }

    fn reset(&mut self) {
        self.pattern.clear();
        self.pending_pattern.clear();
        self.pending_held_for = Duration::ZERO;
    }
}
