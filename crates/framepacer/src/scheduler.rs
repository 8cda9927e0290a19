//! Deadline-driven frame selection.
//!
//! [`RenderScheduler`] sits between a decoder and a vsync-driven compositor.
//! The decoder enqueues frames in presentation order; once per refresh
//! interval the compositor asks which queued frame to show for the deadline
//! window `[deadline_min, deadline_max)`. Selection runs a gauntlet of
//! strategies, each a fallback for the previous:
//!
//! 1. cadence: if the frame rate locks to the refresh rate in a small-integer
//!    pattern, advance through the queue on that pattern;
//! 2. coverage: otherwise pick the frame whose wall-clock display window
//!    overlaps the deadline window the most;
//! 3. drift: if nothing overlaps at all, pick the frame closest to the
//!    deadline and flag the render as glitched.
//!
//! The scheduler also keeps the bookkeeping the rest of the pipeline needs:
//! how many frames were discarded without ever being shown, how many queued
//! frames are still useful (decoder backpressure), and whether the most
//! recent pick was within the acceptable drift bound.
//!
//! All methods must be called from one thread; the scheduler never blocks and
//! owns no thread of its own. Wrap it in a mutex if the decode and render
//! sides live on different threads.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cadence::{CadenceEstimator, PatternCadenceEstimator};
use crate::clock::MediaClock;
use crate::frame::VideoFrame;
use crate::moving_average::MovingAverage;
use crate::stats::SchedulerStats;

/// Tuning knobs for [`RenderScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of inter-frame deltas in the frame-duration moving average.
    pub moving_average_window: usize,
    /// Lower bound on the acceptable-drift estimate. Drift below ~1/120s is
    /// well under the floor of human detection, so allowing at least this
    /// much avoids flagging imperceptible error.
    pub drift_floor: Duration,
    /// Acceptable drift used before enough frames exist to estimate one
    /// (ATSC IS/191 recommendation).
    pub startup_max_drift: Duration,
    /// When two frames' deadline coverage differs by less than this, the
    /// earlier frame wins. Absorbs render-loop jitter at ratios like
    /// 24fps-in-60Hz where per-interval coverage alternates by a hair.
    pub coverage_jitter_tolerance: Duration,
    /// Minimum acceptable spacing between cadence-induced glitches; cadences
    /// that would need corrections more often than this are rejected.
    pub minimum_time_between_glitches: Duration,
    /// When false, the scheduler never skips content: if selection would
    /// discard a frame that was never composited, the earliest such frame is
    /// returned instead. Sync quality degrades and glitches are still
    /// reported; this mode is for diagnostics and quality checks that must
    /// see every frame.
    pub drop_frames: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            moving_average_window: 25,
            drift_floor: Duration::from_micros(8_333),
            startup_max_drift: Duration::from_millis(15),
            coverage_jitter_tolerance: Duration::from_micros(500),
            minimum_time_between_glitches: Duration::from_secs(8),
            drop_frames: true,
        }
    }
}

/// Outcome of a successful [`RenderScheduler::render`] call.
#[derive(Debug, Clone)]
pub struct RenderResult<P> {
    /// The frame to display for this deadline window.
    pub frame: Arc<VideoFrame<P>>,
    /// Frames discarded by this call that were never composited.
    pub frames_dropped: usize,
}

/// Per-frame bookkeeping while a frame sits in the queue.
#[derive(Debug)]
struct ReadyFrame<P> {
    frame: Arc<VideoFrame<P>>,
    /// Wall-clock display window; unset until statistics first run.
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    /// Refresh intervals this frame should occupy under the current cadence
    /// (zero without cadence).
    ideal_render_count: u32,
    /// Refresh intervals this frame has been selected for.
    render_count: u32,
    /// Subset of `render_count` where the compositor discarded the frame.
    drop_count: u32,
}

impl<P> ReadyFrame<P> {
    fn new(frame: Arc<VideoFrame<P>>) -> Self {
        Self {
            frame,
            start_time: None,
            end_time: None,
            ideal_render_count: 0,
            render_count: 0,
            drop_count: 0,
        }
    }
}

/// Selects which decoded frame to display for each refresh deadline.
///
/// One instance per playback session; [`reset`](Self::reset) returns it to
/// the initial empty state on seek or rate change. See the
/// [module docs](self) for the selection strategy.
pub struct RenderScheduler<P> {
    config: SchedulerConfig,
    clock: Box<dyn MediaClock>,
    cadence: Box<dyn CadenceEstimator>,

    /// Sorted by presentation timestamp, oldest first.
    queue: VecDeque<ReadyFrame<P>>,
    /// Index of the most recently selected frame within the queue. Distinct
    /// from the queue head: enqueues and expirations shift it so it keeps
    /// naming the same logical frame.
    last_frame_index: usize,

    duration_window: MovingAverage,
    average_frame_duration: Duration,
    render_interval: Duration,
    max_acceptable_drift: Duration,
    last_deadline_max: Option<Instant>,

    have_rendered_frames: bool,
    last_render_had_glitch: bool,

    stats: SchedulerStats,
}

impl<P> RenderScheduler<P> {
    /// Creates a scheduler with default configuration and the production
    /// cadence estimator.
    pub fn new(clock: impl MediaClock + 'static) -> Self {
        Self::with_config(clock, SchedulerConfig::default())
    }

    /// Creates a scheduler with the given configuration.
    pub fn with_config(clock: impl MediaClock + 'static, config: SchedulerConfig) -> Self {
        let estimator = PatternCadenceEstimator::new(config.minimum_time_between_glitches);
        Self::with_estimator(clock, estimator, config)
    }

    /// Creates a scheduler with an explicit cadence estimator. Primarily for
    /// tests that need scripted cadence behavior.
    pub fn with_estimator(
        clock: impl MediaClock + 'static,
        estimator: impl CadenceEstimator + 'static,
        config: SchedulerConfig,
    ) -> Self {
        let mut scheduler = Self {
            duration_window: MovingAverage::new(config.moving_average_window),
            max_acceptable_drift: config.startup_max_drift,
            config,
            clock: Box::new(clock),
            cadence: Box::new(estimator),
            queue: VecDeque::new(),
            last_frame_index: 0,
            average_frame_duration: Duration::ZERO,
            render_interval: Duration::ZERO,
            last_deadline_max: None,
            have_rendered_frames: false,
            last_render_had_glitch: false,
            stats: SchedulerStats::new(),
        };
        scheduler.reset();
        scheduler
    }

    /// Inserts a decoded frame, keeping the queue sorted by timestamp.
    ///
    /// Frames usually arrive in order and append to the back, but reordering
    /// reconstruction can produce the occasional out-of-order timestamp, so
    /// insertion finds the correct sorted position. Equal timestamps keep
    /// arrival order.
    ///
    /// End-of-stream markers are a caller error: they carry nothing to
    /// display. Debug builds assert; release builds log and ignore the frame.
    pub fn enqueue_frame(&mut self, frame: Arc<VideoFrame<P>>) {
        debug_assert!(
            !frame.is_end_of_stream(),
            "end-of-stream markers must not be enqueued"
        );
        if frame.is_end_of_stream() {
            tracing::warn!("ignoring end-of-stream marker passed to enqueue_frame");
            return;
        }

        let pts = frame.pts;
        let insert_at = self.queue.partition_point(|f| f.frame.pts <= pts);

        // Keep the index naming the same logical frame when inserting at or
        // before it; the inserted frame will be dropped on the next render.
        if insert_at <= self.last_frame_index && self.have_rendered_frames {
            self.last_frame_index += 1;
        }

        if insert_at != self.queue.len() {
            tracing::debug!(
                "out-of-order frame pts={:?} inserted at {}/{}",
                pts,
                insert_at,
                self.queue.len()
            );
        }
        self.queue.insert(insert_at, ReadyFrame::new(frame));

        // Project cadence onto the new frame immediately so depth queries
        // stay usable between render calls; the next render confirms it.
        if self.cadence.has_cadence() {
            self.update_cadence_for_frames();
        }

        #[cfg(debug_assertions)]
        for i in 0..self.queue.len().saturating_sub(1) {
            debug_assert!(self.queue[i].frame.pts <= self.queue[i + 1].frame.pts);
        }
    }

    /// Selects the frame to display for the deadline window
    /// `[deadline_min, deadline_max)`.
    ///
    /// Returns `None` only when the queue is empty, which is a normal state
    /// before the first frame arrives. `deadline_min` values must be
    /// non-decreasing across calls; an empty window is a caller error
    /// (debug assert, `None` in release).
    pub fn render(&mut self, deadline_min: Instant, deadline_max: Instant) -> Option<RenderResult<P>> {
        debug_assert!(
            deadline_min < deadline_max,
            "deadline window must be non-empty"
        );
        if deadline_min >= deadline_max {
            tracing::warn!("render called with an empty deadline window");
            return None;
        }

        if self.queue.is_empty() {
            return None;
        }

        // From here on last_frame_index has meaning and must be preserved
        // even if earlier-stamped frames arrive later.
        self.have_rendered_frames = true;

        self.render_interval = deadline_max - deadline_min;
        self.account_for_missed_intervals(deadline_min);
        self.last_deadline_max = Some(deadline_max);

        if !self.update_frame_statistics() {
            tracing::debug!("wall-clock statistics unavailable; re-presenting current frame");
            let idx = self.last_frame_index;
            // Without a duration estimate there is no basis for choosing a
            // different frame, so the current one is charged for the interval
            // once its wall-clock time is known.
            if self.average_frame_duration.is_zero() && self.queue[idx].start_time.is_some() {
                self.queue[idx].render_count += 1;
            }
            self.stats.record_render(false);
            return Some(RenderResult {
                frame: Arc::clone(&self.queue[idx].frame),
                frames_dropped: 0,
            });
        }

        debug_assert!(self.average_frame_duration > Duration::ZERO);

        let mut selected_drift = Duration::ZERO;
        let mut selection = self.best_frame_by_cadence();
        if let Some(idx) = selection {
            selected_drift = self.absolute_drift(deadline_min, idx);
        }

        // Cadence produced nothing, or its pick has drifted too far: fall
        // back to deadline coverage.
        if selection.is_none() || selected_drift > self.max_acceptable_drift {
            let (best, second) = self.best_frame_by_coverage(deadline_min, deadline_max);
            selection = match (selection, best, second) {
                // The cadence pick happens to also have the best coverage, so
                // we only got here because its drift is too large; take the
                // runner-up when its drift is no worse.
                (Some(cadence_pick), Some(b), Some(s))
                    if cadence_pick == b
                        && self.absolute_drift(deadline_min, s) <= selected_drift =>
                {
                    Some(s)
                }
                _ => best,
            };
            if let Some(idx) = selection {
                selected_drift = self.absolute_drift(deadline_min, idx);
            }
        }

        // Still nothing with acceptable drift covering the deadline: take
        // whatever is closest. The result will look bad either way.
        let mut frame_to_render = match selection {
            Some(idx) if selected_drift <= self.max_acceptable_drift => idx,
            _ => {
                let (idx, drift) = self.best_frame_by_drift(deadline_min);
                selected_drift = drift;
                idx
            }
        };

        self.last_render_had_glitch = selected_drift > self.max_acceptable_drift;
        if self.last_render_had_glitch {
            tracing::debug!(
                "selected frame drift {:?} exceeds bound {:?}",
                selected_drift,
                self.max_acceptable_drift
            );
        }

        // Cadence-quality diagnostics: moving on while the current frame is
        // under its ideal count, or repeating it past the ideal count, both
        // count as glitches.
        if self.cadence.has_cadence() {
            let current = &self.queue[self.last_frame_index];
            let (render_count, ideal, pts) =
                (current.render_count, current.ideal_render_count, current.frame.pts);
            if frame_to_render != self.last_frame_index && render_count < ideal {
                tracing::debug!(
                    "under-rendered frame pts={:?}: {} of {} intervals",
                    pts,
                    render_count,
                    ideal
                );
                self.last_render_had_glitch = true;
            } else if frame_to_render == self.last_frame_index && render_count >= ideal {
                tracing::debug!(
                    "over-rendered frame pts={:?}: {} of {} intervals",
                    pts,
                    render_count + 1,
                    ideal
                );
                self.last_render_had_glitch = true;
            }
        }

        // Discard everything before the selection. A frame whose render and
        // drop counts match was never actually composited and is reported as
        // dropped.
        let mut frames_dropped = 0;
        if frame_to_render > 0 {
            for i in 0..frame_to_render {
                let f = &self.queue[i];
                if f.render_count != f.drop_count {
                    continue;
                }

                if !self.config.drop_frames {
                    frame_to_render = i;
                    break;
                }

                tracing::debug!(
                    "dropping frame pts={:?} (render_count={}, drop_count={})",
                    f.frame.pts,
                    f.render_count,
                    f.drop_count
                );
                frames_dropped += 1;
                if !self.cadence.has_cadence() || f.ideal_render_count > 0 {
                    self.last_render_had_glitch = true;
                }
            }

            self.queue.drain(..frame_to_render);
        }

        self.last_frame_index = 0;
        let selected = &mut self.queue[0];
        selected.render_count += 1;

        self.stats.record_render(self.last_render_had_glitch);
        self.stats.record_dropped(frames_dropped);

        Some(RenderResult {
            frame: Arc::clone(&selected.frame),
            frames_dropped,
        })
    }

    /// Discards queued frames too old to ever be selected, always leaving at
    /// least one frame. Returns the number removed.
    ///
    /// Independent of [`render`](Self::render): callers use it to keep depth
    /// queries honest between render calls without disturbing playback.
    pub fn remove_expired_frames(&mut self, deadline: Instant) -> usize {
        // Keep the deadline fresh even when nothing expires, or depth queries
        // would never age out the tail.
        if self.last_deadline_max.map_or(true, |m| deadline > m) {
            self.last_deadline_max = Some(deadline);
        }

        if !self.update_frame_statistics() || self.queue.len() < 2 {
            return 0;
        }

        debug_assert!(self.average_frame_duration > Duration::ZERO);

        let Some(minimum_start) =
            deadline.checked_sub(self.max_acceptable_drift + self.average_frame_duration)
        else {
            return 0;
        };

        let mut expired = 0;
        while expired < self.queue.len() - 1 {
            match self.queue[expired].start_time {
                Some(start) if start < minimum_start => expired += 1,
                _ => break,
            }
        }

        if expired == 0 {
            return 0;
        }

        tracing::debug!("expired {} frame(s) behind deadline {:?}", expired, deadline);
        self.queue.drain(..expired);
        self.last_frame_index = self.last_frame_index.saturating_sub(expired);
        self.stats.record_expired(expired);
        expired
    }

    /// Notification from the compositor that the most recently rendered frame
    /// was ultimately discarded instead of shown.
    ///
    /// Compositing is disconnected from scheduling, so a stale notification
    /// can arrive after a [`reset`](Self::reset) or an expiration sweep;
    /// those are ignored.
    pub fn on_last_frame_dropped(&mut self) {
        if !self.have_rendered_frames || self.queue.is_empty() {
            return;
        }

        let frame = &mut self.queue[self.last_frame_index];
        if frame.drop_count < frame.render_count {
            frame.drop_count += 1;
        }
    }

    /// Estimated number of queued frames still useful for future
    /// presentation. Pure query; drives decoder backpressure.
    pub fn effective_frames_queued(&self) -> usize {
        let Some(last_deadline_max) = self.last_deadline_max else {
            return self.queue.len();
        };
        if self.queue.is_empty() || self.average_frame_duration.is_zero() {
            return self.queue.len();
        }

        // Without cadence, a frame stops being useful once its display
        // window has passed the most recent deadline.
        if !self.cadence.has_cadence() {
            debug_assert!(self.last_frame_index < self.queue.len());
            let mut expired = self.last_frame_index;
            while expired < self.queue.len() {
                match self.queue[expired].end_time {
                    Some(end) if end <= last_deadline_max => expired += 1,
                    _ => break,
                }
            }
            return self.queue.len() - expired;
        }

        // With cadence, count frames that still owe render intervals and
        // haven't aged past the drift bound.
        let Some((start_index, _)) = self.best_frame_by_cadence_internal() else {
            return 0;
        };
        let minimum_start = last_deadline_max.checked_sub(self.max_acceptable_drift);
        let mut renderable = 0;
        for i in start_index..self.queue.len() {
            let f = &self.queue[i];
            let fresh = match (f.end_time, minimum_start) {
                (Some(end), Some(min)) => end > min,
                _ => true,
            };
            if f.render_count < f.ideal_render_count && fresh {
                renderable += 1;
            }
        }
        renderable
    }

    /// Returns the scheduler to its initial empty state. Used on seek and
    /// rate change; stale drop notifications arriving afterwards are ignored.
    pub fn reset(&mut self) {
        self.last_frame_index = 0;
        self.have_rendered_frames = false;
        self.last_render_had_glitch = false;
        self.last_deadline_max = None;
        self.average_frame_duration = Duration::ZERO;
        self.render_interval = Duration::ZERO;
        self.queue.clear();
        self.cadence.reset();
        self.duration_window.reset();
        self.max_acceptable_drift = self.config.startup_max_drift;
    }

    /// Number of frames currently queued, regardless of usefulness.
    pub fn frames_queued(&self) -> usize {
        self.queue.len()
    }

    /// Current moving-average frame duration; zero until enough frames have
    /// been observed.
    pub fn average_frame_duration(&self) -> Duration {
        self.average_frame_duration
    }

    /// Whether the most recent render exceeded the drift bound or broke
    /// cadence. Telemetry only; never an error.
    pub fn last_render_had_glitch(&self) -> bool {
        self.last_render_had_glitch
    }

    /// Enables or disables frame dropping. See
    /// [`SchedulerConfig::drop_frames`].
    pub fn set_frame_dropping_enabled(&mut self, enabled: bool) {
        self.config.drop_frames = enabled;
    }

    /// Returns a handle to this scheduler's telemetry counters. Counters are
    /// cumulative across [`reset`](Self::reset).
    pub fn stats(&self) -> SchedulerStats {
        self.stats.clone()
    }

    /// Charges the previously selected frame for refresh intervals the
    /// consumer skipped entirely (no render call arrived for them).
    fn account_for_missed_intervals(&mut self, deadline_min: Instant) {
        let Some(last_deadline_max) = self.last_deadline_max else {
            return;
        };
        if deadline_min <= last_deadline_max || self.render_interval.is_zero() {
            return;
        }

        let missed = ((deadline_min - last_deadline_max).as_nanos()
            / self.render_interval.as_nanos()) as u32;
        if missed == 0 {
            return;
        }
        tracing::debug!("missed {} render interval(s)", missed);

        // Only charge the frame if it was ever rendered; it may not have been
        // if nothing has been selected yet or expiration removed its
        // predecessors.
        let frame = &mut self.queue[self.last_frame_index];
        if frame.render_count == 0 {
            return;
        }

        // A frame that was dropped on every attempt keeps its counts matched,
        // so it is still reported as dropped when discarded.
        if frame.render_count == frame.drop_count {
            frame.drop_count = frame.drop_count.saturating_add(missed);
        }
        frame.render_count = frame.render_count.saturating_add(missed);
    }

    /// Recomputes wall-clock windows for all queued frames, the average frame
    /// duration, the drift bound, and the cadence estimate.
    ///
    /// Returns false when wall-clock time is unavailable or fewer than two
    /// frames have ever been observed; selection cannot run in that state.
    fn update_frame_statistics(&mut self) -> bool {
        for i in 0..self.queue.len() {
            let is_new = self.queue[i].start_time.is_none();
            let start = self.clock.wall_time_for(self.queue[i].frame.pts);
            self.queue[i].start_time = start;

            let Some(start) = start else {
                // Time stopped or never started; nothing downstream is valid.
                self.queue[i].end_time = None;
                return false;
            };

            if i > 0 {
                self.queue[i - 1].end_time = Some(start);
                if let Some(prev_start) = self.queue[i - 1].start_time {
                    match start.checked_duration_since(prev_start) {
                        Some(delta) if delta > Duration::ZERO => {
                            if is_new {
                                self.duration_window.add_sample(delta);
                            }
                        }
                        // Identical timestamps, or a playback-rate change
                        // ticked wall clock backwards between frames; not a
                        // usable duration sample.
                        _ => tracing::trace!("non-increasing wall clock between queued frames"),
                    }
                }
            }
        }

        if self.duration_window.count() == 0 {
            return false;
        }

        self.average_frame_duration = self.duration_window.average();
        if let Some(back) = self.queue.back_mut() {
            back.end_time = back.start_time.map(|s| s + self.average_frame_duration);
        }

        // ITU-R BR.265 allows +/- half the frame duration; anything under the
        // configured floor is imperceptible regardless of frame rate.
        self.max_acceptable_drift =
            (self.average_frame_duration / 2).max(self.config.drift_floor);

        // Render() has not run yet when called from an expiration sweep; no
        // render interval means no cadence to estimate.
        if self.render_interval.is_zero() {
            return true;
        }

        let cadence_changed = self.cadence.update_estimate(
            self.render_interval,
            self.average_frame_duration,
            self.max_acceptable_drift,
        );
        if cadence_changed {
            self.stats.record_cadence_change();
            self.update_cadence_for_frames();
        }

        true
    }

    /// Reprojects ideal render counts from the current position onward.
    fn update_cadence_for_frames(&mut self) {
        let has_cadence = self.cadence.has_cadence();
        for i in self.last_frame_index..self.queue.len() {
            let ideal = if has_cadence {
                self.cadence
                    .cadence_for_frame((i - self.last_frame_index) as u64)
            } else {
                0
            };
            self.queue[i].ideal_render_count = ideal;
        }
    }

    /// Cadence selection entry point: also commits the adjusted ideal count
    /// onto the chosen frame so its bookkeeping matches what the comparison
    /// used.
    fn best_frame_by_cadence(&mut self) -> Option<usize> {
        if !self.cadence.has_cadence() {
            return None;
        }
        let (index, adjusted_ideal) = self.best_frame_by_cadence_internal()?;
        debug_assert!(adjusted_ideal > 0);
        self.queue[index].ideal_render_count = adjusted_ideal;
        Some(index)
    }

    /// Finds the earliest frame still owed render intervals under the current
    /// cadence, carrying any over-render of the current frame forward as a
    /// deduction against later frames' ideal counts.
    ///
    /// Returns the frame index and its ideal count net of that deduction.
    fn best_frame_by_cadence_internal(&self) -> Option<(usize, u32)> {
        debug_assert!(!self.queue.is_empty());
        debug_assert!(self.cadence.has_cadence());

        let current = &self.queue[self.last_frame_index];
        if current.render_count < current.ideal_render_count {
            return Some((self.last_frame_index, current.ideal_render_count));
        }

        let mut overage = current.render_count.saturating_sub(current.ideal_render_count);
        for i in self.last_frame_index + 1..self.queue.len() {
            let ideal = self.queue[i].ideal_render_count;
            if ideal > overage {
                return Some((i, ideal - overage));
            }
            overage -= ideal;
        }

        // Not enough queued frames to absorb the overage.
        None
    }

    /// Finds the frame covering the most of `[deadline_min, deadline_max)`,
    /// and the runner-up. Frames with near-identical coverage (within the
    /// jitter tolerance) rank by earliness instead.
    fn best_frame_by_coverage(
        &self,
        deadline_min: Instant,
        deadline_max: Instant,
    ) -> (Option<usize>, Option<usize>) {
        debug_assert!(!self.queue.is_empty());

        let mut coverage = vec![Duration::ZERO; self.queue.len()];
        let mut best: Option<usize> = None;
        let mut best_coverage = Duration::ZERO;

        for i in self.last_frame_index..self.queue.len() {
            let f = &self.queue[i];
            let (Some(start), Some(end)) = (f.start_time, f.end_time) else {
                continue;
            };

            // Later frames only start later; nothing past this one overlaps.
            if start > deadline_max {
                break;
            }

            let end = end.min(deadline_max);
            if end < deadline_min {
                continue;
            }

            coverage[i] = end.saturating_duration_since(start.max(deadline_min));
            if coverage[i] > best_coverage {
                best = Some(i);
                best_coverage = coverage[i];
            }
        }

        let mut second: Option<usize> = None;
        if let Some(b) = best {
            coverage[b] = Duration::ZERO;
            let mut second_coverage = Duration::ZERO;
            for (i, &c) in coverage.iter().enumerate() {
                if c > second_coverage {
                    second = Some(i);
                    second_coverage = c;
                }
            }

            if let Some(s) = second {
                if b > s && best_coverage - second_coverage <= self.config.coverage_jitter_tolerance
                {
                    return (second, Some(b));
                }
            }
        }

        (best, second)
    }

    /// Last resort: the frame with the smallest absolute drift from
    /// `deadline_min`, preferring the later frame on ties.
    fn best_frame_by_drift(&self, deadline_min: Instant) -> (usize, Duration) {
        debug_assert!(!self.queue.is_empty());

        let mut best = self.last_frame_index;
        let mut best_drift = Duration::MAX;
        for i in self.last_frame_index..self.queue.len() {
            let drift = self.absolute_drift(deadline_min, i);
            if drift <= best_drift {
                best_drift = drift;
                best = i;
            }
        }
        (best, best_drift)
    }

    /// Absolute distance from the frame's display window to `deadline_min`;
    /// zero when the window contains it.
    fn absolute_drift(&self, deadline_min: Instant, index: usize) -> Duration {
        let f = &self.queue[index];
        let (Some(start), Some(end)) = (f.start_time, f.end_time) else {
            return Duration::MAX;
        };
        if end < deadline_min {
            return deadline_min - end;
        }
        if start > deadline_min {
            return start - deadline_min;
        }
        Duration::ZERO
    }
}
