//! Playback scheduling integration tests.
//!
//! These tests drive a [`RenderScheduler`] the way a real pipeline would: a
//! producer enqueues frames at a source frame rate and a render loop calls
//! `render` once per display refresh interval, then they assert on the
//! selection sequence, drop counts, and telemetry.
//!
//! Wall-clock time is simulated: deadlines are computed from a fixed origin
//! instant, so the tests are deterministic and run in microseconds.
//!
//! ```bash
//! cargo test --package framepacer --test playback_test
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use framepacer::{RenderScheduler, VideoFrame};

/// One 60Hz refresh interval.
const INTERVAL: Duration = Duration::from_micros(16_667);
/// One ~30fps frame duration, exactly two refresh intervals.
const FRAME_30FPS: Duration = Duration::from_micros(33_334);
/// One ~120fps frame duration, about half a refresh interval.
const FRAME_120FPS: Duration = Duration::from_micros(8_333);

fn make_frame(pts: Duration) -> Arc<VideoFrame<u64>> {
    Arc::new(VideoFrame::new(pts, pts.as_micros() as u64))
}

fn scheduler_at(origin: Instant) -> RenderScheduler<u64> {
    RenderScheduler::new(move |pts: Duration| Some(origin + pts))
}

/// Renders `count` consecutive refresh intervals starting at interval
/// `first`, returning (pts, frames_dropped, glitched) per call.
fn drive_renders(
    scheduler: &mut RenderScheduler<u64>,
    origin: Instant,
    first: u32,
    count: u32,
) -> Vec<(Duration, usize, bool)> {
    let mut outputs = Vec::new();
    for k in first..first + count {
        let deadline_min = origin + INTERVAL * k;
        let result = scheduler
            .render(deadline_min, deadline_min + INTERVAL)
            .expect("queue is non-empty");
        outputs.push((
            result.frame.pts,
            result.frames_dropped,
            scheduler.last_render_had_glitch(),
        ));
    }
    outputs
}

/// 30fps content on a 60Hz display locks to a 2-interval cadence: every frame
/// is shown exactly twice, nothing is dropped, nothing glitches.
#[test]
fn test_30fps_in_60hz_locks_to_two_interval_cadence() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    for i in 0..30u32 {
        scheduler.enqueue_frame(make_frame(FRAME_30FPS * i));
    }

    let outputs = drive_renders(&mut scheduler, origin, 0, 60);
    for (k, (pts, dropped, glitched)) in outputs.iter().enumerate() {
        assert_eq!(
            *pts,
            FRAME_30FPS * (k as u32 / 2),
            "interval {k} selected the wrong frame"
        );
        assert_eq!(*dropped, 0, "interval {k} dropped frames");
        assert!(!glitched, "interval {k} glitched");
    }

    let snap = scheduler.stats().snapshot();
    assert_eq!(snap.frames_rendered, 60);
    assert_eq!(snap.frames_dropped, 0);
    assert_eq!(snap.glitched_renders, 0);
    assert!(snap.cadence_changes >= 1, "cadence never locked");
}

/// 120fps content on a 60Hz display locks to a fractional cadence: every
/// other frame is shown once and the skipped frames are reported dropped
/// without counting as glitches.
#[test]
fn test_120fps_in_60hz_renders_every_other_frame() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    for i in 0..40u32 {
        scheduler.enqueue_frame(make_frame(FRAME_120FPS * i));
    }

    let outputs = drive_renders(&mut scheduler, origin, 0, 13);

    // Skip the warmup where cadence hasn't locked yet; after that every
    // render advances two source frames and drops the skipped one cleanly.
    for (k, (pts, dropped, glitched)) in outputs.iter().enumerate().skip(7) {
        assert_eq!(*pts, FRAME_120FPS * (2 * k as u32));
        assert_eq!(*dropped, 1, "interval {k} should skip one source frame");
        assert!(!glitched, "cadence-planned skips must not glitch");
    }
}

/// A lone frame is re-presented for every deadline, however far the deadline
/// wanders from its timestamp; nothing is ever dropped.
#[test]
fn test_single_frame_is_represented_indefinitely() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    scheduler.enqueue_frame(make_frame(Duration::ZERO));

    for _ in 0..10 {
        let result = scheduler
            .render(
                origin + Duration::from_millis(5),
                origin + Duration::from_millis(21),
            )
            .expect("single queued frame must always be returned");
        assert_eq!(result.frame.pts, Duration::ZERO);
        assert_eq!(result.frames_dropped, 0);
    }
    assert_eq!(scheduler.frames_queued(), 1);
}

/// An expiration sweep discards frames that can no longer be selected but
/// always leaves one, and updates the deadline used by depth queries.
#[test]
fn test_expiration_sweep_trims_stale_frames() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    for ms in [0u64, 10, 20] {
        scheduler.enqueue_frame(make_frame(Duration::from_millis(ms)));
    }

    let removed = scheduler.remove_expired_frames(origin + Duration::from_millis(100));
    assert_eq!(removed, 2);
    assert_eq!(scheduler.frames_queued(), 1);

    // The surviving frame's display window is also long past the deadline,
    // so it no longer counts toward effective depth.
    assert_eq!(scheduler.effective_frames_queued(), 0);
}

/// Frames arriving out of decode order are presented in timestamp order.
#[test]
fn test_out_of_order_arrival_presents_in_timestamp_order() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    for ms in [20u64, 0, 10] {
        scheduler.enqueue_frame(make_frame(Duration::from_millis(ms)));
    }

    let mut selected = Vec::new();
    for k in 0..3u32 {
        let deadline_min = origin + Duration::from_millis(10) * k;
        let result = scheduler
            .render(deadline_min, deadline_min + Duration::from_millis(10))
            .expect("frames queued");
        selected.push(result.frame.pts);
        assert_eq!(result.frames_dropped, 0);
    }
    assert_eq!(
        selected,
        vec![
            Duration::ZERO,
            Duration::from_millis(10),
            Duration::from_millis(20)
        ]
    );
}

/// Selection never moves backwards in timestamp, even when a straggler frame
/// with an older timestamp arrives mid-playback.
#[test]
fn test_selection_is_monotonic_despite_stragglers() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    for i in 0..6u32 {
        scheduler.enqueue_frame(make_frame(FRAME_30FPS * i));
    }

    let mut last_pts = Duration::ZERO;
    for k in 0..10u32 {
        // A reordered frame shows up between already-presented timestamps.
        if k == 4 {
            scheduler.enqueue_frame(make_frame(Duration::from_micros(16_667)));
        }

        let deadline_min = origin + INTERVAL * k;
        let result = scheduler
            .render(deadline_min, deadline_min + INTERVAL)
            .expect("frames queued");
        assert!(
            result.frame.pts >= last_pts,
            "selection moved backwards at interval {k}"
        );
        last_pts = result.frame.pts;
    }
}

/// A drop notification before anything was rendered is ignored.
#[test]
fn test_stale_drop_notification_is_ignored() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    scheduler.on_last_frame_dropped();

    scheduler.enqueue_frame(make_frame(Duration::ZERO));
    scheduler.on_last_frame_dropped();

    let result = scheduler
        .render(origin, origin + INTERVAL)
        .expect("frame queued");
    assert_eq!(result.frames_dropped, 0);
}

/// Reset returns the scheduler to its initial state: replaying the same
/// enqueues and deadlines reproduces the same selections.
#[test]
fn test_reset_replay_is_deterministic() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);

    let run = |scheduler: &mut RenderScheduler<u64>| {
        for i in 0..4u32 {
            scheduler.enqueue_frame(make_frame(FRAME_30FPS * i));
        }
        drive_renders(scheduler, origin, 0, 8)
    };

    let first = run(&mut scheduler);
    scheduler.reset();
    let second = run(&mut scheduler);
    assert_eq!(first, second);
}

/// With frame dropping disabled, content the algorithm would skip is played
/// out instead, earliest first.
#[test]
fn test_disabled_frame_dropping_never_skips_content() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    scheduler.set_frame_dropping_enabled(false);
    for i in 0..5u32 {
        scheduler.enqueue_frame(make_frame(FRAME_30FPS * i));
    }

    // Jump the render loop well past the first frames.
    let result = scheduler
        .render(origin + INTERVAL * 6, origin + INTERVAL * 7)
        .expect("frames queued");
    assert_eq!(result.frame.pts, Duration::ZERO);
    assert_eq!(result.frames_dropped, 0);
    assert_eq!(scheduler.stats().snapshot().frames_dropped, 0);
}

/// Telemetry counters agree with the per-call outputs over a scripted run.
#[test]
fn test_stats_match_render_outputs() {
    let origin = Instant::now();
    let mut scheduler = scheduler_at(origin);
    for i in 0..8u32 {
        scheduler.enqueue_frame(make_frame(FRAME_30FPS * i));
    }

    // Render a few intervals, then jump ahead to force drops.
    let mut total_dropped = 0;
    let mut renders = 0u64;
    for k in [0u32, 1, 2, 3, 10, 11] {
        let deadline_min = origin + INTERVAL * k;
        let result = scheduler
            .render(deadline_min, deadline_min + INTERVAL)
            .expect("frames queued");
        total_dropped += result.frames_dropped as u64;
        renders += 1;
    }

    let snap = scheduler.stats().snapshot();
    assert_eq!(snap.frames_rendered, renders);
    assert_eq!(snap.frames_dropped, total_dropped);
    assert!(total_dropped > 0, "the jump ahead should have dropped frames");
}
