//! framepacer demo: simulated playback.
//!
//! Runs a synthetic decoder on one thread and a vsync-style render loop on
//! the main thread, sharing a [`RenderScheduler`] behind a mutex the way a
//! real pipeline serializes access. Prints scheduling telemetry once per
//! second and a summary at the end.
//!
//! ```bash
//! cargo run -p framepacer-demo -- [FPS] [REFRESH_HZ] [SECONDS]
//! RUST_LOG=framepacer=debug cargo run -p framepacer-demo -- 24 60 5
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use framepacer::{PlaybackClock, RenderScheduler, VideoFrame};

/// Stop decoding while this many useful frames are already buffered.
const TARGET_QUEUE_DEPTH: usize = 4;

/// How often the render loop runs an expiration sweep, in refresh intervals.
const SWEEP_EVERY_INTERVALS: u32 = 30;

/// Demo payload: just the source frame number.
type FrameNumber = u64;

#[derive(Debug, Clone, Copy)]
struct DemoOptions {
    fps: f64,
    refresh_hz: f64,
    seconds: f64,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            fps: 24.0,
            refresh_hz: 60.0,
            seconds: 10.0,
        }
    }
}

impl DemoOptions {
    fn from_args(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut options = Self::default();
        let fields: [(&str, &mut f64); 3] = [
            ("FPS", &mut options.fps),
            ("REFRESH_HZ", &mut options.refresh_hz),
            ("SECONDS", &mut options.seconds),
        ];
        let mut fields = fields.into_iter();
        for arg in args {
            let Some((name, slot)) = fields.next() else {
                return Err(format!("unexpected argument: {arg}"));
            };
            *slot = arg
                .parse::<f64>()
                .map_err(|_| format!("{name} must be a number, got {arg:?}"))?;
            if *slot <= 0.0 {
                return Err(format!("{name} must be positive, got {arg}"));
            }
        }
        Ok(options)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framepacer=info".parse().expect("valid directive"))
                .add_directive("framepacer_demo=info".parse().expect("valid directive")),
        )
        .init();

    let options = match DemoOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: framepacer-demo [FPS] [REFRESH_HZ] [SECONDS]");
            std::process::exit(2);
        }
    };

    tracing::info!(
        "simulating {:.3}fps content on a {:.1}Hz display for {:.1}s",
        options.fps,
        options.refresh_hz,
        options.seconds
    );
    run(options);
}

fn run(options: DemoOptions) {
    let origin = Instant::now();
    let scheduler: Arc<Mutex<RenderScheduler<FrameNumber>>> = Arc::new(Mutex::new(
        RenderScheduler::new(PlaybackClock::new(origin, 1.0)),
    ));
    let stats = scheduler.lock().stats();

    let frame_duration = Duration::from_secs_f64(1.0 / options.fps);
    let render_interval = Duration::from_secs_f64(1.0 / options.refresh_hz);
    let run_for = Duration::from_secs_f64(options.seconds);

    let running = Arc::new(AtomicBool::new(true));
    let decoder = spawn_decoder(
        Arc::clone(&scheduler),
        Arc::clone(&running),
        frame_duration,
        run_for,
    );

    // Render loop: one call per refresh interval, paced against wall clock.
    let mut interval_index: u32 = 0;
    let mut last_report = origin;
    while origin.elapsed() < run_for {
        let deadline_min = origin + render_interval * interval_index;
        let deadline_max = deadline_min + render_interval;

        if let Some(wait) = deadline_min.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }

        {
            let mut scheduler = scheduler.lock();
            if interval_index % SWEEP_EVERY_INTERVALS == 0 {
                scheduler.remove_expired_frames(deadline_min);
            }
            if let Some(result) = scheduler.render(deadline_min, deadline_max) {
                tracing::debug!(
                    "interval {}: frame #{} (pts={:?}, dropped={})",
                    interval_index,
                    result.frame.payload,
                    result.frame.pts,
                    result.frames_dropped
                );
            } else {
                tracing::debug!("interval {}: queue empty", interval_index);
            }
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            tracing::info!("{}", stats.snapshot());
            last_report = Instant::now();
        }
        interval_index += 1;
    }

    running.store(false, Ordering::Release);
    let _ = decoder.join();

    let snap = stats.snapshot();
    tracing::info!("done: {snap}");
    println!("{snap}");
}

/// Simulated decoder: produces frames in presentation order, pacing itself
/// off the scheduler's effective queue depth the way a real decoder responds
/// to backpressure.
fn spawn_decoder(
    scheduler: Arc<Mutex<RenderScheduler<FrameNumber>>>,
    running: Arc<AtomicBool>,
    frame_duration: Duration,
    run_for: Duration,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let total_frames = (run_for.as_secs_f64() / frame_duration.as_secs_f64()).ceil() as u64;
        let mut next_frame: u64 = 0;

        while running.load(Ordering::Acquire) && next_frame < total_frames {
            let backlogged = {
                let scheduler = scheduler.lock();
                scheduler.effective_frames_queued() >= TARGET_QUEUE_DEPTH
            };

            if backlogged {
                std::thread::sleep(frame_duration / 2);
                continue;
            }

            let pts = frame_duration * next_frame as u32;
            scheduler
                .lock()
                .enqueue_frame(Arc::new(VideoFrame::new(pts, next_frame)));
            next_frame += 1;
        }
        tracing::info!("decoder finished after {next_frame} frames");
    })
}
