//! framepacer: display-refresh frame scheduling for video playback.
//!
//! Given a queue of decoded frames and a vsync-driven render loop, this crate
//! decides which frame to present for each refresh deadline. It tracks the
//! cadence between the video frame rate and the display refresh rate, falls
//! back to deadline-coverage and drift-based selection when no cadence holds,
//! and keeps the drop/expiration bookkeeping the rest of a playback pipeline
//! needs for backpressure and quality telemetry.
//!
//! The crate is deliberately narrow: no decoding, no compositing, no clocks
//! of its own. The decoder hands in [`VideoFrame`]s, a [`MediaClock`] maps
//! media time to wall-clock time (owning playback rate and pause state), and
//! the compositor drives [`RenderScheduler::render`] once per refresh
//! interval.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use framepacer::{PlaybackClock, RenderScheduler, VideoFrame};
//!
//! let start = Instant::now();
//! let mut scheduler = RenderScheduler::new(PlaybackClock::new(start, 1.0));
//!
//! // Decoder side: enqueue frames as they come out of the decoder.
//! for i in 0..4u64 {
//!     let pts = Duration::from_millis(i * 33);
//!     scheduler.enqueue_frame(Arc::new(VideoFrame::new(pts, i)));
//! }
//!
//! // Compositor side: once per refresh interval, ask what to show.
//! let refresh = Duration::from_micros(16_667);
//! if let Some(result) = scheduler.render(start, start + refresh) {
//!     assert_eq!(result.frame.payload, 0);
//! }
//! ```
//!
//! All scheduler methods must be called from one thread (or behind one lock);
//! see the [`scheduler`] module docs.

pub mod cadence;
pub mod clock;
pub mod frame;
pub mod moving_average;
pub mod scheduler;
pub mod stats;

pub use cadence::{CadenceEstimator, PatternCadenceEstimator};
pub use clock::{MediaClock, PlaybackClock};
pub use frame::VideoFrame;
pub use scheduler::{RenderResult, RenderScheduler, SchedulerConfig};
pub use stats::{SchedulerStats, SchedulerStatsSnapshot};
