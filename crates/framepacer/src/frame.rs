//! Decoded-frame descriptors consumed by the scheduler.
//!
//! The scheduler never interprets pixel data; it only needs a presentation
//! timestamp and a shareable handle to whatever the decoder produced. The
//! payload type is generic so the same scheduler works over CPU buffers, GPU
//! surface handles, or unit payloads in tests.

use std::time::Duration;

/// A decoded video frame awaiting presentation.
///
/// `pts` is media time: the offset from stream start at which the frame should
/// be shown, before any playback-rate conversion. The payload is owned by the
/// producer; schedulers hold frames behind `Arc` and never clone the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame<P = ()> {
    /// Presentation timestamp (media time).
    pub pts: Duration,
    /// Opaque decoded data, e.g. a pixel buffer or a GPU surface handle.
    pub payload: P,
    end_of_stream: bool,
}

impl<P> VideoFrame<P> {
    /// Creates a regular frame with the given presentation timestamp.
    pub fn new(pts: Duration, payload: P) -> Self {
        Self {
            pts,
            payload,
            end_of_stream: false,
        }
    }

    /// Creates an end-of-stream marker.
    ///
    /// Markers exist so decode pipelines can flush a sentinel through their
    /// queues; they carry no displayable content and must not be handed to
    /// [`RenderScheduler::enqueue_frame`](crate::RenderScheduler::enqueue_frame).
    pub fn end_of_stream(pts: Duration, payload: P) -> Self {
        Self {
            pts,
            payload,
            end_of_stream: true,
        }
    }

    /// Returns true if this frame is an end-of-stream marker.
    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }
}
