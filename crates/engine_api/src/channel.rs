//! Cross-thread frame hand-off between engine callbacks and the UI loop.

use crate::engine::{EngineEvent, EngineEventSink};
use crate::frame::{FrameBuffer, FrameError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// FIFO of frames awaiting display.
///
/// The producer side pushes from engine threads, the UI thread drains.
/// One lock guards the queue and is held only for the queue operation
/// itself, never while pixels are copied or uploaded. The queue is
/// unbounded; the consumer is expected to drain it every tick.
#[derive(Debug, Default)]
pub struct FrameChannel {
    queue: Mutex<VecDeque<FrameBuffer>>,
}

impl FrameChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame at the tail. Callable from any thread.
    pub fn push(&self, frame: FrameBuffer) {
        self.lock().push_back(frame);
    }

    /// Removes and returns the oldest frame, or `None` when empty.
    /// Never blocks waiting for a producer.
    pub fn drain_one(&self) -> Option<FrameBuffer> {
        self.lock().pop_front()
    }

    /// Discards every queued frame. Used at session teardown.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of frames currently waiting.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<FrameBuffer>> {
        // The queue holds plain owned data, so it stays usable even if a
        // producer thread panicked while holding the lock.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Producer-facing entry point for finished frames.
///
/// This is the callback surface an engine invokes with raw pixel output.
/// The bytes are copied before the call returns, so the engine may free
/// or reuse its buffer immediately. Invalid input is logged, dropped and
/// reported back; the queue is left untouched.
#[derive(Clone)]
pub struct FrameSink {
    channel: Arc<FrameChannel>,
}

impl FrameSink {
    pub fn new(channel: Arc<FrameChannel>) -> Self {
        Self { channel }
    }

    /// Validates, copies and enqueues one frame emission.
    pub fn on_image(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<(), FrameError> {
        match FrameBuffer::copy_from(bytes, width, height, channels) {
            Ok(frame) => {
                self.channel.push(frame);
                Ok(())
            }
            Err(err) => {
                log::warn!("Dropping invalid frame from producer: {err}");
                Err(err)
            }
        }
    }
}

/// Routes engine events onto a frame channel.
///
/// `ImageReady` frames are queued; every other variant is only logged,
/// which keeps the channel the sole state shared with engine threads.
pub struct ChannelSink {
    channel: Arc<FrameChannel>,
}

impl ChannelSink {
    pub fn new(channel: Arc<FrameChannel>) -> Self {
        Self { channel }
    }
}

impl EngineEventSink for ChannelSink {
    fn on_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::ImageReady(frame) => self.channel.push(frame),
            EngineEvent::Started { pass } => log::info!("Render pass '{pass}' started"),
            EngineEvent::Status { pass, message } => log::info!("[{pass}] {message}"),
            EngineEvent::Progress { pass, percent } => {
                log::debug!("[{pass}] {percent:.1}% complete")
            }
            EngineEvent::Error { pass, message } => log::error!("[{pass}] engine error: {message}"),
            EngineEvent::Stopped { pass } => log::info!("Render pass '{pass}' stopped"),
        }
    }
}
