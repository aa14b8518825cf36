//! Boundary between a progressive render engine and its preview window.
//!
//! The engine renders on its own threads and hands finished frames to the
//! viewer through a callback; the viewer runs a single UI thread that owns
//! every graphics resource. This crate defines the types that cross that
//! boundary:
//!
//! - [`FrameBuffer`]: one validated, immutable, owned image.
//! - [`FrameChannel`]: the lock-guarded FIFO the frames travel through.
//!   It is the only state shared between the two sides.
//! - [`RenderEngine`]: the camera and lifecycle commands the viewer sends
//!   back, batched in [`SceneUpdateScope`] brackets.
//! - [`EngineEvent`] / [`EngineEventSink`]: the closed set of
//!   notifications an engine emits, of which `ImageReady` carries frames.
//!
//! No graphics or windowing types appear here, so both engines and tests
//! can link against it headless.

pub mod channel;
pub mod engine;
pub mod frame;

pub use channel::{ChannelSink, FrameChannel, FrameSink};
pub use engine::{EngineEvent, EngineEventSink, RenderEngine, SceneUpdateScope};
pub use frame::{FrameBuffer, FrameError};
