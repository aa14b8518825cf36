//! The render engine seam: commands sent in, events received back.

use crate::frame::FrameBuffer;
use glam::Vec2;

/// Camera and lifecycle operations a preview can invoke on a renderer.
///
/// Implementations resolve their own active camera; the viewer supplies
/// only screen-space deltas. Methods may be called from the UI thread
/// while the engine renders on its own threads, so implementations must
/// be internally synchronized.
pub trait RenderEngine: Send + Sync {
    /// True while a render pass is actively producing frames.
    fn is_rendering(&self) -> bool;

    /// Opens an atomic scene-update batch.
    fn begin_scene_update(&self);

    /// Closes the batch opened by `begin_scene_update`, letting the
    /// engine apply the mutations and restart affected passes.
    fn end_scene_update(&self);

    /// Rotates the active camera around its target.
    fn orbit_camera(&self, delta: Vec2);

    /// Translates the camera in its view plane. `move_target` drags the
    /// orbit target along with the eye.
    fn pan_camera(&self, delta: Vec2, move_target: bool);

    /// Moves the camera along its view axis.
    fn dolly_camera(&self, amount: f32, move_target: bool);
}

/// RAII bracket for one atomic batch of scene mutations.
///
/// Construction opens the update; dropping closes it, so the bracket is
/// balanced on every exit path.
pub struct SceneUpdateScope<'a> {
    engine: &'a dyn RenderEngine,
}

impl<'a> SceneUpdateScope<'a> {
    pub fn new(engine: &'a dyn RenderEngine) -> Self {
        engine.begin_scene_update();
        Self { engine }
    }
}

impl Drop for SceneUpdateScope<'_> {
    fn drop(&mut self) {
        self.engine.end_scene_update();
    }
}

/// The closed set of notifications an engine emits during a render.
///
/// `ImageReady` is the only variant the preview pipeline consumes; the
/// rest exist for logging and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A render pass began producing output.
    Started { pass: String },
    /// Free-form status line from the engine.
    Status { pass: String, message: String },
    /// Completion estimate for the current pass, in percent.
    Progress { pass: String, percent: f32 },
    /// A finished frame, already validated and owned.
    ImageReady(FrameBuffer),
    /// The engine hit a problem it could not recover from.
    Error { pass: String, message: String },
    /// A render pass finished or was cancelled.
    Stopped { pass: String },
}

/// Receiver for [`EngineEvent`]s.
///
/// Invoked from engine threads, concurrently with UI-thread work.
pub trait EngineEventSink: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEngine {
        begins: AtomicUsize,
        ends: AtomicUsize,
    }

    impl RenderEngine for CountingEngine {
        fn is_rendering(&self) -> bool {
            true
        }

        fn begin_scene_update(&self) {
            self.begins.fetch_add(1, Ordering::SeqCst);
        }

        fn end_scene_update(&self) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }

        fn orbit_camera(&self, _delta: Vec2) {}
        fn pan_camera(&self, _delta: Vec2, _move_target: bool) {}
        fn dolly_camera(&self, _amount: f32, _move_target: bool) {}
    }

    #[test]
    fn test_scope_opens_on_construction_and_closes_on_drop() {
        let engine = CountingEngine::default();
        {
            let _scope = SceneUpdateScope::new(&engine);
            engine.orbit_camera(Vec2::new(1.0, 0.0));
            assert_eq!(engine.begins.load(Ordering::SeqCst), 1);
            assert_eq!(engine.ends.load(Ordering::SeqCst), 0);
        }
        assert_eq!(engine.ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sequential_scopes_stay_balanced() {
        let engine = CountingEngine::default();
        for _ in 0..3 {
            let _scope = SceneUpdateScope::new(&engine);
        }
        assert_eq!(engine.begins.load(Ordering::SeqCst), 3);
        assert_eq!(engine.ends.load(Ordering::SeqCst), 3);
    }
}
