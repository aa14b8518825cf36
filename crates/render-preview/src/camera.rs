//! Pointer-driven camera control.
//!
//! Button edges drive a three-state drag machine; per-tick pointer
//! deltas become incremental orbit and pan commands against the engine,
//! and wheel motion becomes a dolly. State transitions happen whether
//! or not an engine is attached; commands are only sent to an engine
//! that is actively rendering.

use engine_api::{RenderEngine, SceneUpdateScope};
use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Dolly units applied per wheel line.
const DOLLY_PER_LINE: f32 = 0.8;

/// Current drag gesture. The anchor is the pointer position the next
/// delta is measured from; it advances every time a delta is consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMode {
    Idle,
    Orbiting { anchor: Vec2 },
    Panning { anchor: Vec2 },
}

pub struct CameraController {
    mode: DragMode,
    cursor: Vec2,
    wheel: f32,
    orbit_speed: f32,
    pan_speed: f32,
}

impl CameraController {
    pub fn new(orbit_speed: f32, pan_speed: f32) -> Self {
        Self {
            mode: DragMode::Idle,
            cursor: Vec2::ZERO,
            wheel: 0.0,
            orbit_speed,
            pan_speed,
        }
    }

    /// Routes pointer events into the gesture state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { button, state, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => self.press_primary(),
                (MouseButton::Left, ElementState::Released) => self.release_primary(),
                (MouseButton::Middle, ElementState::Pressed) => self.press_secondary(),
                (MouseButton::Middle, ElementState::Released) => self.release_secondary(),
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };

                self.wheel_scrolled(lines);
            }
            _ => {}
        }
    }

    /// Routes only the button-release edges of `event`. Used for events
    /// another layer consumed: presses and motion may be withheld, but a
    /// dropped release would leave the drag gesture stuck with the
    /// button already up.
    pub fn handle_release_edges(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseInput {
            button,
            state: ElementState::Released,
            ..
        } = event
        {
            match button {
                MouseButton::Left => self.release_primary(),
                MouseButton::Middle => self.release_secondary(),
                _ => {}
            }
        }
    }

    /// Primary-button press edge; cancels a pan in progress.
    pub fn press_primary(&mut self) {
        self.mode = DragMode::Orbiting {
            anchor: self.cursor,
        };
    }

    /// Primary-button release edge; a pan started meanwhile is kept.
    pub fn release_primary(&mut self) {
        if matches!(self.mode, DragMode::Orbiting { .. }) {
            self.mode = DragMode::Idle;
        }
    }

    /// Middle-button press edge; cancels an orbit in progress.
    pub fn press_secondary(&mut self) {
        self.mode = DragMode::Panning {
            anchor: self.cursor,
        };
    }

    /// Middle-button release edge; an orbit started meanwhile is kept.
    pub fn release_secondary(&mut self) {
        if matches!(self.mode, DragMode::Panning { .. }) {
            self.mode = DragMode::Idle;
        }
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.cursor = position;
    }

    /// Accumulates wheel lines until the next tick consumes them.
    pub fn wheel_scrolled(&mut self, lines: f32) {
        self.wheel += lines;
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Short gesture name for the diagnostic overlay.
    pub fn mode_label(&self) -> &'static str {
        match self.mode {
            DragMode::Idle => "Idle",
            DragMode::Orbiting { .. } => "Orbiting",
            DragMode::Panning { .. } => "Panning",
        }
    }

    /// Consumes the input gathered since the last tick.
    ///
    /// Wheel motion dollies regardless of button state. An active drag
    /// whose pointer moved emits one orbit or pan command with the
    /// anchor-relative delta, then advances the anchor. Each command is
    /// bracketed by its own scene update scope. An absent or idle
    /// engine still gets the anchor bookkeeping, just no commands.
    pub fn tick(&mut self, engine: Option<&dyn RenderEngine>) {
        let engine = engine.filter(|engine| engine.is_rendering());

        let wheel = std::mem::take(&mut self.wheel);
        if wheel != 0.0 {
            if let Some(engine) = engine {
                let _scope = SceneUpdateScope::new(engine);
                engine.dolly_camera(wheel * DOLLY_PER_LINE, true);
            }
        }

        let (anchor, delta) = match &mut self.mode {
            DragMode::Idle => return,
            DragMode::Orbiting { anchor } => {
                let delta = (self.cursor - *anchor) * self.orbit_speed;
                (anchor, delta)
            }
            DragMode::Panning { anchor } => {
                let delta = (self.cursor - *anchor) * self.pan_speed;
                (anchor, delta)
            }
        };
        if delta == Vec2::ZERO {
            return;
        }
        *anchor = self.cursor;

        let Some(engine) = engine else {
            return;
        };
        let _scope = SceneUpdateScope::new(engine);
        match self.mode {
            DragMode::Orbiting { .. } => engine.orbit_camera(delta),
            DragMode::Panning { .. } => engine.pan_camera(delta, true),
            DragMode::Idle => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    enum Call {
        BeginUpdate,
        EndUpdate,
        Orbit(Vec2),
        Pan(Vec2, bool),
        Dolly(f32, bool),
    }

    struct RecordingEngine {
        rendering: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingEngine {
        fn new(rendering: bool) -> Self {
            Self {
                rendering,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut self.calls.lock().unwrap())
        }
    }

    impl RenderEngine for RecordingEngine {
        fn is_rendering(&self) -> bool {
            self.rendering
        }

        fn begin_scene_update(&self) {
            self.calls.lock().unwrap().push(Call::BeginUpdate);
        }

        fn end_scene_update(&self) {
            self.calls.lock().unwrap().push(Call::EndUpdate);
        }

        fn orbit_camera(&self, delta: Vec2) {
            self.calls.lock().unwrap().push(Call::Orbit(delta));
        }

        fn pan_camera(&self, delta: Vec2, move_target: bool) {
            self.calls.lock().unwrap().push(Call::Pan(delta, move_target));
        }

        fn dolly_camera(&self, amount: f32, move_target: bool) {
            self.calls.lock().unwrap().push(Call::Dolly(amount, move_target));
        }
    }

    fn controller() -> CameraController {
        CameraController::new(0.5, 0.01)
    }

    #[test]
    fn test_press_and_release_edges_drive_mode_transitions() {
        let mut ctl = controller();
        assert_eq!(ctl.mode(), DragMode::Idle);

        ctl.pointer_moved(Vec2::new(3.0, 7.0));
        ctl.press_primary();
        assert_eq!(
            ctl.mode(),
            DragMode::Orbiting {
                anchor: Vec2::new(3.0, 7.0)
            }
        );
        ctl.release_primary();
        assert_eq!(ctl.mode(), DragMode::Idle);

        ctl.press_secondary();
        assert_eq!(
            ctl.mode(),
            DragMode::Panning {
                anchor: Vec2::new(3.0, 7.0)
            }
        );
        ctl.release_secondary();
        assert_eq!(ctl.mode(), DragMode::Idle);
    }

    #[test]
    fn test_pressing_one_button_cancels_the_other_gesture() {
        let mut ctl = controller();
        ctl.pointer_moved(Vec2::new(5.0, 5.0));
        ctl.press_primary();
        ctl.pointer_moved(Vec2::new(9.0, 9.0));
        ctl.press_secondary();
        assert_eq!(
            ctl.mode(),
            DragMode::Panning {
                anchor: Vec2::new(9.0, 9.0)
            }
        );

        ctl.press_primary();
        assert_eq!(
            ctl.mode(),
            DragMode::Orbiting {
                anchor: Vec2::new(9.0, 9.0)
            }
        );
    }

    #[test]
    fn test_releasing_the_inactive_button_keeps_the_current_gesture() {
        let mut ctl = controller();
        ctl.press_primary();
        ctl.release_secondary();
        assert!(matches!(ctl.mode(), DragMode::Orbiting { .. }));
    }

    #[test]
    fn test_release_mid_drag_discards_the_pending_motion() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        // Drag far from the anchor, then release before any tick ran.
        ctl.pointer_moved(Vec2::new(10.0, 10.0));
        ctl.press_primary();
        ctl.pointer_moved(Vec2::new(200.0, 150.0));
        ctl.release_primary();
        assert_eq!(ctl.mode(), DragMode::Idle);

        // Later motion must not replay the dead gesture's delta.
        ctl.pointer_moved(Vec2::new(205.0, 155.0));
        ctl.tick(Some(&engine));
        assert!(engine.take_calls().is_empty());
    }

    #[test]
    fn test_orbit_drag_emits_scaled_delta_in_one_scene_update() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        ctl.pointer_moved(Vec2::new(10.0, 10.0));
        ctl.press_primary();
        ctl.pointer_moved(Vec2::new(14.0, 12.0));
        ctl.tick(Some(&engine));

        let expected = (Vec2::new(14.0, 12.0) - Vec2::new(10.0, 10.0)) * 0.5;
        assert_eq!(
            engine.take_calls(),
            vec![Call::BeginUpdate, Call::Orbit(expected), Call::EndUpdate]
        );
    }

    #[test]
    fn test_pan_drag_uses_pan_speed_and_moves_the_target() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        ctl.pointer_moved(Vec2::new(100.0, 50.0));
        ctl.press_secondary();
        ctl.pointer_moved(Vec2::new(120.0, 40.0));
        ctl.tick(Some(&engine));

        let expected = (Vec2::new(120.0, 40.0) - Vec2::new(100.0, 50.0)) * 0.01;
        assert_eq!(
            engine.take_calls(),
            vec![Call::BeginUpdate, Call::Pan(expected, true), Call::EndUpdate]
        );
    }

    #[test]
    fn test_anchor_advances_so_each_tick_sends_only_new_motion() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        ctl.pointer_moved(Vec2::new(10.0, 10.0));
        ctl.press_primary();
        ctl.pointer_moved(Vec2::new(14.0, 12.0));
        ctl.tick(Some(&engine));
        engine.take_calls();

        ctl.pointer_moved(Vec2::new(20.0, 20.0));
        ctl.tick(Some(&engine));

        let expected = (Vec2::new(20.0, 20.0) - Vec2::new(14.0, 12.0)) * 0.5;
        assert_eq!(
            engine.take_calls(),
            vec![Call::BeginUpdate, Call::Orbit(expected), Call::EndUpdate]
        );
    }

    #[test]
    fn test_still_pointer_emits_nothing() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        ctl.pointer_moved(Vec2::new(10.0, 10.0));
        ctl.press_primary();
        ctl.tick(Some(&engine));

        assert!(engine.take_calls().is_empty());
    }

    #[test]
    fn test_wheel_accumulates_and_dollies_once_per_tick() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        ctl.wheel_scrolled(1.0);
        ctl.wheel_scrolled(0.5);
        ctl.tick(Some(&engine));
        assert_eq!(
            engine.take_calls(),
            vec![
                Call::BeginUpdate,
                Call::Dolly(1.5 * DOLLY_PER_LINE, true),
                Call::EndUpdate
            ]
        );

        // Consumed; the next tick has nothing to send.
        ctl.tick(Some(&engine));
        assert!(engine.take_calls().is_empty());
    }

    #[test]
    fn test_wheel_dollies_even_during_a_drag() {
        let engine = RecordingEngine::new(true);
        let mut ctl = controller();

        ctl.press_primary();
        ctl.wheel_scrolled(-2.0);
        ctl.tick(Some(&engine));

        assert_eq!(
            engine.take_calls(),
            vec![
                Call::BeginUpdate,
                Call::Dolly(-2.0 * DOLLY_PER_LINE, true),
                Call::EndUpdate
            ]
        );
    }

    #[test]
    fn test_idle_engine_gets_no_commands_and_no_update_scope() {
        let engine = RecordingEngine::new(false);
        let mut ctl = controller();

        ctl.pointer_moved(Vec2::new(10.0, 10.0));
        ctl.press_primary();
        ctl.pointer_moved(Vec2::new(30.0, 30.0));
        ctl.wheel_scrolled(1.0);
        ctl.tick(Some(&engine));

        assert!(engine.take_calls().is_empty());
        // The gesture still tracked the motion.
        assert_eq!(
            ctl.mode(),
            DragMode::Orbiting {
                anchor: Vec2::new(30.0, 30.0)
            }
        );
    }

    #[test]
    fn test_detached_controller_still_tracks_gestures() {
        let mut ctl = controller();

        ctl.pointer_moved(Vec2::new(1.0, 2.0));
        ctl.press_secondary();
        ctl.pointer_moved(Vec2::new(8.0, 9.0));
        ctl.wheel_scrolled(3.0);
        ctl.tick(None);

        assert_eq!(
            ctl.mode(),
            DragMode::Panning {
                anchor: Vec2::new(8.0, 9.0)
            }
        );
    }
}
