//! A stand-in render engine for offline runs and integration tests.
//!
//! `SimEngine` implements the full `engine_api` contract: camera commands
//! mutate an orbit state, and a background producer thread synthesizes a
//! frame from that state at a fixed interval, delivering it through the
//! subscribed event sink exactly the way a real engine would. The preview
//! application drives it when no real renderer is attached.

pub mod pattern;

use engine_api::{EngineEvent, EngineEventSink, FrameBuffer, RenderEngine};
use glam::Vec2;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Emulated orbital camera the producer renders from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    /// Rotation around the target's vertical axis, radians.
    pub azimuth: f32,
    /// Tilt above the horizontal plane, radians.
    pub elevation: f32,
    /// Distance from the target.
    pub distance: f32,
    /// View-plane offset accumulated from pan commands.
    pub offset: Vec2,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            azimuth: 0.8,
            elevation: 0.5,
            distance: 4.0,
            offset: Vec2::ZERO,
        }
    }
}

const MIN_DISTANCE: f32 = 0.25;
const MAX_ELEVATION: f32 = 1.55;

/// State shared between the command side and the producer thread.
struct EngineShared {
    rendering: AtomicBool,
    stop: AtomicBool,
    camera: Mutex<OrbitState>,
    open_updates: AtomicU32,
    committed_updates: AtomicUsize,
}

impl EngineShared {
    fn camera_lock(&self) -> MutexGuard<'_, OrbitState> {
        self.camera.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Render engine emulation with an interval-paced producer thread.
pub struct SimEngine {
    pass: String,
    width: u32,
    height: u32,
    interval: Duration,
    shared: Arc<EngineShared>,
    sink: Mutex<Option<Arc<dyn EngineEventSink>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SimEngine {
    pub fn new(width: u32, height: u32, interval: Duration) -> Self {
        Self {
            pass: "preview".to_owned(),
            width,
            height,
            interval,
            shared: Arc::new(EngineShared {
                rendering: AtomicBool::new(false),
                stop: AtomicBool::new(false),
                camera: Mutex::new(OrbitState::default()),
                open_updates: AtomicU32::new(0),
                committed_updates: AtomicUsize::new(0),
            }),
            sink: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    /// Registers the receiver for engine events. Must happen before
    /// `start`; frames have nowhere to go without it.
    pub fn subscribe(&self, sink: Arc<dyn EngineEventSink>) {
        *self.sink_lock() = Some(sink);
    }

    /// Spawns the producer thread. Returns false if no sink is
    /// subscribed, a pass is already running, or the spawn failed.
    pub fn start(&self) -> bool {
        let Some(sink) = self.sink_lock().clone() else {
            log::error!("start requested with no subscribed event sink");
            return false;
        };
        if self.shared.rendering.swap(true, Ordering::SeqCst) {
            log::warn!("start requested while a pass is already running");
            return false;
        }
        self.shared.stop.store(false, Ordering::SeqCst);

        let shared = self.shared.clone();
        let (width, height) = (self.width, self.height);
        let interval = self.interval;
        let pass = self.pass.clone();
        let spawned = thread::Builder::new()
            .name("engine-emulator".to_owned())
            .spawn(move || run_producer(shared, sink, width, height, interval, pass));

        match spawned {
            Ok(handle) => {
                *self.worker_lock() = Some(handle);
                true
            }
            Err(err) => {
                self.shared.rendering.store(false, Ordering::SeqCst);
                log::error!("failed to spawn producer thread: {err}");
                false
            }
        }
    }

    /// Signals the producer to finish and joins it. Safe to call when
    /// nothing is running.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker_lock().take() {
            if handle.join().is_err() {
                log::error!("producer thread panicked during shutdown");
            }
        }
    }

    /// Snapshot of the emulated camera, for diagnostics and tests.
    pub fn camera_state(&self) -> OrbitState {
        *self.shared.camera_lock()
    }

    /// Number of scene-update batches committed so far.
    pub fn committed_updates(&self) -> usize {
        self.shared.committed_updates.load(Ordering::SeqCst)
    }

    fn sink_lock(&self) -> MutexGuard<'_, Option<Arc<dyn EngineEventSink>>> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn worker_lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SimEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl RenderEngine for SimEngine {
    fn is_rendering(&self) -> bool {
        self.shared.rendering.load(Ordering::SeqCst)
    }

    fn begin_scene_update(&self) {
        self.shared.open_updates.fetch_add(1, Ordering::SeqCst);
    }

    fn end_scene_update(&self) {
        let open_before = self.shared.open_updates.fetch_sub(1, Ordering::SeqCst);
        if open_before == 1 {
            // Outermost bracket closed; the batch becomes visible to the
            // producer, which restarts its pass.
            self.shared.committed_updates.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn orbit_camera(&self, delta: Vec2) {
        let mut camera = self.shared.camera_lock();
        camera.azimuth += delta.x.to_radians();
        camera.elevation =
            (camera.elevation + delta.y.to_radians()).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    fn pan_camera(&self, delta: Vec2, _move_target: bool) {
        let mut camera = self.shared.camera_lock();
        camera.offset += delta;
    }

    fn dolly_camera(&self, amount: f32, _move_target: bool) {
        let mut camera = self.shared.camera_lock();
        camera.distance = (camera.distance - amount).max(MIN_DISTANCE);
    }
}

fn run_producer(
    shared: Arc<EngineShared>,
    sink: Arc<dyn EngineEventSink>,
    width: u32,
    height: u32,
    interval: Duration,
    pass: String,
) {
    sink.on_event(EngineEvent::Started { pass: pass.clone() });

    let mut frames_in_pass = 0u32;
    let mut seen_commits = shared.committed_updates.load(Ordering::SeqCst);

    while !shared.stop.load(Ordering::SeqCst) {
        let commits = shared.committed_updates.load(Ordering::SeqCst);
        if commits != seen_commits {
            seen_commits = commits;
            frames_in_pass = 0;
            sink.on_event(EngineEvent::Status {
                pass: pass.clone(),
                message: "scene updated, restarting pass".to_owned(),
            });
        }

        let camera = *shared.camera_lock();
        let bytes = pattern::render(&camera, width, height);
        match FrameBuffer::from_vec(bytes, width, height, pattern::CHANNELS) {
            Ok(frame) => sink.on_event(EngineEvent::ImageReady(frame)),
            Err(err) => {
                sink.on_event(EngineEvent::Error {
                    pass: pass.clone(),
                    message: err.to_string(),
                });
                break;
            }
        }

        frames_in_pass += 1;
        sink.on_event(EngineEvent::Progress {
            pass: pass.clone(),
            percent: (frames_in_pass * 4).min(100) as f32,
        });

        thread::sleep(interval);
    }

    shared.rendering.store(false, Ordering::SeqCst);
    sink.on_event(EngineEvent::Stopped { pass });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        tags: Mutex<Vec<&'static str>>,
        frames: Mutex<Vec<FrameBuffer>>,
    }

    impl EngineEventSink for RecordingSink {
        fn on_event(&self, event: EngineEvent) {
            let tag = match &event {
                EngineEvent::Started { .. } => "started",
                EngineEvent::Status { .. } => "status",
                EngineEvent::Progress { .. } => "progress",
                EngineEvent::ImageReady(_) => "image",
                EngineEvent::Error { .. } => "error",
                EngineEvent::Stopped { .. } => "stopped",
            };
            if let EngineEvent::ImageReady(frame) = event {
                self.frames.lock().unwrap().push(frame);
            }
            self.tags.lock().unwrap().push(tag);
        }
    }

    #[test]
    fn test_lifecycle_emits_started_frames_stopped() {
        let engine = SimEngine::new(8, 6, Duration::from_millis(5));
        let sink = Arc::new(RecordingSink::default());
        engine.subscribe(sink.clone());

        assert!(!engine.is_rendering());
        assert!(engine.start());
        assert!(engine.is_rendering());

        thread::sleep(Duration::from_millis(100));
        engine.stop();
        assert!(!engine.is_rendering());

        let tags = sink.tags.lock().unwrap();
        assert_eq!(tags.first(), Some(&"started"));
        assert_eq!(tags.last(), Some(&"stopped"));
        assert!(tags.contains(&"image"));

        let frames = sink.frames.lock().unwrap();
        assert!(!frames.is_empty());
        let frame = &frames[0];
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
        assert_eq!(frame.channels(), 3);
    }

    #[test]
    fn test_start_requires_a_subscribed_sink() {
        let engine = SimEngine::new(4, 4, Duration::from_millis(5));
        assert!(!engine.start());
        assert!(!engine.is_rendering());
    }

    #[test]
    fn test_start_while_running_is_refused() {
        let engine = SimEngine::new(4, 4, Duration::from_millis(5));
        let sink = Arc::new(RecordingSink::default());
        engine.subscribe(sink.clone());

        assert!(engine.start());
        assert!(!engine.start());
        engine.stop();

        let started = sink
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|tag| **tag == "started")
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_stop_without_start_is_a_noop() {
        let engine = SimEngine::new(4, 4, Duration::from_millis(5));
        engine.stop();
        assert!(!engine.is_rendering());
    }

    #[test]
    fn test_camera_commands_mutate_orbit_state() {
        let engine = SimEngine::new(4, 4, Duration::from_millis(5));
        let initial = engine.camera_state();

        engine.orbit_camera(Vec2::new(10.0, 5.0));
        engine.pan_camera(Vec2::new(0.2, -0.1), true);
        engine.dolly_camera(1.0, true);

        let moved = engine.camera_state();
        assert!(moved.azimuth > initial.azimuth);
        assert!(moved.elevation > initial.elevation);
        assert_eq!(moved.offset, Vec2::new(0.2, -0.1));
        assert!((moved.distance - (initial.distance - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_dolly_never_reaches_the_target() {
        let engine = SimEngine::new(4, 4, Duration::from_millis(5));
        engine.dolly_camera(100.0, true);
        assert!(engine.camera_state().distance >= MIN_DISTANCE);
    }

    #[test]
    fn test_scene_update_brackets_commit_once_per_batch() {
        let engine = SimEngine::new(4, 4, Duration::from_millis(5));
        assert_eq!(engine.committed_updates(), 0);

        engine.begin_scene_update();
        engine.begin_scene_update();
        engine.end_scene_update();
        assert_eq!(engine.committed_updates(), 0);
        engine.end_scene_update();
        assert_eq!(engine.committed_updates(), 1);

        engine.begin_scene_update();
        engine.end_scene_update();
        assert_eq!(engine.committed_updates(), 2);
    }
}
