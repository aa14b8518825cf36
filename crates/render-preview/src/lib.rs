//! Live preview window for a progressive render engine.
//!
//! Frames arrive on an engine thread, cross to the UI thread through
//! `engine_api`'s frame channel, and are shown scaled and centered in a
//! resizable window; pointer input travels the other way as batched
//! camera commands. The UI thread is the only owner of GPU resources.

pub mod app;
pub mod camera;
pub mod config;
pub mod gfx;
pub mod surface;
pub mod ui;
