use clap::Parser;
use std::time::Duration;

/// `render_preview` - Live preview window for a progressive render engine.
///
/// Opens a window that displays frames streamed from the attached render
/// engine and forwards mouse interaction back as camera commands. With no
/// real engine available it drives the built-in engine emulator, which
/// synthesizes frames at a fixed interval.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Initial window width in logical pixels.
    #[arg(long, env = "PREVIEW_WINDOW_WIDTH", default_value_t = 400)]
    pub window_width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, env = "PREVIEW_WINDOW_HEIGHT", default_value_t = 400)]
    pub window_height: u32,

    /// Width of the frames the emulated engine produces.
    #[arg(long, env = "PREVIEW_FRAME_WIDTH", default_value_t = 512)]
    pub frame_width: u32,

    /// Height of the frames the emulated engine produces.
    #[arg(long, env = "PREVIEW_FRAME_HEIGHT", default_value_t = 512)]
    pub frame_height: u32,

    /// Milliseconds between emulated frame emissions.
    ///
    /// Real engines deliver at unpredictable intervals; the emulator
    /// paces itself with this fixed period instead.
    #[arg(long, env = "PREVIEW_FRAME_INTERVAL_MS", default_value_t = 100)]
    pub frame_interval_ms: u64,

    /// Orbit command units per pixel of primary-button drag.
    #[arg(long, env = "PREVIEW_ORBIT_SPEED", default_value_t = 0.5)]
    pub orbit_speed: f32,

    /// Pan command units per pixel of secondary-button drag.
    #[arg(long, env = "PREVIEW_PAN_SPEED", default_value_t = 0.01)]
    pub pan_speed: f32,
}

impl Config {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
