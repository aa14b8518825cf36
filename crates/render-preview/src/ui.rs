//! Diagnostic overlay drawn on top of the preview.
//!
//! Both layers are click-through: the overlay is a read-only readout, and
//! a layer that claimed the pointer would keep camera gestures (press,
//! drag, release, wheel) from reaching the scene underneath it.

/// Draws the stats window shown once frames are arriving.
pub fn draw_hud(
    ctx: &egui::Context,
    frame_size: (u32, u32),
    scale: f32,
    queued: usize,
    mode: &str,
) {
    egui::Window::new("Preview")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(format!("Frame: {} x {}", frame_size.0, frame_size.1));
            ui.label(format!("Scale: {:.2}x", scale));
            ui.label(format!("Mode: {}", mode));
            if queued > 0 {
                ui.label(format!("Backlog: {} frames", queued));
            }
            ui.separator();
            ui.label("Left drag: orbit");
            ui.label("Middle drag: pan");
            ui.label("Wheel: dolly");
        });
}

/// Centered placeholder shown until the first frame lands.
pub fn draw_waiting(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("waiting"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Waiting for render data...").size(18.0));
        });
}
