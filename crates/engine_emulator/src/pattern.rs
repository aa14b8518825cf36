//! Procedural frame synthesis for the emulated engine.
//!
//! Pure function of camera state and output size, so identical inputs
//! produce identical bytes. The image is a rotated checker plane under a
//! simple horizon gradient: orbiting spins it, panning slides it, and
//! dollying changes the checker density, which makes camera commands
//! visibly verifiable in the preview window.

use crate::OrbitState;

/// The emulator always produces packed RGB.
pub const CHANNELS: u8 = 3;

/// Renders one frame from the given camera state.
pub fn render(camera: &OrbitState, width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(width as usize * height as usize * CHANNELS as usize);
    let (sin_az, cos_az) = camera.azimuth.sin_cos();
    let zoom = 6.0 / camera.distance.max(0.1);

    for y in 0..height {
        for x in 0..width {
            let u = ((x as f32 + 0.5) / width as f32 - 0.5 - camera.offset.x) * zoom;
            let v = ((y as f32 + 0.5) / height as f32 - 0.5 + camera.offset.y) * zoom;

            // View-plane rotation by the azimuth angle.
            let ru = u * cos_az - v * sin_az;
            let rv = u * sin_az + v * cos_az;

            let checker = ((ru.floor() + rv.floor()) as i64).rem_euclid(2) as f32;
            let horizon = ((rv * 0.5 + camera.elevation).tanh() + 1.0) * 0.5;

            let r = checker * 0.75 + 0.1;
            let g = horizon * 0.7 + 0.15;
            let b = ((ru * 0.5).sin() * 0.5 + 0.5) * horizon;

            bytes.push(to_byte(r));
            bytes.push(to_byte(g));
            bytes.push(to_byte(b));
        }
    }

    bytes
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_length_matches_dimensions() {
        let camera = OrbitState::default();
        assert_eq!(render(&camera, 16, 9).len(), 16 * 9 * 3);
        assert_eq!(render(&camera, 1, 1).len(), 3);
    }

    #[test]
    fn test_render_is_deterministic() {
        let camera = OrbitState::default();
        assert_eq!(render(&camera, 32, 24), render(&camera, 32, 24));
    }

    #[test]
    fn test_orbit_changes_the_image() {
        let before = OrbitState::default();
        let after = OrbitState {
            azimuth: before.azimuth + 0.7,
            ..before
        };
        assert_ne!(render(&before, 32, 24), render(&after, 32, 24));
    }

    #[test]
    fn test_pan_changes_the_image() {
        let before = OrbitState::default();
        let after = OrbitState {
            offset: glam::Vec2::new(0.4, 0.0),
            ..before
        };
        assert_ne!(render(&before, 32, 24), render(&after, 32, 24));
    }
}
