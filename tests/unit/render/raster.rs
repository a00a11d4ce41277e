use super::*;
use crate::foundation::core::{Point, Rgba8};

fn opaque_particle(x: f64, y: f64, size: f64) -> Particle {
    Particle::at_home(Point::new(x, y), Rgba8::new(255, 0, 0, 255), size, 0.0)
}

fn alpha_at(frame: &FrameRGBA, x: u32, y: u32) -> u8 {
    frame.data[((y * frame.width + x) * 4 + 3) as usize]
}

#[test]
fn draws_square_centered_on_particle() {
    let canvas = Canvas {
        width: 16,
        height: 16,
    };
    let mut r = ParticleRasterizer::new(canvas).unwrap();
    let frame = r.draw(&[opaque_particle(8.0, 8.0, 4.0)]);

    assert_eq!(frame.canvas(), canvas);
    assert_eq!(frame.data.len(), canvas.rgba_len());
    assert!(frame.premultiplied);
    // Interior of the 4x4 square spanning [6, 10).
    assert_eq!(alpha_at(&frame, 7, 7), 255);
    assert_eq!(alpha_at(&frame, 8, 8), 255);
    assert_eq!(frame.data[((7 * 16 + 7) * 4) as usize], 255);
    // Far corner stays clear.
    assert_eq!(alpha_at(&frame, 0, 0), 0);
    assert_eq!(alpha_at(&frame, 15, 15), 0);
}

#[test]
fn each_frame_starts_from_a_clear_surface() {
    let canvas = Canvas {
        width: 16,
        height: 16,
    };
    let mut r = ParticleRasterizer::new(canvas).unwrap();
    let first = r.draw(&[opaque_particle(3.0, 3.0, 2.0)]);
    assert!(!first.is_transparent());
    let second = r.draw(&[]);
    assert!(second.is_transparent());
}

#[test]
fn invisible_particles_are_skipped() {
    let canvas = Canvas {
        width: 8,
        height: 8,
    };
    let mut r = ParticleRasterizer::new(canvas).unwrap();
    let mut p = opaque_particle(4.0, 4.0, 4.0);
    p.opacity = 0.0;
    assert!(r.draw(&[p]).is_transparent());
}

#[test]
fn empty_and_oversized_canvases() {
    let mut r = ParticleRasterizer::new(Canvas::default()).unwrap();
    let frame = r.draw(&[opaque_particle(0.0, 0.0, 2.0)]);
    assert!(frame.data.is_empty());

    assert!(
        ParticleRasterizer::new(Canvas {
            width: 70_000,
            height: 1
        })
        .is_err()
    );
}
