use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::foundation::core::{Rgba8, Vec2};

fn particle(x: f64, y: f64) -> Particle {
    Particle::at_home(Point::new(x, y), Rgba8::new(1, 2, 3, 255), 2.0, 0.05)
}

#[test]
fn first_explosion_frame_has_zero_force() {
    let mut ps = vec![particle(10.0, 0.0)];
    let mut rng = StdRng::seed_from_u64(0);
    explosion_step(
        &mut ps,
        Point::new(5.0, 5.0),
        0,
        30,
        &MotionParams::default(),
        &mut rng,
    );
    assert_eq!(ps[0].pos, Point::new(10.0, 0.0));
    assert_eq!(ps[0].velocity, Vec2::ZERO);
    assert_eq!(ps[0].vz, 0.0);
}

#[test]
fn explosion_pushes_away_from_center() {
    let mut ps = vec![particle(10.0, 5.0), particle(0.0, 5.0)];
    let mut rng = StdRng::seed_from_u64(0);
    let motion = MotionParams::default();
    explosion_step(&mut ps, Point::new(5.0, 5.0), 15, 30, &motion, &mut rng);
    // progress 0.5 => v = offset * 0.5, pos += v * 0.1
    assert_eq!(ps[0].velocity, Vec2::new(2.5, 0.0));
    assert!((ps[0].pos.x - 10.25).abs() < 1e-12);
    assert!((ps[1].pos.x + 0.25).abs() < 1e-12);
    assert_eq!(ps[0].pos.y, 5.0);
    assert!(ps[0].vz.abs() <= 25.0);
}

#[test]
fn floating_drift_matches_wave() {
    let mut ps = vec![particle(100.0, 50.0)];
    let motion = MotionParams::default();
    floating_step(&mut ps, 3, &motion);
    let ex = 100.0 + (0.3f64 + 1.0).sin() * 0.5;
    let ey = 50.0 + (0.3f64 + 0.5).cos() * 0.5;
    assert!((ps[0].pos.x - ex).abs() < 1e-12);
    assert!((ps[0].pos.y - ey).abs() < 1e-12);
}

#[test]
fn return_moves_a_tenth_of_the_way_home() {
    let mut ps = vec![particle(0.0, 0.0)];
    ps[0].pos = Point::new(100.0, -50.0);
    return_step(&mut ps, &MotionParams::default());
    assert!((ps[0].pos.x - 90.0).abs() < 1e-12);
    assert!((ps[0].pos.y + 45.0).abs() < 1e-12);
    assert_eq!(ps[0].home(), Point::new(0.0, 0.0));
}

#[test]
fn return_is_asymptotic_after_forty_frames() {
    let mut ps = vec![particle(0.0, 0.0)];
    ps[0].pos = Point::new(100.0, 0.0);
    for _ in 0..40 {
        return_step(&mut ps, &MotionParams::default());
    }
    let expected = 100.0 * 0.9f64.powi(40);
    assert!((ps[0].pos.x - expected).abs() < 1e-9);
    assert!(ps[0].pos.x > 0.0);
}

#[test]
fn rotation_accumulates_speed() {
    let mut ps = vec![particle(0.0, 0.0)];
    advance_rotation(&mut ps);
    advance_rotation(&mut ps);
    assert!((ps[0].rotation - 0.1).abs() < 1e-12);
}
