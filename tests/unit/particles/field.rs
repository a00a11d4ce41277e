use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn checkerboard(w: u32, h: u32) -> SourceImage {
    SourceImage::from_rgba(image::RgbaImage::from_fn(w, h, |x, y| {
        if (x / 2 + y / 2) % 2 == 0 {
            image::Rgba([200, 100, 50, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    }))
}

#[test]
fn opaque_image_yields_one_particle_per_sample() {
    let src = SourceImage::from_rgba(image::RgbaImage::from_pixel(
        5,
        3,
        image::Rgba([9, 8, 7, 255]),
    ));
    let mut rng = StdRng::seed_from_u64(1);
    let field = ParticleField::sample(&src, 2, &GeneratorConfig::default(), &mut rng).unwrap();
    // x in {0, 2, 4}, y in {0, 2}
    assert_eq!(field.len() as u64, expected_sample_count(5, 3, 2));
    assert_eq!(field.len(), 6);
}

#[test]
fn transparent_samples_are_skipped() {
    let src = checkerboard(8, 8);
    let mut rng = StdRng::seed_from_u64(1);
    let field = ParticleField::sample(&src, 2, &GeneratorConfig::default(), &mut rng).unwrap();

    let expected = (0..8)
        .step_by(2)
        .flat_map(|y| (0..8).step_by(2).map(move |x| (x, y)))
        .filter(|&(x, y)| src.pixel(x, y).is_some_and(|c| c.a > 0))
        .count();
    assert_eq!(field.len(), expected);
    assert_eq!(field.len(), 8);
}

#[test]
fn particles_start_at_rest_at_home_with_verbatim_color() {
    let src = checkerboard(6, 6);
    let cfg = GeneratorConfig::default();
    let mut rng = StdRng::seed_from_u64(3);
    let field = ParticleField::sample(&src, 2, &cfg, &mut rng).unwrap();

    for p in field.particles() {
        assert_eq!(p.pos, p.home());
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.vz, 0.0);
        assert_eq!(p.rotation, 0.0);
        assert_eq!(p.opacity, 1.0);
        assert!(p.size >= 1.0 && p.size < 3.0);
        assert!(p.rotation_speed >= -0.1 && p.rotation_speed < 0.1);
        let (x, y) = (p.home().x as u32, p.home().y as u32);
        assert_eq!(Some(p.color), src.pixel(x, y));
    }
}

#[test]
fn same_seed_same_field() {
    let src = checkerboard(10, 10);
    let cfg = GeneratorConfig::default();
    let a = ParticleField::sample(&src, 2, &cfg, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = ParticleField::sample(&src, 2, &cfg, &mut StdRng::seed_from_u64(9)).unwrap();
    let c = ParticleField::sample(&src, 2, &cfg, &mut StdRng::seed_from_u64(10)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn empty_image_and_zero_step() {
    let empty = SourceImage::from_rgba(image::RgbaImage::new(0, 0));
    let mut rng = StdRng::seed_from_u64(0);
    let cfg = GeneratorConfig::default();
    let field = ParticleField::sample(&empty, 2, &cfg, &mut rng).unwrap();
    assert!(field.is_empty());

    assert!(ParticleField::sample(&checkerboard(2, 2), 0, &cfg, &mut rng).is_err());
    assert_eq!(expected_sample_count(5, 5, 0), 0);
}

#[test]
fn degenerate_ranges_use_lower_bound() {
    let src = checkerboard(2, 2);
    let cfg = GeneratorConfig {
        size_range: [2.0, 2.0],
        rotation_speed_range: [0.0, 0.0],
        ..GeneratorConfig::default()
    };
    let field = ParticleField::sample(&src, 1, &cfg, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(field.particles().iter().all(|p| p.size == 2.0));
    assert!(field.particles().iter().all(|p| p.rotation_speed == 0.0));
}
