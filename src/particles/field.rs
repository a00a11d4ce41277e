use rand::Rng;

use crate::config::GeneratorConfig;
use crate::foundation::core::{Canvas, Point, Rgba8, Vec2};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::particles::source::SourceImage;

/// One sampled pixel, animated as an independent point.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Current position in canvas pixels.
    pub pos: Point,
    home: Point,
    /// Sampled color, copied verbatim from the source.
    pub color: Rgba8,
    /// Planar velocity in pixels per frame.
    pub velocity: Vec2,
    /// Depth velocity. Not used for projection.
    pub vz: f64,
    /// Side length of the drawn square.
    pub size: f64,
    /// Opacity multiplier applied on top of `color.a`.
    pub opacity: f32,
    /// Current rotation in radians.
    pub rotation: f64,
    /// Rotation added after every drawn frame, in radians.
    pub rotation_speed: f64,
}

impl Particle {
    /// A particle resting at `home` with zero velocity and rotation.
    pub fn at_home(home: Point, color: Rgba8, size: f64, rotation_speed: f64) -> Self {
        Self {
            pos: home,
            home,
            color,
            velocity: Vec2::ZERO,
            vz: 0.0,
            size,
            opacity: 1.0,
            rotation: 0.0,
            rotation_speed,
        }
    }

    /// Position the particle was sampled at. Fixed for the particle's lifetime.
    pub fn home(&self) -> Point {
        self.home
    }

    /// Vector from the current position back to home.
    pub fn offset_from_home(&self) -> Vec2 {
        self.home - self.pos
    }
}

/// The full, fixed-size set of particles for one animation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    canvas: Canvas,
}

impl ParticleField {
    /// Sample `source` every `step` pixels on both axes, one particle per non-transparent pixel.
    pub fn sample(
        source: &SourceImage,
        step: u32,
        cfg: &GeneratorConfig,
        rng: &mut impl Rng,
    ) -> ParticleResult<Self> {
        if step == 0 {
            return Err(ParticleError::validation("sample step must be > 0"));
        }

        let canvas = source.canvas();
        let mut particles = Vec::with_capacity(expected_sample_count(
            canvas.width,
            canvas.height,
            step,
        ) as usize);

        for y in (0..canvas.height).step_by(step as usize) {
            for x in (0..canvas.width).step_by(step as usize) {
                let Some(color) = source.pixel(x, y) else {
                    continue;
                };
                if color.a == 0 {
                    continue;
                }
                let size = sample_range(rng, cfg.size_range);
                let rotation_speed = sample_range(rng, cfg.rotation_speed_range);
                particles.push(Particle::at_home(
                    Point::new(f64::from(x), f64::from(y)),
                    color,
                    size,
                    rotation_speed,
                ));
            }
        }

        tracing::debug!(
            particles = particles.len(),
            width = canvas.width,
            height = canvas.height,
            step,
            "sampled particle field"
        );
        Ok(Self { particles, canvas })
    }

    /// Build a field from explicit particles.
    pub fn from_particles(particles: Vec<Particle>, canvas: Canvas) -> Self {
        Self { particles, canvas }
    }

    /// Canvas the particles were sampled from.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Return `true` when no pixel qualified.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Borrow the particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutably borrow the particles. The slice cannot grow or shrink.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

/// Number of sampled positions on a `width`×`height` grid with stride `step`.
pub fn expected_sample_count(width: u32, height: u32, step: u32) -> u64 {
    if step == 0 {
        return 0;
    }
    u64::from(width.div_ceil(step)) * u64::from(height.div_ceil(step))
}

fn sample_range(rng: &mut impl Rng, [lo, hi]: [f64; 2]) -> f64 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/field.rs"]
mod tests;
