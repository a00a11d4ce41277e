//! Per-frame particle updates for each particle phase.
//!
//! Each function advances every particle by exactly one frame. Home positions are read, never
//! written.

use rand::Rng;

use crate::config::MotionParams;
use crate::foundation::core::Point;
use crate::particles::field::Particle;

/// One explosion frame: velocity is recomputed from the offset to `center`, ramped by
/// `frame / total`, and integrated with `explosion_damping`.
pub fn explosion_step(
    particles: &mut [Particle],
    center: Point,
    frame: u32,
    total: u32,
    motion: &MotionParams,
    rng: &mut impl Rng,
) {
    let progress = if total == 0 {
        0.0
    } else {
        f64::from(frame) / f64::from(total)
    };
    let force = motion.explosion_force * progress;
    for p in particles {
        p.velocity = (p.pos - center) * (force / 100.0);
        p.vz = (rng.random::<f64>() - 0.5) * force;
        p.pos += p.velocity * motion.explosion_damping;
    }
}

/// One floating frame: a sinusoidal nudge keyed to the frame counter and home coordinates.
pub fn floating_step(particles: &mut [Particle], frame: u32, motion: &MotionParams) {
    let t = f64::from(frame) * motion.float_time_scale;
    for p in particles {
        let home = p.home();
        p.pos.x += (t + home.x * motion.float_spatial_scale).sin() * motion.float_amplitude;
        p.pos.y += (t + home.y * motion.float_spatial_scale).cos() * motion.float_amplitude;
    }
}

/// One return frame: move `return_rate` of the remaining distance toward home.
pub fn return_step(particles: &mut [Particle], motion: &MotionParams) {
    for p in particles {
        p.pos += p.offset_from_home() * motion.return_rate;
    }
}

/// Accumulate rotation after a frame has been drawn.
pub fn advance_rotation(particles: &mut [Particle]) {
    for p in particles {
        p.rotation += p.rotation_speed;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/simulate/motion.rs"]
mod tests;
