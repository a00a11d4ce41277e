use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{GeneratorConfig, MotionParams};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::particles::field::ParticleField;
use crate::particles::source::SourceImage;
use crate::render::frame::FrameRGBA;
use crate::render::raster::ParticleRasterizer;
use crate::simulate::motion::{advance_rotation, explosion_step, floating_step, return_step};
use crate::simulate::phase::{Phase, PhaseFrames};

/// Frame counts produced by one simulation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Particles animated.
    pub particle_count: usize,
    /// Frames emitted per phase, in playback order.
    pub frames_per_phase: Vec<(Phase, u32)>,
}

impl SimulationStats {
    /// Total frames emitted.
    pub fn total_frames(&self) -> u64 {
        self.frames_per_phase
            .iter()
            .map(|(_, n)| u64::from(*n))
            .sum()
    }

    /// Frames emitted by `phase`, 0 if it did not run.
    pub fn frames_of(&self, phase: Phase) -> u32 {
        self.frames_per_phase
            .iter()
            .find(|(p, _)| *p == phase)
            .map_or(0, |(_, n)| *n)
    }
}

/// State carried from phase to phase during one animation.
///
/// The particle field is mutated in place; its length never changes.
pub struct SimulationContext {
    field: ParticleField,
    source: SourceImage,
    rasterizer: ParticleRasterizer,
    rng: StdRng,
    motion: MotionParams,
    phase_frames: PhaseFrames,
    fps: Fps,
    next_index: FrameIndex,
}

impl SimulationContext {
    /// Sample `source` into particles and prepare a rasterizer of the same size.
    pub fn new(source: SourceImage, cfg: &GeneratorConfig) -> ParticleResult<Self> {
        cfg.validate()?;
        let mut rng = rng_from_seed(cfg.seed);
        let field = ParticleField::sample(&source, cfg.sample_step, cfg, &mut rng)?;
        Self::from_parts(source, field, rng, cfg)
    }

    /// Assemble a context from an existing field.
    pub fn from_parts(
        source: SourceImage,
        field: ParticleField,
        rng: StdRng,
        cfg: &GeneratorConfig,
    ) -> ParticleResult<Self> {
        if field.canvas() != source.canvas() {
            return Err(ParticleError::validation(
                "particle field and source image sizes differ",
            ));
        }
        Ok(Self {
            rasterizer: ParticleRasterizer::new(source.canvas())?,
            field,
            source,
            rng,
            motion: cfg.motion,
            phase_frames: cfg.phase_frames,
            fps: cfg.fps,
            next_index: FrameIndex(0),
        })
    }

    /// The particles in their current state.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// The source raster.
    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.source.canvas()
    }

    /// Frame budget per phase.
    pub fn phase_frames(&self) -> PhaseFrames {
        self.phase_frames
    }

    /// Sink configuration matching this context.
    pub fn sink_config(&self) -> SinkConfig {
        let canvas = self.canvas();
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
        }
    }

    /// Run every phase in order, bracketing the frames with `sink.begin` / `sink.end`.
    #[tracing::instrument(skip_all, fields(particles = self.field.len()))]
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> ParticleResult<SimulationStats> {
        sink.begin(self.sink_config())?;
        let mut stats = SimulationStats {
            particle_count: self.field.len(),
            frames_per_phase: Vec::with_capacity(Phase::ALL.len()),
        };
        for phase in Phase::ALL {
            let n = self.run_phase(phase, sink)?;
            stats.frames_per_phase.push((phase, n));
        }
        sink.end()?;
        tracing::info!(
            frames = stats.total_frames(),
            particles = stats.particle_count,
            "simulation complete"
        );
        Ok(stats)
    }

    /// Run one phase, pushing its frames into `sink`. Returns the number of frames emitted.
    ///
    /// `sink.begin` must already have been called.
    pub fn run_phase(&mut self, phase: Phase, sink: &mut dyn FrameSink) -> ParticleResult<u32> {
        let total = phase.frame_count(&self.phase_frames);
        self.run_phase_frames(phase, total, sink)
    }

    /// Run the first `count` frames of `phase` (capped at its budget).
    fn run_phase_frames(
        &mut self,
        phase: Phase,
        count: u32,
        sink: &mut dyn FrameSink,
    ) -> ParticleResult<u32> {
        let total = phase.frame_count(&self.phase_frames);
        let count = count.min(total);
        let center = self.canvas().center();

        if !phase.draws_particles() {
            let frame = FrameRGBA::from_source(&self.source);
            for _ in 0..count {
                self.emit(sink, &frame)?;
            }
        } else {
            for f in 0..count {
                let particles = self.field.particles_mut();
                match phase {
                    Phase::Explosion => explosion_step(
                        particles,
                        center,
                        f,
                        total,
                        &self.motion,
                        &mut self.rng,
                    ),
                    Phase::Floating => floating_step(particles, f, &self.motion),
                    Phase::Return => return_step(particles, &self.motion),
                    Phase::Finalize => {}
                }
                let frame = self.rasterizer.draw(self.field.particles());
                advance_rotation(self.field.particles_mut());
                self.emit(sink, &frame)?;
            }
        }

        tracing::debug!(phase = phase.name(), frames = count, "phase complete");
        Ok(count)
    }

    fn emit(&mut self, sink: &mut dyn FrameSink, frame: &FrameRGBA) -> ParticleResult<()> {
        sink.push_frame(self.next_index, frame)?;
        self.next_index = self.next_index.next();
        Ok(())
    }
}

/// Render only frame `index` of the animation.
///
/// Phases are simulated up to and including the target frame; nothing after it is computed.
pub fn render_frame_at(
    source: SourceImage,
    cfg: &GeneratorConfig,
    index: FrameIndex,
) -> ParticleResult<FrameRGBA> {
    let (target_phase, offset) = cfg.phase_frames.locate(index.0).ok_or_else(|| {
        ParticleError::validation(format!(
            "frame {} is out of range (animation has {} frames)",
            index.0,
            cfg.phase_frames.total()
        ))
    })?;

    let mut ctx = SimulationContext::new(source, cfg)?;
    let mut pick = PickFrameSink {
        target: index,
        frame: None,
    };
    pick.begin(ctx.sink_config())?;
    for phase in Phase::ALL {
        if phase == target_phase {
            ctx.run_phase_frames(phase, offset + 1, &mut pick)?;
            break;
        }
        ctx.run_phase(phase, &mut pick)?;
    }
    pick.end()?;

    pick.frame
        .ok_or_else(|| ParticleError::validation(format!("frame {} was not produced", index.0)))
}

/// Deterministic generator for `Some(seed)`, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

struct PickFrameSink {
    target: FrameIndex,
    frame: Option<FrameRGBA>,
}

impl FrameSink for PickFrameSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ParticleResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ParticleResult<()> {
        if idx == self.target {
            self.frame = Some(frame.clone());
        }
        Ok(())
    }

    fn end(&mut self) -> ParticleResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/simulate/simulator.rs"]
mod tests;
