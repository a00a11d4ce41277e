/// One stage of the animation state machine.
///
/// Phases run in the order of [`Phase::ALL`] and never overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Particles are pushed away from the canvas center.
    Explosion,
    /// Particles drift on a wave pattern keyed to their home position.
    Floating,
    /// Particles ease back toward their home position.
    Return,
    /// The source raster is shown unchanged.
    Finalize,
}

impl Phase {
    /// All phases in playback order.
    pub const ALL: [Phase; 4] = [
        Phase::Explosion,
        Phase::Floating,
        Phase::Return,
        Phase::Finalize,
    ];

    /// Stable lowercase name for logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Explosion => "explosion",
            Phase::Floating => "floating",
            Phase::Return => "return",
            Phase::Finalize => "finalize",
        }
    }

    /// Number of frames this phase contributes under `frames`.
    pub fn frame_count(self, frames: &PhaseFrames) -> u32 {
        match self {
            Phase::Explosion => frames.explosion,
            Phase::Floating => frames.floating,
            Phase::Return => frames.return_home,
            Phase::Finalize => frames.finalize,
        }
    }

    /// Whether frames of this phase are drawn from particles (as opposed to the source raster).
    pub fn draws_particles(self) -> bool {
        !matches!(self, Phase::Finalize)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame budget per phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseFrames {
    /// Explosion frames.
    pub explosion: u32,
    /// Floating frames.
    pub floating: u32,
    /// Return frames.
    #[serde(rename = "return")]
    pub return_home: u32,
    /// Finalize frames.
    pub finalize: u32,
}

impl Default for PhaseFrames {
    fn default() -> Self {
        Self {
            explosion: 30,
            floating: 40,
            return_home: 40,
            finalize: 10,
        }
    }
}

impl PhaseFrames {
    /// Total frame count across all phases.
    pub fn total(&self) -> u64 {
        Phase::ALL
            .iter()
            .map(|p| u64::from(p.frame_count(self)))
            .sum()
    }

    /// Phase that produces absolute frame `index`, with the frame's offset inside that phase.
    pub fn locate(&self, index: u64) -> Option<(Phase, u32)> {
        let mut start = 0u64;
        for phase in Phase::ALL {
            let n = u64::from(phase.frame_count(self));
            if index < start + n {
                return Some((phase, (index - start) as u32));
            }
            start += n;
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/simulate/phase.rs"]
mod tests;
