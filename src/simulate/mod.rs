//! The four-phase particle simulation.

pub(crate) mod motion;
pub(crate) mod phase;
pub(crate) mod simulator;
