//! Turning a painting into particles.

pub(crate) mod field;
pub(crate) mod source;
