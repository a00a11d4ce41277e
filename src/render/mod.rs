//! CPU rasterization of particle frames.

pub(crate) mod frame;
pub(crate) mod raster;
