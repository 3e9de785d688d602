pub mod geometry;
pub mod raster;
pub mod responses;
