pub mod classify;
pub mod symbology;

pub use classify::{RiskCategory, classify};
pub use symbology::{ColorSpec, colorize, legend};
