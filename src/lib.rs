pub mod config;
pub mod endpoints;
pub mod geometry;
pub mod layers;
pub mod models;
pub mod reader;
pub mod risk;
pub mod traits;
pub mod utils;

pub use config::Config;
pub use endpoints::server::MapServer;
pub use risk::{ColorSpec, RiskCategory, classify, colorize};
