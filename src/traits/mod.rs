pub mod sampler;

pub use sampler::RiskSource;
