pub mod local;
pub mod metadata;
