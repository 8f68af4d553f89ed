pub mod config;
pub mod error;
pub mod fixtures;
pub mod standings;
pub mod telemetry;
