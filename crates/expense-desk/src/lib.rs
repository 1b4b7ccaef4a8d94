pub mod config;
pub mod error;
pub mod expenses;
pub mod telemetry;
