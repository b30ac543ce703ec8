pub mod analytics;
pub mod config;
pub mod error;
pub mod ingest;
pub mod telemetry;
