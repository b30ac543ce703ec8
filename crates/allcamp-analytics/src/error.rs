use crate::analytics::AnalyticsError;
use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Ingest(IngestError),
    Analytics(AnalyticsError),
    Output(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Ingest(err) => write!(f, "ingest error: {}", err),
            AppError::Analytics(err) => write!(f, "analytics error: {}", err),
            AppError::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Ingest(err) => Some(err),
            AppError::Analytics(err) => Some(err),
            AppError::Output(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<IngestError> for AppError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

impl From<AnalyticsError> for AppError {
    fn from(value: AnalyticsError) -> Self {
        Self::Analytics(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}
