use crate::analytics::{AnalysisWindow, AnalyticsError};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the analytics runner.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub analysis: AnalysisSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("ALLCAMP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let dir = env::var("ALLCAMP_DATA_DIR").unwrap_or_else(|_| ".".to_string());

        let raw_year = env::var("ALLCAMP_ANALYSIS_YEAR").unwrap_or_else(|_| "2028".to_string());
        let year = raw_year
            .trim()
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidYear {
                value: raw_year.clone(),
            })?;

        let region = env::var("ALLCAMP_REGION").unwrap_or_else(|_| "Southeast".to_string());
        let analysis = AnalysisSettings::new(year, region)?;

        let log_level = env::var("ALLCAMP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            data: DataConfig {
                dir: PathBuf::from(dir),
            },
            analysis,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the CSV exports.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dir: PathBuf,
}

/// Reporting year and target sub-region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub year: i32,
    pub region: String,
}

impl AnalysisSettings {
    pub fn new(year: i32, region: impl Into<String>) -> Result<Self, ConfigError> {
        let region = region.into().trim().to_string();
        if region.is_empty() {
            return Err(ConfigError::EmptyRegion);
        }
        AnalysisWindow::for_year(year).map_err(|_| ConfigError::InvalidYear {
            value: year.to_string(),
        })?;

        Ok(Self { year, region })
    }

    pub fn annual_window(&self) -> Result<AnalysisWindow, AnalyticsError> {
        AnalysisWindow::for_year(self.year)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidYear { value: String },
    EmptyRegion,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidYear { value } => write!(
                f,
                "ALLCAMP_ANALYSIS_YEAR must be a representable calendar year, got '{}'",
                value
            ),
            ConfigError::EmptyRegion => write!(f, "ALLCAMP_REGION must not be blank"),
        }
    }
}

impl std::error::Error for ConfigError {}
