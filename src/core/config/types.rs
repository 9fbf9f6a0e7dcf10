use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) backend: BackendSettings,
    pub(super) session: SessionSettings,
    pub(super) submit: SubmitSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
    pub strict_config: bool,
}

/// Connection details for the platform REST API the engine loads
/// definitions from and submits executions to.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub max_active_sessions: u64,
}

#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub max_submit_retries: u32,
    pub retry_backoff_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
    pub prometheus_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}
