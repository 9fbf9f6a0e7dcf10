mod parsing;
mod settings;
mod types;

pub use types::{
    BackendSettings, ConfigError, Environment, RuntimeSettings, SessionSettings, Settings,
    SubmitSettings, TelemetrySettings,
};
