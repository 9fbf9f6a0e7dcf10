use super::parsing::{env_optional, env_or_default, parse_bool, parse_environment, parse_u32, parse_u64};
use super::types::{
    BackendSettings, ConfigError, RuntimeSettings, SessionSettings, Settings, SubmitSettings,
    TelemetrySettings,
};

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("PRAXIO_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("PRAXIO_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let base_url = env_or_default("PRAXIO_BACKEND_URL", "http://localhost:8000/api/v1");
        let api_key = env_or_default("PRAXIO_BACKEND_API_KEY", "");
        let timeout_seconds = parse_u64(
            "PRAXIO_BACKEND_TIMEOUT_SECONDS",
            env_or_default("PRAXIO_BACKEND_TIMEOUT_SECONDS", "30"),
        )?;

        let max_active_sessions =
            parse_u64("MAX_ACTIVE_SESSIONS", env_or_default("MAX_ACTIVE_SESSIONS", "150"))?;

        let max_submit_retries =
            parse_u32("MAX_SUBMIT_RETRIES", env_or_default("MAX_SUBMIT_RETRIES", "3"))?;
        let retry_backoff_seconds = parse_u64(
            "SUBMIT_RETRY_BACKOFF_SECONDS",
            env_or_default("SUBMIT_RETRY_BACKOFF_SECONDS", "2"),
        )?;

        let log_level = env_or_default("PRAXIO_LOG_LEVEL", "info");
        let json = env_optional("PRAXIO_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            backend: BackendSettings { base_url, api_key, timeout_seconds },
            session: SessionSettings { max_active_sessions },
            submit: SubmitSettings { max_submit_retries, retry_backoff_seconds },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn backend(&self) -> &BackendSettings {
        &self.backend
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    pub fn submit(&self) -> &SubmitSettings {
        &self.submit
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_active_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_ACTIVE_SESSIONS",
                value: "0".to_string(),
            });
        }

        if self.backend.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "PRAXIO_BACKEND_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.submit.retry_backoff_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SUBMIT_RETRY_BACKOFF_SECONDS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.backend.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("PRAXIO_BACKEND_API_KEY"));
        }

        Ok(())
    }
}
