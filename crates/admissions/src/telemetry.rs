use crate::config::{AppConfig, AppEnvironment};
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `APP_LOG_LEVEL`;
/// with neither set, the level falls back to a per-environment default so
/// test runs stay quiet without any env plumbing.
pub fn init(config: &AppConfig) -> Result<(), TelemetryError> {
    let directive = config
        .telemetry
        .log_level
        .clone()
        .unwrap_or_else(|| default_level(config.environment).to_string());
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
            value: directive.clone(),
            source,
        })
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

const fn default_level(environment: AppEnvironment) -> &'static str {
    match environment {
        AppEnvironment::Test => "warn",
        AppEnvironment::Development | AppEnvironment::Production => "info",
    }
}
