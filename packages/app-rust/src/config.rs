//! Configuration for the dispatcher and the application wiring layer.

use serde::Deserialize;

/// Dispatcher-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Calls taking at least this long are logged at `warn`. 0 disables the check.
    pub slow_call_threshold_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            slow_call_threshold_ms: 1_000,
        }
    }
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, attached to lifecycle log lines.
    pub name: String,
    /// Settings for the shared dispatcher.
    pub dispatcher: DispatcherConfig,
    /// Maximum time a single component may take to shut down.
    pub shutdown_timeout_ms: u64,
    /// Log output format used by [`crate::telemetry::init_tracing`].
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "appwire".to_string(),
            dispatcher: DispatcherConfig::default(),
            shutdown_timeout_ms: 30_000,
            log_format: LogFormat::Text,
        }
    }
}
