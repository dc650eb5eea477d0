//! Structured logging initialization
//!
//! The engine only emits `tracing` events and spans; binaries decide where
//! they go. [`init_logging`] installs a `tracing-subscriber` registry with an
//! `EnvFilter` and a JSON (production) or pretty (development) formatter.
//!
//! ## Environment Variables
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `BRRTD_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `BRRTD_LOG_FORMAT` | `json` | json/pretty |
//! | `BRRTD_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `BRRTD_LOG_INCLUDE_LOCATION` | `false` | include file:line in records |
//!
//! `RUST_LOG` takes precedence over `BRRTD_LOG_LEVEL` when set.

use std::env;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated), e.g. `brrtdispatch::router=debug`
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Override fields from a variable lookup (`BRRTD_LOG_*` keys)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("BRRTD_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = lookup("BRRTD_LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
        if let Some(filter) = lookup("BRRTD_LOG_TARGET_FILTER") {
            self.target_filter = Some(filter);
        }
        if let Some(location) = lookup("BRRTD_LOG_INCLUDE_LOCATION").and_then(|s| s.parse().ok()) {
            self.include_location = location;
        }
    }

    fn level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install the global `tracing` subscriber
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use brrtdispatch::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
            }
        }
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
