//! # Runtime Configuration Module
//!
//! Configuration for a dispatch service, loaded from a YAML file and/or
//! environment variables. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ## Example Configuration
//!
//! ```yaml
//! router:
//!   constraint_policy: strict   # or permissive (default)
//! middleware:
//!   access_log: true
//!   tracing: true
//!   metrics: false
//! logging:
//!   level: debug
//!   format: pretty
//! ```
//!
//! ## Environment Variables
//!
//! Applied on top of the file by [`RuntimeConfig::apply_overrides`]:
//!
//! - `BRRTD_CONSTRAINT_POLICY` - `permissive` or `strict`
//! - `BRRTD_ACCESS_LOG`, `BRRTD_TRACING`, `BRRTD_METRICS` - `true`/`false`
//! - `BRRTD_LOG_*` - see [`crate::logging`]

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::logging::LogConfig;
use crate::router::ConstraintPolicy;

/// Router settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// What a `:name(regex)` segment does with a value failing its regex
    pub constraint_policy: ConstraintPolicy,
}

/// Which of the bundled middlewares to install, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    pub tracing: bool,
    pub access_log: bool,
    pub metrics: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            tracing: true,
            access_log: true,
            metrics: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub router: RouterConfig,
    pub middleware: MiddlewareConfig,
    pub logging: LogConfig,
}

impl RuntimeConfig {
    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML or unknown enum values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse runtime configuration")
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Override fields from a variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(policy) = lookup("BRRTD_CONSTRAINT_POLICY") {
            self.router.constraint_policy = ConstraintPolicy::parse(&policy);
        }
        let flag = |key: &str| lookup(key).and_then(|v| v.parse::<bool>().ok());
        if let Some(on) = flag("BRRTD_TRACING") {
            self.middleware.tracing = on;
        }
        if let Some(on) = flag("BRRTD_ACCESS_LOG") {
            self.middleware.access_log = on;
        }
        if let Some(on) = flag("BRRTD_METRICS") {
            self.middleware.metrics = on;
        }
        self.logging.apply_overrides(&lookup);
    }
}
