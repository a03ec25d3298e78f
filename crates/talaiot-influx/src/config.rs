// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for the InfluxDB publisher.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Retention policy every write targets. Provisioned outside this crate.
pub const RETENTION_POLICY: &str = "rpTalaiot";

const DEFAULT_TASK_METRIC_NAME: &str = "task";
const DEFAULT_BUILD_METRIC_NAME: &str = "build";
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 10_000;

/// Publisher configuration.
///
/// `db_name` and `url` have no usable default; an empty value is rejected by
/// [`PublisherConfig::validate`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Target database.
    pub db_name: String,
    /// InfluxDB endpoint (e.g., "http://localhost:8086").
    pub url: String,
    /// Measurement name for per-task points.
    pub task_metric_name: String,
    /// Measurement name for the per-build point.
    pub build_metric_name: String,
    /// Emit the task measurement.
    pub publish_task_metrics: bool,
    /// Emit the build measurement.
    pub publish_build_metrics: bool,
    /// Basic auth user, if the store requires one.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Upper bound for a single write request, in milliseconds.
    pub write_timeout_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            db_name: String::new(),
            url: String::new(),
            task_metric_name: DEFAULT_TASK_METRIC_NAME.to_string(),
            build_metric_name: DEFAULT_BUILD_METRIC_NAME.to_string(),
            publish_task_metrics: true,
            publish_build_metrics: true,
            username: None,
            password: None,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required option is empty or absent.
    #[error("missing required option: {0}")]
    MissingField(&'static str),
    /// The store URL is not an http(s) URL.
    #[error("invalid store url '{0}': expected http:// or https://")]
    InvalidUrl(String),
    /// A measurement name is empty.
    #[error("measurement name for {0} metrics must not be empty")]
    EmptyMeasurement(&'static str),
    /// A zero write timeout would fail every write immediately.
    #[error("write_timeout_ms must be greater than zero")]
    ZeroWriteTimeout,
    /// The HTTP client could not be built from these options.
    #[error("store client setup failed: {0}")]
    ClientSetup(String),
    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublisherConfig {
    /// Create a new config builder
    pub fn builder() -> PublisherConfigBuilder {
        PublisherConfigBuilder::default()
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: PublisherConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check the options a publish cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::MissingField("db_name"));
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingField("url"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        if self.task_metric_name.is_empty() {
            return Err(ConfigError::EmptyMeasurement("task"));
        }
        if self.build_metric_name.is_empty() {
            return Err(ConfigError::EmptyMeasurement("build"));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::ZeroWriteTimeout);
        }
        Ok(())
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct PublisherConfigBuilder {
    db_name: Option<String>,
    url: Option<String>,
    task_metric_name: Option<String>,
    build_metric_name: Option<String>,
    publish_task_metrics: Option<bool>,
    publish_build_metrics: Option<bool>,
    username: Option<String>,
    password: Option<String>,
    write_timeout_ms: Option<u64>,
}

impl PublisherConfigBuilder {
    pub fn db_name(mut self, name: impl Into<String>) -> Self {
        self.db_name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn task_metric_name(mut self, name: impl Into<String>) -> Self {
        self.task_metric_name = Some(name.into());
        self
    }

    pub fn build_metric_name(mut self, name: impl Into<String>) -> Self {
        self.build_metric_name = Some(name.into());
        self
    }

    pub fn publish_task_metrics(mut self, enabled: bool) -> Self {
        self.publish_task_metrics = Some(enabled);
        self
    }

    pub fn publish_build_metrics(mut self, enabled: bool) -> Self {
        self.publish_build_metrics = Some(enabled);
        self
    }

    /// Set basic auth credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.write_timeout_ms = Some(ms);
        self
    }

    /// Build the configuration
    pub fn build(self) -> PublisherConfig {
        let defaults = PublisherConfig::default();

        PublisherConfig {
            db_name: self.db_name.unwrap_or(defaults.db_name),
            url: self.url.unwrap_or(defaults.url),
            task_metric_name: self.task_metric_name.unwrap_or(defaults.task_metric_name),
            build_metric_name: self.build_metric_name.unwrap_or(defaults.build_metric_name),
            publish_task_metrics: self
                .publish_task_metrics
                .unwrap_or(defaults.publish_task_metrics),
            publish_build_metrics: self
                .publish_build_metrics
                .unwrap_or(defaults.publish_build_metrics),
            username: self.username.or(defaults.username),
            password: self.password.or(defaults.password),
            write_timeout_ms: self.write_timeout_ms.unwrap_or(defaults.write_timeout_ms),
        }
    }
}
