// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build execution report model.
//!
//! A report is produced once per build by the instrumentation side and
//! handed to the publisher as an immutable value. The JSON shape uses
//! camelCase keys (`durationMs`, `customProperties`, ...).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Outcome of one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    /// Total build duration in milliseconds, as text.
    pub duration_ms: String,
    pub success: bool,
    /// Configuration phase duration in milliseconds, as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_duration_ms: Option<String>,
    #[serde(default)]
    pub custom_properties: CustomProperties,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    /// Descriptive build environment. Carried through, never mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_invocation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_ms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<String>,
}

impl ExecutionReport {
    /// Parse a report from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a JSON report file.
    pub fn from_file(path: &Path) -> Result<Self, ReportLoadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// Errors while loading a report from disk.
#[derive(Debug, thiserror::Error)]
pub enum ReportLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller-defined key/value pairs attached to tasks and to the build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProperties {
    #[serde(default)]
    pub task_properties: PropertyMap,
    #[serde(default)]
    pub build_properties: PropertyMap,
}

/// A single task execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Primary numeric magnitude of the record, published as `value`.
    #[serde(alias = "ms")]
    pub magnitude: f64,
    #[serde(alias = "taskName")]
    pub name: String,
    /// Stable task identifier, e.g. `:app:assemble`.
    #[serde(alias = "taskPath")]
    pub path: String,
    pub state: TaskState,
    #[serde(alias = "rootNode")]
    pub is_root: bool,
    #[serde(default)]
    pub module: String,
    #[serde(default, alias = "taskDependencies")]
    pub dependencies: Vec<String>,
}

/// Execution state of a task.
///
/// Unknown names are kept verbatim in [`TaskState::Other`] rather than
/// rejected, so newer report producers still map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Executed,
    Failed,
    Skipped,
    UpToDate,
    FromCache,
    NoSource,
    Other(String),
}

impl TaskState {
    /// Symbolic name, as published in the `state` field.
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Executed => "EXECUTED",
            TaskState::Failed => "FAILED",
            TaskState::Skipped => "SKIPPED",
            TaskState::UpToDate => "UP_TO_DATE",
            TaskState::FromCache => "FROM_CACHE",
            TaskState::NoSource => "NO_SOURCE",
            TaskState::Other(name) => name,
        }
    }
}

impl From<String> for TaskState {
    fn from(name: String) -> Self {
        match name.as_str() {
            "EXECUTED" => TaskState::Executed,
            "FAILED" => TaskState::Failed,
            "SKIPPED" => TaskState::Skipped,
            "UP_TO_DATE" => TaskState::UpToDate,
            "FROM_CACHE" => TaskState::FromCache,
            "NO_SOURCE" => TaskState::NoSource,
            _ => TaskState::Other(name),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts about the machine and tooling that ran the build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    pub cpu_count: Option<String>,
    pub os_version: Option<String>,
    pub os_manufacturer: Option<String>,
    pub max_workers: Option<String>,
    pub java_runtime: Option<String>,
    pub locale: Option<String>,
    pub username: Option<String>,
    pub public_ip: Option<String>,
    /// Older plugin versions wrote this key as `defaultChartset`.
    #[serde(alias = "defaultChartset")]
    pub default_charset: Option<String>,
    pub ide_version: Option<String>,
    pub gradle_version: Option<String>,
    pub cache_mode: Option<String>,
    pub cache_push_enabled: Option<String>,
    pub cache_url: Option<String>,
    pub cache_hit: Option<String>,
    pub cache_miss: Option<String>,
    pub cache_store: Option<String>,
    pub git_branch: Option<String>,
    pub git_user: Option<String>,
    pub hostname: Option<String>,
    pub switches: Option<Switches>,
}

/// Command-line switches the build was started with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Switches {
    pub build_cache: Option<String>,
    pub configuration_on_demand: Option<String>,
    pub daemon: Option<String>,
    pub parallel: Option<String>,
    pub continue_on_failure: Option<String>,
    pub dry_run: Option<String>,
    pub offline: Option<String>,
    pub rerun_tasks: Option<String>,
    pub refresh_dependencies: Option<String>,
    pub build_scan: Option<String>,
}

/// String map that keeps insertion order.
///
/// Deserializing from a JSON object keeps the object's key order. Duplicate
/// keys are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: Vec<(String, String)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertyMapVisitor;

        impl<'de> Visitor<'de> for PropertyMapVisitor {
            type Value = PropertyMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of string keys to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    entries.push((k, v));
                }
                Ok(PropertyMap { entries })
            }
        }

        deserializer.deserialize_map(PropertyMapVisitor)
    }
}
