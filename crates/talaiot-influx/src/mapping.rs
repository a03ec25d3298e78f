// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Execution report mapping to InfluxDB points.
//!
//! Every point is a fixed prefix of built-in fields followed by the caller's
//! custom properties in insertion order:
//!
//! ```text
//! task:  value, state, module, rootNode, task, <task properties...>
//! build: configuration, duration, <build properties...>, success
//! ```
//!
//! Custom property values are always written as string fields. Keys are
//! appended verbatim, even when they collide with a built-in name. An empty
//! key has no line protocol form and drops the point it belongs to.

use crate::point::Point;
use crate::report::{ExecutionReport, PropertyMap, TaskRecord};

/// A single record that could not be turned into a point.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    /// A textual duration did not parse to a finite number.
    #[error("{measurement}: field '{key}' has non-numeric value '{raw}'")]
    InvalidNumber {
        measurement: String,
        key: &'static str,
        raw: String,
    },
    /// A task magnitude is NaN or infinite.
    #[error("{measurement}: task '{path}' has non-finite value {value}")]
    NonFiniteValue {
        measurement: String,
        path: String,
        value: f64,
    },
    /// A custom property key cannot be written as a field key.
    #[error("{measurement}: invalid custom property key '{key}'")]
    InvalidFieldKey { measurement: String, key: String },
}

/// Points mapped from one series, plus the records that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedBatch {
    pub points: Vec<Point>,
    pub errors: Vec<MappingError>,
}

/// Map every task record to one point of `measurement`.
///
/// A record that fails to map is dropped and reported in
/// [`MappedBatch::errors`]; the remaining records are still mapped.
pub fn map_task_points(
    tasks: &[TaskRecord],
    task_properties: &PropertyMap,
    measurement: &str,
) -> MappedBatch {
    let mut batch = MappedBatch {
        points: Vec::with_capacity(tasks.len()),
        errors: Vec::new(),
    };

    for task in tasks {
        match map_task_point(task, task_properties, measurement) {
            Ok(point) => batch.points.push(point),
            Err(e) => batch.errors.push(e),
        }
    }

    batch
}

fn map_task_point(
    task: &TaskRecord,
    task_properties: &PropertyMap,
    measurement: &str,
) -> Result<Point, MappingError> {
    if !task.magnitude.is_finite() {
        return Err(MappingError::NonFiniteValue {
            measurement: measurement.to_string(),
            path: task.path.clone(),
            value: task.magnitude,
        });
    }

    let mut point = Point::new(measurement)
        .field("value", task.magnitude)
        .field("state", task.state.as_str())
        .field("module", task.module.as_str())
        .field("rootNode", task.is_root)
        .field("task", task.path.as_str());
    append_properties(&mut point, task_properties)?;
    Ok(point)
}

/// Map the build-level outcome to a single point of `measurement`.
///
/// A missing configuration duration is published as `0`.
pub fn map_build_point(
    report: &ExecutionReport,
    build_properties: &PropertyMap,
    measurement: &str,
) -> Result<Point, MappingError> {
    let configuration = match report.configuration_duration_ms.as_deref() {
        Some(raw) => parse_duration(raw, "configurationDurationMs", measurement)?,
        None => 0.0,
    };
    let duration = parse_duration(&report.duration_ms, "durationMs", measurement)?;

    let mut point = Point::new(measurement)
        .field("configuration", configuration)
        .field("duration", duration);
    append_properties(&mut point, build_properties)?;
    point.push_field("success", report.success);
    Ok(point)
}

fn append_properties(point: &mut Point, properties: &PropertyMap) -> Result<(), MappingError> {
    for (key, value) in properties.iter() {
        if key.is_empty() {
            return Err(MappingError::InvalidFieldKey {
                measurement: point.measurement().to_string(),
                key: key.to_string(),
            });
        }
        point.push_field(key, value);
    }
    Ok(())
}

fn parse_duration(raw: &str, key: &'static str, measurement: &str) -> Result<f64, MappingError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MappingError::InvalidNumber {
            measurement: measurement.to_string(),
            key,
            raw: raw.to_string(),
        })
}
