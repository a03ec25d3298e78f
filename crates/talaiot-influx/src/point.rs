// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Points and their InfluxDB Line Protocol form.
//!
//! Line Protocol format (no tags, no timestamp):
//! ```text
//! measurement field1=val1,field2=val2
//! ```
//!
//! The timestamp is left out so the store assigns it at write time.
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use std::fmt;

/// Field value types the mapper produces.
///
/// Durations and task magnitudes are always floats, so there is no integer
/// variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    String(String),
    Boolean(bool),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// Floats carry no suffix, so `10.0` renders as `10` and is still
    /// stored as a float. Strings are double-quoted with `\` and `"` escaped.
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => v.to_string(),
            FieldValue::String(v) => {
                format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

/// One record destined for a measurement.
///
/// Field order is preserved exactly as pushed; it is part of the row shape
/// downstream consumers validate.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    fields: Vec<(String, FieldValue)>,
}

impl Point {
    /// Start a point for `measurement` with no fields.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push_field(key, value);
        self
    }

    /// Append a field.
    pub fn push_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Field keys in order.
    pub fn field_keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Look up the first field named `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Render this point as a single Line Protocol line.
    ///
    /// Returns `None` if the point has no fields or an empty field key;
    /// InfluxDB would reject the whole request for either.
    pub fn to_line_protocol(&self) -> Option<String> {
        if self.fields.is_empty() || self.fields.iter().any(|(k, _)| k.is_empty()) {
            return None;
        }

        let mut line = escape_measurement(&self.measurement);
        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_field_key(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }
        Some(line)
    }
}

/// Render a batch as a newline-separated Line Protocol body.
///
/// Points without fields are skipped.
pub fn to_line_protocol_body(points: &[Point]) -> String {
    points
        .iter()
        .filter_map(Point::to_line_protocol)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape measurement name per Line Protocol spec.
/// Spaces and commas must be escaped with backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape field key per Line Protocol spec.
/// Backslashes go first so a trailing `\` cannot escape the `=` after the key.
fn escape_field_key(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
