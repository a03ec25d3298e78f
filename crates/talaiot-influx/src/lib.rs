// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Talaiot InfluxDB publisher
//!
//! Turns a single build's execution report into InfluxDB points and writes
//! them to a database without blocking the build that produced the report.
//!
//! This crate provides:
//! - An immutable report model (tasks, durations, custom properties)
//! - Deterministic mapping of a report to a `task` and a `build` measurement
//! - Per-series publish toggles driven by YAML configuration
//! - Dispatch of writes through a pluggable execution strategy
//! - A blocking HTTP client for the InfluxDB 1.x write API
//!
//! # Overview
//!
//! ```text
//! ExecutionReport --> PublishGate --> PointMapper --> Dispatcher --> Executor --> StoreClient
//! ```
//!
//! # Example
//!
//! ```no_run
//! use talaiot_influx::{ExecutionReport, HttpPublisher, PublisherConfig};
//!
//! let config = PublisherConfig::builder()
//!     .db_name("talaiot")
//!     .url("http://localhost:8086")
//!     .build();
//! let publisher = HttpPublisher::from_config(config, 2).expect("publisher");
//!
//! let report = ExecutionReport::from_json(r#"{"durationMs": "10", "success": true}"#)
//!     .expect("report");
//! publisher.publish(report).expect("valid configuration");
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod executor;
pub mod gate;
pub mod mapping;
pub mod point;
pub mod publisher;
pub mod report;

pub use client::{HttpStoreClient, StoreClient, WriteError};
pub use config::{ConfigError, PublisherConfig, RETENTION_POLICY};
pub use dispatch::{Dispatcher, WriteTarget};
pub use executor::{Executor, InlineExecutor, Job, ThreadPoolExecutor};
pub use mapping::{map_build_point, map_task_points, MappedBatch, MappingError};
pub use point::{FieldValue, Point};
pub use publisher::{HttpPublisher, InfluxDbPublisher};
pub use report::{
    CustomProperties, Environment, ExecutionReport, PropertyMap, ReportLoadError, Switches,
    TaskRecord, TaskState,
};
