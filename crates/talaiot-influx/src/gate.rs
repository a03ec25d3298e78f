// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-series publish toggles.
//!
//! The publisher checks these before mapping, so a disabled series is never
//! built and never written.

use crate::config::PublisherConfig;

/// Whether the task measurement is emitted.
pub fn should_publish_tasks(config: &PublisherConfig) -> bool {
    config.publish_task_metrics
}

/// Whether the build measurement is emitted.
pub fn should_publish_build(config: &PublisherConfig) -> bool {
    config.publish_build_metrics
}
