// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB publisher entry point.
//!
//! Connects configuration, the publish gate, point mapping and dispatch into
//! a single `publish` call.

use crate::client::{HttpStoreClient, StoreClient};
use crate::config::{ConfigError, PublisherConfig, RETENTION_POLICY};
use crate::dispatch::{Dispatcher, WriteTarget};
use crate::executor::{Executor, ThreadPoolExecutor};
use crate::gate;
use crate::mapping::{map_build_point, map_task_points};
use crate::report::ExecutionReport;
use std::sync::Arc;

/// Production publisher: HTTP writes on a worker pool.
pub type HttpPublisher = InfluxDbPublisher<HttpStoreClient, ThreadPoolExecutor>;

/// Publishes execution reports as `task` and `build` measurements.
///
/// Holds no per-report state; one instance may serve concurrent `publish`
/// calls as long as the executor is shared safely (all executors are).
pub struct InfluxDbPublisher<C, E> {
    config: PublisherConfig,
    dispatcher: Dispatcher<C, E>,
}

impl HttpPublisher {
    /// Build an HTTP client and a pool of `workers` threads from `config`.
    pub fn from_config(config: PublisherConfig, workers: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = HttpStoreClient::from_config(&config)
            .map_err(|e| ConfigError::ClientSetup(e.to_string()))?;
        let executor = ThreadPoolExecutor::new(workers)?;
        Ok(Self::new(config, client, executor))
    }
}

impl<C, E> InfluxDbPublisher<C, E>
where
    C: StoreClient + 'static,
    E: Executor,
{
    pub fn new(config: PublisherConfig, client: C, executor: E) -> Self {
        Self::with_shared_client(config, Arc::new(client), executor)
    }

    /// Like [`InfluxDbPublisher::new`] but keeps a handle on the client.
    pub fn with_shared_client(config: PublisherConfig, client: Arc<C>, executor: E) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(client, executor),
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        self.dispatcher.executor()
    }

    /// Publish one build's report.
    ///
    /// Returns once the writes are handed to the executor. Mapping and write
    /// failures are logged and never returned; only an unusable configuration
    /// is an error.
    pub fn publish(&self, report: ExecutionReport) -> Result<(), ConfigError> {
        if let Err(e) = self.config.validate() {
            log::error!("[publisher] refusing to publish, invalid configuration: {}", e);
            return Err(e);
        }

        let target = || WriteTarget::new(self.config.db_name.as_str(), RETENTION_POLICY);
        let properties = &report.custom_properties;

        if gate::should_publish_tasks(&self.config) {
            let measurement = &self.config.task_metric_name;
            let batch = map_task_points(&report.tasks, &properties.task_properties, measurement);
            for e in &batch.errors {
                log::warn!("[publisher] dropped task point: {}", e);
            }
            self.dispatcher.dispatch(batch.points, target());
        } else {
            log::debug!("[publisher] task metrics disabled");
        }

        if gate::should_publish_build(&self.config) {
            let measurement = &self.config.build_metric_name;
            match map_build_point(&report, &properties.build_properties, measurement) {
                Ok(point) => self.dispatcher.dispatch(vec![point], target()),
                Err(e) => log::warn!("[publisher] dropped build point: {}", e),
            }
        } else {
            log::debug!("[publisher] build metrics disabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WriteError;
    use crate::executor::InlineExecutor;
    use crate::point::Point;
    use crate::report::{TaskRecord, TaskState};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        writes: Mutex<Vec<Vec<Point>>>,
    }

    impl StoreClient for MemoryStore {
        fn write(&self, points: &[Point], _: &str, _: &str) -> Result<(), WriteError> {
            self.writes.lock().unwrap().push(points.to_vec());
            Ok(())
        }
    }

    fn config() -> PublisherConfig {
        PublisherConfig::builder()
            .db_name("talaiot")
            .url("http://localhost:8086")
            .build()
    }

    fn report_with_tasks(n: usize) -> ExecutionReport {
        ExecutionReport {
            duration_ms: "10".to_string(),
            success: true,
            tasks: (0..n)
                .map(|i| TaskRecord {
                    magnitude: i as f64,
                    name: format!("t{}", i),
                    path: format!(":t{}", i),
                    state: TaskState::Executed,
                    is_root: i == 0,
                    module: "app".to_string(),
                    dependencies: Vec::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_publish_invalid_config_fails_fast() {
        let store = Arc::new(MemoryStore::default());
        let publisher = InfluxDbPublisher::with_shared_client(
            PublisherConfig::default(),
            Arc::clone(&store),
            InlineExecutor,
        );

        let result = publisher.publish(report_with_tasks(2));

        assert!(matches!(result, Err(ConfigError::MissingField("db_name"))));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publish_writes_each_series_once() {
        let store = Arc::new(MemoryStore::default());
        let publisher =
            InfluxDbPublisher::with_shared_client(config(), Arc::clone(&store), InlineExecutor);

        publisher.publish(report_with_tasks(3)).expect("publish");

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].len(), 3);
        assert!(writes[0].iter().all(|p| p.measurement() == "task"));
        assert_eq!(writes[1].len(), 1);
        assert_eq!(writes[1][0].measurement(), "build");
    }

    #[test]
    fn test_publish_no_tasks_writes_only_build() {
        let store = Arc::new(MemoryStore::default());
        let publisher =
            InfluxDbPublisher::with_shared_client(config(), Arc::clone(&store), InlineExecutor);

        publisher.publish(report_with_tasks(0)).expect("publish");

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0].measurement(), "build");
    }

    #[test]
    fn test_publish_bad_build_duration_keeps_task_write() {
        let store = Arc::new(MemoryStore::default());
        let publisher =
            InfluxDbPublisher::with_shared_client(config(), Arc::clone(&store), InlineExecutor);

        let mut report = report_with_tasks(1);
        report.duration_ms = "not-a-number".to_string();
        publisher.publish(report).expect("mapping errors are not returned");

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0].measurement(), "task");
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let result = HttpPublisher::from_config(PublisherConfig::default(), 1);
        assert!(matches!(result, Err(ConfigError::MissingField("db_name"))));
    }
}
