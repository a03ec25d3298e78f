// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// End-to-end publish scenarios against an in-memory store.
//
// Each test builds the same report the Gradle plugin would emit for a
// single `:clean` task and checks exactly which series reach the store and
// with which field layout.

use std::sync::{Arc, Mutex};
use talaiot_influx::{
    CustomProperties, ExecutionReport, FieldValue, InfluxDbPublisher, InlineExecutor, Point,
    PropertyMap, PublisherConfig, StoreClient, TaskRecord, TaskState, ThreadPoolExecutor,
    WriteError, RETENTION_POLICY,
};

#[derive(Debug, Clone)]
struct Write {
    database: String,
    retention_policy: String,
    points: Vec<Point>,
}

#[derive(Default)]
struct MemoryStore {
    writes: Mutex<Vec<Write>>,
}

impl MemoryStore {
    fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    fn measurement(&self, name: &str) -> Vec<Point> {
        self.writes()
            .into_iter()
            .flat_map(|w| w.points)
            .filter(|p| p.measurement() == name)
            .collect()
    }
}

impl StoreClient for MemoryStore {
    fn write(
        &self,
        points: &[Point],
        database: &str,
        retention_policy: &str,
    ) -> Result<(), WriteError> {
        self.writes.lock().unwrap().push(Write {
            database: database.to_string(),
            retention_policy: retention_policy.to_string(),
            points: points.to_vec(),
        });
        Ok(())
    }
}

fn config(db: &str) -> PublisherConfig {
    PublisherConfig::builder()
        .db_name(db)
        .url("http://localhost:8086")
        .task_metric_name("task")
        .build_metric_name("build")
        .build()
}

fn execution_report() -> ExecutionReport {
    ExecutionReport {
        duration_ms: "10".to_string(),
        success: true,
        custom_properties: CustomProperties {
            task_properties: [("metric1", "value1"), ("metric2", "value2")]
                .into_iter()
                .collect(),
            build_properties: [("metric3", "value3"), ("metric4", "value4")]
                .into_iter()
                .collect(),
        },
        tasks: vec![TaskRecord {
            magnitude: 1.0,
            name: "clean".to_string(),
            path: ":clean".to_string(),
            state: TaskState::Executed,
            is_root: false,
            module: "app".to_string(),
            dependencies: Vec::new(),
        }],
        ..Default::default()
    }
}

fn publish(config: PublisherConfig, report: ExecutionReport) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    let publisher = InfluxDbPublisher::with_shared_client(config, Arc::clone(&store), InlineExecutor);
    publisher.publish(report).expect("publish");
    store
}

fn s(v: &str) -> FieldValue {
    FieldValue::String(v.to_string())
}

#[test]
fn test_simple_configuration_writes_task_and_build() {
    let store = publish(config("talaiot"), execution_report());

    let writes = store.writes();
    assert_eq!(writes.len(), 2);
    for w in &writes {
        assert_eq!(w.database, "talaiot");
        assert_eq!(w.retention_policy, RETENTION_POLICY);
    }
    assert_eq!(store.measurement("task").len(), 1);
    assert_eq!(store.measurement("build").len(), 1);
}

#[test]
fn test_task_fields_with_custom_task_metrics() {
    let store = publish(config("databaseTaskBuild"), execution_report());

    let tasks = store.measurement("task");
    assert_eq!(
        tasks[0].fields(),
        &[
            ("value".to_string(), FieldValue::Float(1.0)),
            ("state".to_string(), s("EXECUTED")),
            ("module".to_string(), s("app")),
            ("rootNode".to_string(), FieldValue::Boolean(false)),
            ("task".to_string(), s(":clean")),
            ("metric1".to_string(), s("value1")),
            ("metric2".to_string(), s("value2")),
        ]
    );
}

#[test]
fn test_build_fields_with_custom_build_metrics() {
    let mut report = execution_report();
    report.configuration_duration_ms = Some("0".to_string());
    let store = publish(config("databaseBuild"), report);

    let builds = store.measurement("build");
    assert_eq!(
        builds[0].fields(),
        &[
            ("configuration".to_string(), FieldValue::Float(0.0)),
            ("duration".to_string(), FieldValue::Float(10.0)),
            ("metric3".to_string(), s("value3")),
            ("metric4".to_string(), s("value4")),
            ("success".to_string(), FieldValue::Boolean(true)),
        ]
    );
}

#[test]
fn test_only_build_metrics_when_task_metrics_disabled() {
    let config = PublisherConfig {
        publish_task_metrics: false,
        ..config("databaseWithoutTasks")
    };
    let store = publish(config, execution_report());

    assert!(store.measurement("task").is_empty());
    let builds = store.measurement("build");
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].get("duration"), Some(&FieldValue::Float(10.0)));
    assert_eq!(builds[0].get("configuration"), Some(&FieldValue::Float(0.0)));
    assert_eq!(builds[0].get("success"), Some(&FieldValue::Boolean(true)));
    assert_eq!(store.writes().len(), 1);
}

#[test]
fn test_only_task_metrics_when_build_metrics_disabled() {
    let config = PublisherConfig {
        publish_build_metrics: false,
        ..config("databaseWithoutBuild")
    };
    let store = publish(config, execution_report());

    assert_eq!(store.measurement("task").len(), 1);
    assert!(store.measurement("build").is_empty());
    assert_eq!(store.writes().len(), 1);
}

#[test]
fn test_both_series_disabled_writes_nothing() {
    let config = PublisherConfig {
        publish_task_metrics: false,
        publish_build_metrics: false,
        ..config("databaseEmpty")
    };
    let store = publish(config, execution_report());

    assert!(store.writes().is_empty());
}

#[test]
fn test_empty_custom_properties_only_builtin_fields() {
    let mut report = execution_report();
    report.custom_properties = CustomProperties {
        task_properties: PropertyMap::new(),
        build_properties: PropertyMap::new(),
    };
    let store = publish(config("databasePlain"), report);

    assert_eq!(
        store.measurement("task")[0].field_keys(),
        vec!["value", "state", "module", "rootNode", "task"]
    );
    assert_eq!(
        store.measurement("build")[0].field_keys(),
        vec!["configuration", "duration", "success"]
    );
}

#[test]
fn test_empty_build_property_key_drops_only_build_point() {
    let mut report = execution_report();
    report.custom_properties.build_properties = [("", "v"), ("k\\", "w")].into_iter().collect();
    let store = publish(config("talaiot"), report);

    assert_eq!(store.measurement("task").len(), 1);
    assert!(store.measurement("build").is_empty());
    assert_eq!(store.writes().len(), 1);
}

#[test]
fn test_custom_measurement_names() {
    let config = PublisherConfig::builder()
        .db_name("talaiot")
        .url("http://localhost:8086")
        .task_metric_name("gradle_task")
        .build_metric_name("gradle_build")
        .build();
    let store = publish(config, execution_report());

    assert_eq!(store.measurement("gradle_task").len(), 1);
    assert_eq!(store.measurement("gradle_build").len(), 1);
    assert!(store.measurement("task").is_empty());
}

#[test]
fn test_one_task_point_per_record() {
    let mut report = execution_report();
    for i in 0..9 {
        let mut task = report.tasks[0].clone();
        task.path = format!(":lib{}:compile", i);
        task.magnitude = i as f64;
        report.tasks.push(task);
    }
    let store = publish(config("talaiot"), report);

    assert_eq!(store.measurement("task").len(), 10);
    assert_eq!(store.writes().len(), 2);
}

#[test]
fn test_pool_executor_concurrent_publishes() {
    let store = Arc::new(MemoryStore::default());
    let pool = ThreadPoolExecutor::new(4).expect("pool");
    let publisher = Arc::new(InfluxDbPublisher::with_shared_client(
        config("talaiot"),
        Arc::clone(&store),
        pool,
    ));

    let callers: Vec<_> = (0..8)
        .map(|_| {
            let publisher = Arc::clone(&publisher);
            std::thread::spawn(move || publisher.publish(execution_report()).expect("publish"))
        })
        .collect();
    for c in callers {
        c.join().unwrap();
    }
    publisher.executor().shutdown();

    assert_eq!(store.writes().len(), 16);
    assert_eq!(store.measurement("task").len(), 8);
    assert_eq!(store.measurement("build").len(), 8);
}
