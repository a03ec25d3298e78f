// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! talaiot-publish - push a build execution report to InfluxDB
//!
//! # Usage
//!
//! ```bash
//! # Publish on a worker pool (returns once all writes finished)
//! talaiot-publish --config talaiot.yml --report build/reports/talaiot.json
//!
//! # Write inline on the main thread
//! talaiot-publish --config talaiot.yml --report report.json --sync
//!
//! # Print the line protocol instead of sending it
//! talaiot-publish --config talaiot.yml --report report.json --dry-run
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use talaiot_influx::gate::{should_publish_build, should_publish_tasks};
use talaiot_influx::point::to_line_protocol_body;
use talaiot_influx::{
    map_build_point, map_task_points, ExecutionReport, HttpPublisher, HttpStoreClient,
    InfluxDbPublisher, InlineExecutor, PublisherConfig,
};

/// Publish a build execution report to InfluxDB
#[derive(Parser, Debug)]
#[command(name = "talaiot-publish")]
#[command(about = "Publish a build execution report to InfluxDB")]
#[command(version)]
struct Args {
    /// Publisher configuration (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Execution report (JSON)
    #[arg(short, long)]
    report: PathBuf,

    /// Worker threads used for writes
    #[arg(short, long, default_value_t = 2)]
    workers: usize,

    /// Write on the main thread instead of the worker pool
    #[arg(long)]
    sync: bool,

    /// Print the line protocol for each enabled series and exit
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = PublisherConfig::from_file(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let report = ExecutionReport::from_file(&args.report)
        .with_context(|| format!("loading report {}", args.report.display()))?;

    if args.dry_run {
        print_dry_run(&config, &report);
        return Ok(());
    }

    log::info!(
        "Publishing {} task(s) to {} (db={})",
        report.tasks.len(),
        config.url,
        config.db_name
    );

    if args.sync {
        let client = HttpStoreClient::from_config(&config).context("creating store client")?;
        InfluxDbPublisher::new(config, client, InlineExecutor).publish(report)?;
    } else {
        let publisher = HttpPublisher::from_config(config, args.workers)?;
        publisher.publish(report)?;
        // Writes run on the pool; wait for them before the process exits.
        publisher.executor().shutdown();
    }

    log::info!("Done");
    Ok(())
}

fn print_dry_run(config: &PublisherConfig, report: &ExecutionReport) {
    let props = &report.custom_properties;

    if should_publish_tasks(config) {
        let batch = map_task_points(&report.tasks, &props.task_properties, &config.task_metric_name);
        for e in &batch.errors {
            log::warn!("{}", e);
        }
        println!("# {} ({} point(s))", config.task_metric_name, batch.points.len());
        println!("{}", to_line_protocol_body(&batch.points));
    }

    if should_publish_build(config) {
        match map_build_point(report, &props.build_properties, &config.build_metric_name) {
            Ok(point) => {
                println!("# {} (1 point)", config.build_metric_name);
                println!("{}", to_line_protocol_body(&[point]));
            }
            Err(e) => log::warn!("{}", e),
        }
    }
}
