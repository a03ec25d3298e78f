// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hands point batches to the execution strategy.
//!
//! Each batch becomes exactly one job and each job makes exactly one
//! [`StoreClient::write`] call. Jobs are independent: a slow or failing task
//! write has no effect on the build write. Failures are logged once and never
//! retried.

use crate::client::StoreClient;
use crate::executor::Executor;
use crate::point::Point;
use std::sync::Arc;

/// Where a batch is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    pub database: String,
    pub retention_policy: String,
}

impl WriteTarget {
    pub fn new(database: impl Into<String>, retention_policy: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            retention_policy: retention_policy.into(),
        }
    }
}

/// Submits writes through an [`Executor`].
pub struct Dispatcher<C, E> {
    client: Arc<C>,
    executor: E,
}

impl<C, E> Dispatcher<C, E>
where
    C: StoreClient + 'static,
    E: Executor,
{
    pub fn new(client: Arc<C>, executor: E) -> Self {
        Self { client, executor }
    }

    /// Queue one write of `batch` to `target`.
    ///
    /// Empty batches are skipped.
    pub fn dispatch(&self, batch: Vec<Point>, target: WriteTarget) {
        if batch.is_empty() {
            log::debug!(
                "[dispatch] nothing to write to {}.{}",
                target.database,
                target.retention_policy
            );
            return;
        }

        let client = Arc::clone(&self.client);
        self.executor.execute(Box::new(move || {
            let measurement = batch[0].measurement().to_string();
            match client.write(&batch, &target.database, &target.retention_policy) {
                Ok(()) => log::debug!(
                    "[dispatch] wrote {} '{}' point(s) to {}.{}",
                    batch.len(),
                    measurement,
                    target.database,
                    target.retention_policy
                ),
                Err(e) => log::error!(
                    "[dispatch] failed to write {} '{}' point(s) to {}.{}: {}",
                    batch.len(),
                    measurement,
                    target.database,
                    target.retention_policy,
                    e
                ),
            }
        }));
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}
