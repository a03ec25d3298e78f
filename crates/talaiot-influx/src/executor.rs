// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Execution strategies for store writes.
//!
//! The dispatcher never calls the store client directly; it hands a job to an
//! [`Executor`]. [`InlineExecutor`] runs the job on the caller's thread (tests,
//! debugging). [`ThreadPoolExecutor`] queues it for a fixed set of worker
//! threads so the caller never waits on the network.
//!
//! ```text
//! publish() --Job--> crossbeam channel --> worker 0..N --> StoreClient::write
//! ```

use crossbeam::channel::{self, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs. Implementations must be callable from many threads at once.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, job: Job) {
        (**self).execute(job)
    }
}

/// Runs each job immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Fixed-size pool of named worker threads.
///
/// Jobs are queued on an unbounded channel; `execute` returns as soon as the
/// job is queued. A job that panics is logged and the worker keeps running.
///
/// Dropping the pool (or calling [`ThreadPoolExecutor::shutdown`]) closes the
/// queue, waits for queued jobs to finish, and joins the workers.
pub struct ThreadPoolExecutor {
    /// `None` once shut down.
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolExecutor {
    /// Spawn `size` workers (at least one).
    pub fn new(size: usize) -> std::io::Result<Self> {
        let size = size.max(1);
        let (tx, rx) = channel::unbounded::<Job>();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("talaiot-publish-{}", id))
                .spawn(move || {
                    for job in rx.iter() {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            log::error!("[executor] worker {} recovered from a panicking job", id);
                        }
                    }
                    log::trace!("[executor] worker {} exiting", id);
                })?;
            workers.push(handle);
        }

        log::debug!("[executor] started {} publish workers", size);
        Ok(Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
        })
    }

    /// Number of live worker threads.
    pub fn size(&self) -> usize {
        self.workers.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Stop accepting jobs, drain the queue and join every worker.
    ///
    /// Jobs submitted afterwards are dropped with a warning.
    pub fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        let workers = match self.workers.lock() {
            Ok(mut w) => std::mem::take(&mut *w),
            Err(_) => return,
        };
        for handle in workers {
            if handle.join().is_err() {
                log::error!("[executor] worker thread panicked during shutdown");
            }
        }
    }
}

impl Executor for ThreadPoolExecutor {
    fn execute(&self, job: Job) {
        let sender = match self.sender.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => {
                if tx.send(job).is_err() {
                    log::warn!("[executor] all workers gone, job dropped");
                }
            }
            None => log::warn!("[executor] pool is shut down, job dropped"),
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
