// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time-series store client.
//!
//! The publisher depends only on [`StoreClient`]. [`HttpStoreClient`] talks to
//! the InfluxDB 1.x HTTP write endpoint:
//!
//! ```text
//! POST {url}/write?db=<database>&rp=<retention policy>
//! <line protocol, one point per line>
//! ```
//!
//! Database and retention policy must already exist.

use crate::config::PublisherConfig;
use crate::point::{to_line_protocol_body, Point};
use std::time::Duration;

/// Errors from a single write call.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The request never got a response (connect, timeout, TLS...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The store answered with a non-success status.
    #[error("store rejected write with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// Client could not be set up.
    #[error("client setup failed: {0}")]
    Setup(String),
}

/// Writes a batch of points to a database / retention policy.
pub trait StoreClient: Send + Sync {
    fn write(&self, points: &[Point], database: &str, retention_policy: &str)
        -> Result<(), WriteError>;
}

impl<C: StoreClient + ?Sized> StoreClient for std::sync::Arc<C> {
    fn write(
        &self,
        points: &[Point],
        database: &str,
        retention_policy: &str,
    ) -> Result<(), WriteError> {
        (**self).write(points, database, retention_policy)
    }
}

/// Blocking HTTP client for the InfluxDB 1.x write API.
pub struct HttpStoreClient {
    http: reqwest::blocking::Client,
    write_url: String,
    credentials: Option<(String, String)>,
}

impl HttpStoreClient {
    /// Create a client for `base_url` (e.g., "http://localhost:8086").
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WriteError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WriteError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            write_url: format!("{}/write", base_url.trim_end_matches('/')),
            credentials: None,
        })
    }

    /// Create a client from the publisher configuration.
    pub fn from_config(config: &PublisherConfig) -> Result<Self, WriteError> {
        let mut client = Self::new(&config.url, config.write_timeout())?;
        if let Some(user) = &config.username {
            let password = config.password.clone().unwrap_or_default();
            client = client.with_credentials(user.clone(), password);
        }
        Ok(client)
    }

    /// Authenticate writes with HTTP basic auth.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn write_url(&self) -> &str {
        &self.write_url
    }
}

impl StoreClient for HttpStoreClient {
    fn write(
        &self,
        points: &[Point],
        database: &str,
        retention_policy: &str,
    ) -> Result<(), WriteError> {
        let body = to_line_protocol_body(points);
        log::trace!(
            "[client] POST {} db={} rp={} ({} bytes)",
            self.write_url,
            database,
            retention_policy,
            body.len()
        );

        let mut request = self
            .http
            .post(&self.write_url)
            .query(&[("db", database), ("rp", retention_policy)])
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(WriteError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
