//! Downstream write forwarding.
//!
//! [`WriteSink`] is the seam between translation and delivery: the
//! handler drains its batch through a sink without knowing how delivery
//! happens, so a retry or backoff policy can be layered on as another
//! sink implementation without touching translation.

use crate::{batch::PointBatch, error::Result, forward::line_protocol};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Destination a drained batch can be forwarded to.
#[async_trait]
pub trait WriteSink: Send + Sync {
    /// Drain the batch and submit its points downstream.
    ///
    /// The batch is left empty whether or not the submission succeeds;
    /// on failure the points are dropped and the error reported to the
    /// caller for logging.
    async fn forward(&self, batch: &mut PointBatch) -> Result<()>;
}

/// Connection settings for the downstream store.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Base URL of the downstream server, e.g. `http://localhost:8086`.
    pub url: String,
    /// Username the relay writes with.
    pub username: String,
    /// Password the relay writes with.
    pub password: String,
    /// Upper bound on a single forward call.
    pub timeout: Duration,
}

/// Sink that writes batches to an InfluxDB 0.9 `/write` endpoint.
pub struct InfluxSink {
    client: reqwest::Client,
    write_url: String,
    username: String,
    password: String,
}

impl InfluxSink {
    /// Build the HTTP client for the downstream store.
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(InfluxSink {
            client,
            write_url: format!("{}/write", config.url.trim_end_matches('/')),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl WriteSink for InfluxSink {
    async fn forward(&self, batch: &mut PointBatch) -> Result<()> {
        let points = batch.drain();
        if points.is_empty() {
            debug!(database = batch.database(), "empty batch, nothing to forward");
            return Ok(());
        }

        let body = line_protocol::encode_points(&points);
        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("db", batch.database()),
                ("precision", batch.precision()),
                ("u", self.username.as_str()),
                ("p", self.password.as_str()),
            ])
            .body(body)
            .send()
            .await?;
        response.error_for_status()?;

        info!(points = points.len(), database = batch.database(), "batch forwarded");
        Ok(())
    }
}
