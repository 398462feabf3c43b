//! # Submit Sinks
//!
//! The asynchronous collaborator a validated payload is handed to. The
//! session only sees success or failure; a failure becomes the single form
//! banner.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a [`SubmitSink`].
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing the payload to disk failed.
    #[error("failed to write '{path}': {source}")]
    Io {
        /// Destination file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP request could not be completed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Failure from a sink defined outside this crate.
    #[error("{0}")]
    Custom(String),
}

/// Receives the projected payload of a valid form.
#[async_trait]
pub trait SubmitSink: Send + Sync {
    /// Persist or forward `payload`.
    async fn submit(&self, payload: &Value) -> Result<(), SinkError>;
}

/// Writes the payload as pretty-printed JSON to a file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmitSink for FileSink {
    async fn submit(&self, payload: &Value) -> Result<(), SinkError> {
        let mut bytes = serde_json::to_vec_pretty(payload)?;
        bytes.push(b'\n');
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| SinkError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), "payload written");
        Ok(())
    }
}

/// POSTs the payload as JSON to an endpoint.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Use a preconfigured client (timeouts, proxies, default headers).
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmitSink for HttpSink {
    async fn submit(&self, payload: &Value) -> Result<(), SinkError> {
        let response = self.client.post(&self.endpoint).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(endpoint = %self.endpoint, status = status.as_u16(), "payload posted");
        Ok(())
    }
}
