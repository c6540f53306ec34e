use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::InvalidationError;
use crate::metrics::INVALIDATION_FAILURES;

/// Drops the rendered copy of a page so the next request re-renders it.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str) -> Result<(), InvalidationError>;
}

// Calls the frontend's revalidation route
pub struct HttpInvalidator {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl HttpInvalidator {
    // Accepts "localhost:3000" or a full url
    pub fn new(client: reqwest::Client, base_url: &str, secret: String) -> Self {
        let base = base_url.trim().trim_end_matches('/');
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("http://{}", base)
        };
        Self {
            client,
            endpoint: format!("{}/api/revalidate", base),
            secret,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CacheInvalidator for HttpInvalidator {
    async fn invalidate(&self, path: &str) -> Result<(), InvalidationError> {
        let res = self
            .client
            .post(&self.endpoint)
            .header("x-revalidate-secret", &self.secret)
            .json(&json!({ "path": path }))
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(InvalidationError::Status(res.status().as_u16()));
        }
        Ok(())
    }
}

// Used when no frontend is configured
pub struct LogInvalidator;

#[async_trait]
impl CacheInvalidator for LogInvalidator {
    async fn invalidate(&self, path: &str) -> Result<(), InvalidationError> {
        info!(path, "Cache invalidation (no frontend configured)");
        Ok(())
    }
}

// Paths to revalidate after one committed change
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationJob {
    pub paths: Vec<String>,
}

/// Sending half of the invalidation worker's queue. Enqueueing never
/// blocks and never fails the caller.
#[derive(Clone)]
pub struct InvalidationQueue {
    tx: mpsc::Sender<InvalidationJob>,
}

impl InvalidationQueue {
    pub fn new(tx: mpsc::Sender<InvalidationJob>) -> Self {
        Self { tx }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<InvalidationJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    pub fn enqueue(&self, paths: Vec<String>) {
        if paths.is_empty() {
            return;
        }
        debug!(?paths, "Queueing cache invalidation");

        if let Err(e) = self.tx.try_send(InvalidationJob { paths }) {
            let err = InvalidationError::Queue(e.to_string());
            INVALIDATION_FAILURES.inc();
            warn!(error = %err, "Dropped cache invalidation");
        }
    }
}
