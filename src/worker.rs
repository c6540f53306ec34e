use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::cache::{CacheInvalidator, InvalidationJob};
use crate::metrics::{INVALIDATION_FAILURES, RATE_LIMIT_SWEPT};
use crate::rate_limit::RateLimiter;

// Background worker -> revalidates queued paths one by one
pub async fn invalidation_worker(
    mut rx: mpsc::Receiver<InvalidationJob>,
    invalidator: Arc<dyn CacheInvalidator>,
) {
    info!("Invalidation worker started");

    // keep receiving jobs until every queue handle is dropped
    while let Some(job) = rx.recv().await {
        for path in &job.paths {
            match invalidator.invalidate(path).await {
                Ok(()) => debug!(path = %path, "Invalidated"),
                // The change is already committed; a stale page is all we lose
                Err(e) => {
                    INVALIDATION_FAILURES.inc();
                    warn!(path = %path, error = %e, "Cache invalidation failed");
                }
            }
        }
    }

    info!("Invalidation worker stopped");
}

// Sweeps expired rate limit entries on a fixed interval
pub async fn rate_limit_sweeper(limiter: RateLimiter, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Rate limit sweeper started (interval: {:?})", every);

    loop {
        ticker.tick().await;

        match limiter.sweep().await {
            Ok(0) => {}
            Ok(removed) => {
                RATE_LIMIT_SWEPT.inc_by(removed as f64);
                debug!(removed, "Swept expired rate limit entries");
            }
            Err(e) => warn!(error = %e, "Rate limit sweep failed"),
        }
    }
}
