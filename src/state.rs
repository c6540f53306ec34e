use std::sync::Arc;
use std::time::Duration;

use crate::cache::InvalidationQueue;
use crate::rate_limit::RateLimiter;
use crate::store::EntityStore;

// app's shared state
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub invalidations: InvalidationQueue,
    pub rate_limiter: RateLimiter,
    pub login_limit: u32,       // max attempts allowed
    pub login_window: Duration, // Duration of the login window
}
