use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("backoffice_requests_total", "Total number of API requests").unwrap();
    pub static ref TOGGLES: CounterVec = register_counter_vec!(
        "backoffice_visibility_toggles_total",
        "Visibility toggles by kind and outcome",
        &["kind", "outcome"]
    )
    .unwrap();
    pub static ref LOGIN_CHECKS: CounterVec = register_counter_vec!(
        "backoffice_login_checks_total",
        "Login checks by outcome",
        &["outcome"]
    )
    .unwrap();
    pub static ref INVALIDATION_FAILURES: Counter = register_counter!(
        "backoffice_invalidation_failures_total",
        "Cache invalidations that were dropped or failed"
    )
    .unwrap();
    pub static ref RATE_LIMIT_SWEPT: Counter = register_counter!(
        "backoffice_rate_limit_swept_total",
        "Expired rate limit entries removed by the sweeper"
    )
    .unwrap();
    pub static ref TOGGLE_LATENCY: Histogram = register_histogram!(
        "backoffice_toggle_latency_seconds",
        "Visibility toggle latency in seconds"
    )
    .unwrap();
}
