//! Back-office API core for the training-course site.
//!
//! Serves the admin visibility toggles for every publishable resource and the
//! login throttle. Records live behind [`store::EntityStore`]; rendered pages
//! are refreshed through [`cache::CacheInvalidator`] by a background worker.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod store;
pub mod visibility;
pub mod worker;

use entity::EntityKind;
use handlers::{
    health_handler, keep_alive_handler, login_check_handler, metrics_handler, toggle_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let mut router: Router<Arc<AppState>> = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/cron/keep-alive", get(keep_alive_handler))
        .route("/api/auth/login-check", post(login_check_handler));

    // one toggle route per kind, all sharing a handler
    for kind in EntityKind::ALL {
        let path = format!("/api/{}/{{id}}/toggle-visibility", kind.route_segment());
        router = router.route(
            &path,
            patch(move |state: State<Arc<AppState>>, id: Path<String>| {
                toggle_handler(kind, state, id)
            }),
        );
    }

    router.with_state(state)
}
