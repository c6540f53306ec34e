use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use std::time::Instant;

use crate::entity::EntityKind;
use crate::error::{AppError, ToggleError};
use crate::metrics::{REQUEST_TOTAL, TOGGLE_LATENCY, TOGGLES};
use crate::models::Record;
use crate::state::AppState;
use crate::visibility::toggle_visibility;

// PATCH /api/<kind>/{id}/toggle-visibility
pub async fn toggle_handler(
    kind: EntityKind,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let result = toggle_visibility(state.store.as_ref(), &state.invalidations, kind, &id).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(ToggleError::NotFound { .. }) => "not_found",
        Err(ToggleError::Storage(_)) => "error",
    };
    TOGGLES.with_label_values(&[kind.route_segment(), outcome]).inc();
    TOGGLE_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(result?))
}
