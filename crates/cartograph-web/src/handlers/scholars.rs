use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use cartograph_core::Scholar;

use crate::state::AppState;

/// The scholar catalog, read-only. An unavailable catalog lists as empty.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Scholar>> {
    Json(state.cartographer.catalog().scholars().to_vec())
}
