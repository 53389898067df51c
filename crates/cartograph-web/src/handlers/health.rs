use axum::Json;

use crate::models::Health;

pub async fn healthz() -> Json<Health> {
    Json(Health { ok: true })
}
