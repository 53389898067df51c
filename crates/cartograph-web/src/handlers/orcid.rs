use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{ErrorBody, OrcidWorks};
use crate::state::AppState;

/// Proxy an ORCID iD's works as bibliography entries.
pub async fn works(State(state): State<Arc<AppState>>, Path(orcid): Path<String>) -> Response {
    match state.cartographer.orcid_biblio(&orcid).await {
        Ok(works) => Json(OrcidWorks { works }).into_response(),
        Err(e) => {
            tracing::warn!(orcid = %orcid, error = %e, "ORCID works proxy failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
