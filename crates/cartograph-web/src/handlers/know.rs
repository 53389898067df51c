use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};

use cartograph_core::prompts::{self, QueryReply};
use cartograph_core::tools::{self, ToolDescriptor};
use cartograph_core::{Graph, GraphMode};

use crate::models::{
    CompileRequest, IngestRequest, IngestResponse, IngestStats, LenientJson, QueryRequest,
    ToolsParams,
};
use crate::state::AppState;

pub async fn query(LenientJson(req): LenientJson<QueryRequest>) -> Json<QueryReply> {
    let msg = req.msg.as_deref().unwrap_or("");
    Json(prompts::reply(req.site_id(), msg))
}

pub async fn tools(Query(params): Query<ToolsParams>) -> Json<Vec<ToolDescriptor>> {
    Json(tools::list_tools(params.site_id()))
}

pub async fn ingest(LenientJson(req): LenientJson<IngestRequest>) -> Json<IngestResponse> {
    let stats = IngestStats::from_request(&req);
    tracing::debug!(pages = stats.pages, chunks = stats.chunks, "ingest accepted");
    Json(IngestResponse { ok: true, stats })
}

pub async fn compile(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<CompileRequest>,
) -> Json<Graph> {
    let prompt = req.prompt.unwrap_or_default();
    let mode = req
        .mode
        .as_deref()
        .map(GraphMode::from_name)
        .unwrap_or_default();
    Json(state.cartographer.compile(&prompt, mode).await)
}
