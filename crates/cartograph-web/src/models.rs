use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use cartograph_core::prompts::DEFAULT_SITE_ID;
use cartograph_core::sources::orcid::BiblioItem;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Extractors ──────────────────────────────────────────────────────────

/// JSON body that never rejects: a missing, empty or malformed body
/// deserializes as `T::default()`.
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(body) = Bytes::from_request(req, state).await else {
            return Ok(Self(T::default()));
        };
        let value = serde_json::from_slice(&body).unwrap_or_else(|e| {
            if !body.is_empty() {
                tracing::debug!(error = %e, "unparsable JSON body, using defaults");
            }
            T::default()
        });
        Ok(Self(value))
    }
}

// ── Requests ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub site_id: Option<String>,
    pub msg: Option<String>,
}

impl QueryRequest {
    pub fn site_id(&self) -> &str {
        self.site_id.as_deref().unwrap_or(DEFAULT_SITE_ID)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsParams {
    pub site_id: Option<String>,
}

impl ToolsParams {
    pub fn site_id(&self) -> &str {
        self.site_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SITE_ID)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    /// Page texts, or objects with a `text` field.
    pub pages: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileRequest {
    pub prompt: Option<String>,
    pub mode: Option<String>,
}

// ── Responses ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestStats {
    pub pages: usize,
    pub chunks: usize,
}

impl IngestStats {
    /// Placeholder counts reported when no pages are supplied.
    pub const PLACEHOLDER: IngestStats = IngestStats {
        pages: 3,
        chunks: 42,
    };

    pub fn from_request(req: &IngestRequest) -> Self {
        let Some(ref pages) = req.pages else {
            return Self::PLACEHOLDER;
        };
        let chunks = pages
            .iter()
            .filter_map(|p| match p {
                Value::String(s) => Some(s.as_str()),
                other => other["text"].as_str(),
            })
            .map(|text| {
                text.split("\n\n")
                    .filter(|para| !para.trim().is_empty())
                    .count()
            })
            .sum();
        Self {
            pages: pages.len(),
            chunks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub stats: IngestStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrcidWorks {
    pub works: Vec<BiblioItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
