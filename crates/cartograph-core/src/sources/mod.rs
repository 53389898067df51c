//! Adapters for the external scholarly registries (ORCID, OpenAlex, Crossref).
//!
//! Every adapter maps a provider-specific JSON payload into the common
//! [`Work`] shape. Adapter methods return `Result`; the pipeline goes through
//! [`works_or_empty`] and [`lookup_or_none`], which swallow every failure so a
//! broken source only ever costs its own results.

pub mod crossref;
pub mod openalex;
pub mod orcid;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::Work;
use crate::resolver::{IdentitySource, Person};

pub use crossref::Crossref;
pub use openalex::OpenAlex;
pub use orcid::Orcid;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Boxed future returned by source adapters.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// An identity found in an external author registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorHit {
    pub name: Option<String>,
    pub orcid: Option<String>,
    pub openalex: Option<String>,
    pub homepage: Option<String>,
}

/// A registry that can turn a free-text name into an identity.
pub trait AuthorDirectory: Send + Sync {
    /// Which identity source a hit from this directory counts as.
    fn source(&self) -> IdentitySource;

    fn lookup<'a>(
        &'a self,
        name: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Option<AuthorHit>>;
}

/// A provider of works for a resolved person.
pub trait WorkSource: Send + Sync {
    /// The canonical name of this source (e.g., "ORCID", "Crossref").
    fn name(&self) -> &str;

    /// Whether this source has enough identity information to be queried.
    fn applies_to(&self, person: &Person) -> bool;

    fn fetch_works<'a>(
        &'a self,
        person: &'a Person,
        concepts: &'a [String],
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Vec<Work>>;
}

/// Query a work source, degrading any failure to an empty list.
pub async fn works_or_empty(
    source: &dyn WorkSource,
    person: &Person,
    concepts: &[String],
    client: &reqwest::Client,
    timeout: Duration,
) -> Vec<Work> {
    match source.fetch_works(person, concepts, client, timeout).await {
        Ok(works) => {
            tracing::debug!(source = source.name(), person = %person.name, count = works.len(), "fetched works");
            works
        }
        Err(e) => {
            tracing::warn!(source = source.name(), person = %person.name, error = %e, "work source failed");
            vec![]
        }
    }
}

/// Query an author directory, degrading any failure to "no hit".
pub async fn lookup_or_none(
    directory: &dyn AuthorDirectory,
    name: &str,
    client: &reqwest::Client,
    timeout: Duration,
) -> Option<AuthorHit> {
    match directory.lookup(name, client, timeout).await {
        Ok(hit) => hit,
        Err(e) => {
            tracing::warn!(source = %directory.source(), name, error = %e, "author lookup failed");
            None
        }
    }
}

/// GET `url` and decode the body as JSON, treating non-2xx as an error.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<serde_json::Value, SourceError> {
    let resp = client
        .get(url)
        .query(query)
        .header("Accept", "application/json")
        .timeout(timeout)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Status(status));
    }

    Ok(resp.json().await?)
}

/// Read an integer that providers sometimes encode as a string.
pub(crate) fn json_year(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A non-empty string field, or `None`.
pub(crate) fn json_str(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
pub(crate) mod mock;
