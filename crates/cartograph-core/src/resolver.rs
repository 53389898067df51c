//! Name → identity resolution.
//!
//! Each name walks a waterfall: local catalog, then every configured author
//! directory in order (ORCID, OpenAlex), then a literal string fallback. The
//! first step that answers decides the identity and its confidence.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::catalog::{Catalog, Scholar};
use crate::sources::{AuthorDirectory, AuthorHit, lookup_or_none};

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Seed,
    Orcid,
    OpenAlex,
    String,
}

impl IdentitySource {
    pub fn confidence(self) -> f64 {
        match self {
            IdentitySource::Seed => 0.95,
            IdentitySource::Orcid => 0.9,
            IdentitySource::OpenAlex => 0.8,
            IdentitySource::String => 0.5,
        }
    }
}

impl std::fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IdentitySource::Seed => "seed",
            IdentitySource::Orcid => "orcid",
            IdentitySource::OpenAlex => "openalex",
            IdentitySource::String => "string",
        };
        f.write_str(s)
    }
}

/// A resolved identity with a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub name: String,
    pub orcid: Option<String>,
    pub aliases: Vec<String>,
    pub homepage: Option<String>,
    pub openalex: Option<String>,
    pub sources: Vec<String>,
    pub confidence: f64,
    pub source: IdentitySource,
}

impl Person {
    fn from_seed(seed: &Scholar) -> Self {
        Self {
            name: seed.name.clone(),
            orcid: seed.orcid.clone(),
            aliases: seed.aliases.clone(),
            homepage: None,
            openalex: None,
            sources: seed.sources.clone(),
            confidence: IdentitySource::Seed.confidence(),
            source: IdentitySource::Seed,
        }
    }

    fn from_hit(query: &str, hit: AuthorHit, source: IdentitySource) -> Self {
        Self {
            name: hit.name.unwrap_or_else(|| query.to_string()),
            orcid: hit.orcid,
            aliases: vec![],
            homepage: hit.homepage,
            sources: hit.openalex.iter().cloned().collect(),
            openalex: hit.openalex,
            confidence: source.confidence(),
            source,
        }
    }

    /// Identity with nothing but the name as typed.
    pub fn literal(name: &str) -> Self {
        Self {
            name: name.to_string(),
            orcid: None,
            aliases: vec![],
            homepage: None,
            openalex: None,
            sources: vec![],
            confidence: IdentitySource::String.confidence(),
            source: IdentitySource::String,
        }
    }
}

/// Resolve every name, in order, to exactly one identity.
pub async fn resolve(
    names: &[String],
    catalog: &Catalog,
    directories: &[Arc<dyn AuthorDirectory>],
    client: &reqwest::Client,
    timeout: Duration,
) -> Vec<Person> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        out.push(resolve_one(name, catalog, directories, client, timeout).await);
    }
    out
}

async fn resolve_one(
    name: &str,
    catalog: &Catalog,
    directories: &[Arc<dyn AuthorDirectory>],
    client: &reqwest::Client,
    timeout: Duration,
) -> Person {
    if let Some(seed) = catalog.find(name) {
        tracing::debug!(name, matched = %seed.name, "resolved from catalog");
        return Person::from_seed(seed);
    }

    for directory in directories {
        if let Some(hit) = lookup_or_none(directory.as_ref(), name, client, timeout).await {
            tracing::debug!(name, source = %directory.source(), "resolved from directory");
            return Person::from_hit(name, hit, directory.source());
        }
    }

    tracing::debug!(name, "no identity found, using literal name");
    Person::literal(name)
}
