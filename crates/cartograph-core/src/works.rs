//! Work aggregation across sources.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Work;
use crate::catalog::Catalog;
use crate::resolver::Person;
use crate::sources::{WorkSource, works_or_empty};
use crate::text_utils::normalize_title;

/// Inclusive publication-year bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl YearWindow {
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Works without a known year are always admitted.
    pub fn admits(&self, year: Option<i32>) -> bool {
        let Some(y) = year else { return true };
        self.min.is_none_or(|min| y >= min) && self.max.is_none_or(|max| y <= max)
    }
}

/// Identity key of a work: DOI, else URL, else normalized title.
pub fn dedupe_key(work: &Work) -> String {
    if let Some(ref doi) = work.doi {
        return format!("doi:{}", doi.to_lowercase());
    }
    if let Some(ref url) = work.url {
        return format!("url:{}", url);
    }
    format!("title:{}", normalize_title(&work.title))
}

/// Keep the first occurrence of every key, up to `limit` works.
/// Untitled works are dropped.
pub fn dedupe_top(works: Vec<Work>, limit: usize) -> Vec<Work> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for work in works {
        if out.len() >= limit {
            break;
        }
        if work.title.trim().is_empty() {
            continue;
        }
        if seen.insert(dedupe_key(&work)) {
            out.push(work);
        }
    }
    out
}

/// Titles the catalog knows for `person`, as works pointing at its first source.
fn catalog_hints(person: &Person, catalog: &Catalog) -> Vec<Work> {
    let Some(seed) = catalog.find(&person.name) else {
        return vec![];
    };
    let url = seed.sources.first().cloned();
    seed.works_hint
        .iter()
        .map(|title| Work {
            title: title.clone(),
            year: None,
            doi: None,
            url: url.clone(),
        })
        .collect()
}

/// Gather works for a person.
///
/// Sources are tried in priority order and only while fewer than `limit`
/// works have been collected. Catalog hints top up very thin results.
#[allow(clippy::too_many_arguments)]
pub async fn fetch_for(
    person: &Person,
    concepts: &[String],
    window: YearWindow,
    limit: usize,
    sources: &[Arc<dyn WorkSource>],
    catalog: &Catalog,
    client: &reqwest::Client,
    timeout: Duration,
) -> Vec<Work> {
    let mut results: Vec<Work> = Vec::new();

    for source in sources {
        if results.len() >= limit || !source.applies_to(person) {
            continue;
        }
        results.extend(works_or_empty(source.as_ref(), person, concepts, client, timeout).await);
    }

    if results.len() < (limit / 2).max(2) {
        results.extend(catalog_hints(person, catalog));
    }

    if !window.is_open() {
        results.retain(|w| window.admits(w.year));
    }

    dedupe_top(results, limit)
}
