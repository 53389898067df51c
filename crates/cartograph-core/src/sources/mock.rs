//! Mock sources for testing the resolver and aggregator without HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{AuthorDirectory, AuthorHit, SourceError, SourceFuture, WorkSource};
use crate::Work;
use crate::resolver::{IdentitySource, Person};

/// A configurable mock response.
#[derive(Clone, Debug)]
pub enum MockResponse<T> {
    Ok(T),
    /// Simulate a failed request (HTTP 503).
    Fail,
}

impl<T: Clone> MockResponse<T> {
    fn resolve(&self) -> Result<T, SourceError> {
        match self {
            MockResponse::Ok(v) => Ok(v.clone()),
            MockResponse::Fail => Err(SourceError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            )),
        }
    }
}

/// A hand-rolled [`WorkSource`] returning a fixed response and counting calls.
pub struct MockSource {
    name: &'static str,
    requires: Option<IdentitySource>,
    response: MockResponse<Vec<Work>>,
    call_count: AtomicUsize,
}

impl MockSource {
    /// A source that applies to every person.
    pub fn new(name: &'static str, response: MockResponse<Vec<Work>>) -> Self {
        Self {
            name,
            requires: None,
            response,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Only apply to persons carrying the identifier of `source` (ORCID or OpenAlex).
    pub fn requiring(mut self, source: IdentitySource) -> Self {
        self.requires = Some(source);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl WorkSource for MockSource {
    fn name(&self) -> &str {
        self.name
    }

    fn applies_to(&self, person: &Person) -> bool {
        match self.requires {
            Some(IdentitySource::Orcid) => person.orcid.is_some(),
            Some(IdentitySource::OpenAlex) => person.openalex.is_some(),
            _ => true,
        }
    }

    fn fetch_works<'a>(
        &'a self,
        _person: &'a Person,
        _concepts: &'a [String],
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> SourceFuture<'a, Vec<Work>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let result = self.response.resolve();
        Box::pin(async move { result })
    }
}

/// A hand-rolled [`AuthorDirectory`] answering every lookup the same way.
pub struct MockDirectory {
    source: IdentitySource,
    response: MockResponse<Option<AuthorHit>>,
    call_count: AtomicUsize,
}

impl MockDirectory {
    pub fn new(source: IdentitySource, response: MockResponse<Option<AuthorHit>>) -> Self {
        Self {
            source,
            response,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl AuthorDirectory for MockDirectory {
    fn source(&self) -> IdentitySource {
        self.source
    }

    fn lookup<'a>(
        &'a self,
        _name: &'a str,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> SourceFuture<'a, Option<AuthorHit>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let result = self.response.resolve();
        Box::pin(async move { result })
    }
}
