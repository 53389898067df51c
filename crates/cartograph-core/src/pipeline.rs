use std::sync::Arc;
use std::time::Duration;

use crate::cartography::{AuthorWorks, Graph, GraphMode, build_graph, plan};
use crate::catalog::{Catalog, CatalogStore};
use crate::resolver::{self, Person};
use crate::sources::orcid::BiblioItem;
use crate::sources::{AuthorDirectory, Crossref, OpenAlex, Orcid, SourceError, WorkSource};
use crate::works::{self, YearWindow};
use crate::{Config, CoreError, Work, build_client};

/// Resolution, aggregation and graph compilation over one shared HTTP client.
pub struct Cartographer {
    client: reqwest::Client,
    catalog: CatalogStore,
    orcid: Arc<Orcid>,
    directories: Vec<Arc<dyn AuthorDirectory>>,
    sources: Vec<Arc<dyn WorkSource>>,
    timeout: Duration,
    works_limit: usize,
}

impl Cartographer {
    /// Build the default pipeline: ORCID and OpenAlex as author directories,
    /// ORCID, OpenAlex and Crossref as work sources, minus any disabled ones.
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        let client = build_client()?;
        let orcid = Arc::new(Orcid::new(&config.orcid_base));
        let openalex = Arc::new(OpenAlex::new(&config.openalex_base));
        let crossref = Arc::new(Crossref::new(
            &config.crossref_base,
            config.crossref_mailto.clone(),
        ));

        let mut directories: Vec<Arc<dyn AuthorDirectory>> = Vec::new();
        let mut sources: Vec<Arc<dyn WorkSource>> = Vec::new();
        if !config.is_disabled("ORCID") {
            directories.push(orcid.clone());
            sources.push(orcid.clone());
        }
        if !config.is_disabled("OpenAlex") {
            directories.push(openalex.clone());
            sources.push(openalex);
        }
        if !config.is_disabled("Crossref") {
            sources.push(crossref);
        }
        tracing::debug!(
            directories = directories.len(),
            sources = sources.len(),
            "pipeline configured"
        );

        Ok(Self {
            client,
            catalog: CatalogStore::new(&config.catalog_path),
            orcid,
            directories,
            sources,
            timeout: config.source_timeout(),
            works_limit: config.works_limit,
        })
    }

    /// Build a pipeline over explicit backends.
    pub fn with_backends(
        config: &Config,
        client: reqwest::Client,
        catalog: CatalogStore,
        directories: Vec<Arc<dyn AuthorDirectory>>,
        sources: Vec<Arc<dyn WorkSource>>,
    ) -> Self {
        Self {
            client,
            catalog,
            orcid: Arc::new(Orcid::new(&config.orcid_base)),
            directories,
            sources,
            timeout: config.source_timeout(),
            works_limit: config.works_limit,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.get()
    }

    pub fn orcid(&self) -> &Orcid {
        &self.orcid
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn works_limit(&self) -> usize {
        self.works_limit
    }

    pub async fn resolve(&self, names: &[String]) -> Vec<Person> {
        let catalog = self.catalog.get();
        resolver::resolve(names, &catalog, &self.directories, &self.client, self.timeout).await
    }

    pub async fn fetch_for(
        &self,
        person: &Person,
        concepts: &[String],
        window: YearWindow,
        limit: usize,
    ) -> Vec<Work> {
        let catalog = self.catalog.get();
        works::fetch_for(
            person,
            concepts,
            window,
            limit,
            &self.sources,
            &catalog,
            &self.client,
            self.timeout,
        )
        .await
    }

    /// Compile a cartography graph from a free-text prompt.
    pub async fn compile(&self, prompt: &str, mode: GraphMode) -> Graph {
        let plan = plan(prompt);
        tracing::info!(
            names = plan.names.len(),
            concepts = ?plan.concepts,
            ?mode,
            "compiling cartography"
        );

        let people = self.resolve(&plan.names).await;
        let mut authors = Vec::with_capacity(people.len());
        for person in people {
            let works = self
                .fetch_for(&person, &plan.concepts, plan.window, self.works_limit)
                .await;
            authors.push(AuthorWorks { person, works });
        }

        build_graph(&plan.concepts, &authors, mode)
    }

    /// ORCID works of one iD as bibliography entries.
    pub async fn orcid_biblio(&self, orcid: &str) -> Result<Vec<BiblioItem>, SourceError> {
        self.orcid.biblio_items(orcid, &self.client, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Scholar;
    use crate::cartography::{EdgeKind, Node};
    use crate::resolver::IdentitySource;
    use crate::sources::AuthorHit;
    use crate::sources::mock::{MockDirectory, MockResponse, MockSource};

    fn catalog() -> CatalogStore {
        CatalogStore::preloaded(Catalog::new(vec![Scholar {
            name: "Manuel DeLanda".into(),
            aliases: vec!["DeLanda".into()],
            orcid: None,
            sources: vec!["https://example.org/delanda".into()],
            works_hint: vec!["Assemblage Theory".into(), "Intensive Science".into()],
        }]))
    }

    #[test]
    fn disabled_sources_are_left_out() {
        let config = Config {
            disabled_sources: vec!["crossref".into(), "openalex".into()],
            ..Config::default()
        };
        let pipeline = Cartographer::new(&config).unwrap();
        assert_eq!(pipeline.directories.len(), 1);
        assert_eq!(pipeline.sources.len(), 1);
        assert_eq!(pipeline.sources[0].name(), "ORCID");
    }

    #[tokio::test]
    async fn compile_combines_catalog_and_sources() {
        let directory = Arc::new(MockDirectory::new(
            IdentitySource::Orcid,
            MockResponse::Ok(Some(AuthorHit {
                name: Some("Brian Massumi".into()),
                orcid: Some("0000-0002-1825-0097".into()),
                ..Default::default()
            })),
        ));
        let orcid_works = Arc::new(
            MockSource::new(
                "ORCID",
                MockResponse::Ok(vec![Work {
                    title: "Parables for the Virtual: Movement, Affect, Sensation".into(),
                    year: Some(2002),
                    doi: Some("10.1215/9780822383574".into()),
                    url: None,
                }]),
            )
            .requiring(IdentitySource::Orcid),
        );
        let crossref = Arc::new(MockSource::new("Crossref", MockResponse::Fail));
        let directories: Vec<Arc<dyn AuthorDirectory>> = vec![directory.clone()];
        let sources: Vec<Arc<dyn WorkSource>> = vec![orcid_works, crossref];
        let pipeline = Cartographer::with_backends(
            &Config::default(),
            reqwest::Client::new(),
            catalog(),
            directories,
            sources,
        );

        let graph = pipeline
            .compile("affect and assemblage across Massumi and DeLanda", GraphMode::ConceptLineage)
            .await;

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id()).collect();
        assert_eq!(
            ids,
            vec![
                "concept:assemblage",
                "concept:affect",
                "0000-0002-1825-0097",
                "10.1215/9780822383574",
                "Manuel DeLanda",
                "https://example.org/delanda",
            ]
        );
        // Both DeLanda hints share the catalog URL, so only the first survives.
        assert!(matches!(&graph.nodes[5], Node::Work { label, .. } if label == "Assemblage Theory"));
        assert_eq!(directory.call_count(), 1);

        let concept_edges: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Concept)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(
            concept_edges,
            vec![
                ("concept:affect", "10.1215/9780822383574"),
                ("concept:assemblage", "https://example.org/delanda"),
            ]
        );
        assert_eq!(graph.refs["#AFF"].len(), 1);
        assert_eq!(graph.refs["#ASS"].len(), 1);
    }

    #[tokio::test]
    async fn compile_of_empty_prompt_is_empty() {
        let pipeline = Cartographer::with_backends(
            &Config::default(),
            reqwest::Client::new(),
            catalog(),
            vec![],
            vec![],
        );
        let graph = pipeline.compile("", GraphMode::default()).await;
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.refs.is_empty());
    }
}
