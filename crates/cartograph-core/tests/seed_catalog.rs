//! Checks against the shipped `data/scholars.json`, with every external
//! source disabled so nothing touches the network.

use std::path::PathBuf;

use cartograph_core::cartography::Node;
use cartograph_core::{Cartographer, Catalog, Config, GraphMode, IdentitySource, YearWindow};

fn seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/scholars.json")
}

fn offline_config() -> Config {
    Config {
        catalog_path: seed_path(),
        disabled_sources: vec!["ORCID".into(), "OpenAlex".into(), "Crossref".into()],
        ..Config::default()
    }
}

#[test]
fn seed_loads_and_has_valid_orcids() {
    let catalog = Catalog::load(&seed_path()).unwrap();
    assert!(catalog.scholars().iter().any(|s| s.name == "Manuel DeLanda"));
    assert!(catalog.invalid_orcids().is_empty());
}

#[tokio::test]
async fn delanda_without_orcid_still_has_works() {
    let pipeline = Cartographer::new(&offline_config()).unwrap();
    let people = pipeline.resolve(&["Manuel DeLanda".to_string()]).await;
    assert_eq!(people[0].source, IdentitySource::Seed);
    assert!(people[0].orcid.is_none());

    let works = pipeline
        .fetch_for(&people[0], &["assemblage".to_string()], YearWindow::default(), 5)
        .await;
    assert!(!works.is_empty());
}

#[tokio::test]
async fn compile_across_many_names() {
    let pipeline = Cartographer::new(&offline_config()).unwrap();
    let graph = pipeline
        .compile(
            "compare assemblage across Massumi, Protevi, DeLanda, Buchanan",
            GraphMode::ConceptLineage,
        )
        .await;

    assert!(graph.nodes.iter().any(|n| matches!(
        n,
        Node::Author { label, .. } if label.contains("DeLanda")
    )));
    assert!(graph.nodes.iter().any(|n| matches!(
        n,
        Node::Concept { label, code, .. } if label == "assemblage" && code == "#ASS"
    )));
    assert!(graph.nodes.iter().any(|n| n.id() == "0000-0003-4864-6495"));
}
