//! Cartography graph compilation: authors, works and concepts as nodes and edges.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Work;
use crate::resolver::Person;
use crate::text_utils::{concept_code, extract_years, initials};
use crate::works::YearWindow;

/// Concepts recognised in prompts, in output order.
pub const CONCEPT_VOCABULARY: &[&str] = &[
    "assemblage",
    "affect",
    "rhizome",
    "schizoanalysis",
    "deterritorialization",
    "territorialization",
    "becoming",
    "desire",
    "multiplicity",
    "difference",
];

// Leading word boundary only, so plurals match but "deterritorialization"
// does not count as "territorialization".
static CONCEPT_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    CONCEPT_VOCABULARY
        .iter()
        .map(|c| (*c, Regex::new(&format!(r"\b{}", c)).unwrap()))
        .collect()
});

static ACROSS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)across").unwrap());
static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i) and ").unwrap());

/// How the graph is laid out beyond the base author/work/concept edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    /// Authors, works and concept links only.
    #[default]
    ConceptLineage,
    /// Adds `influences` edges from earlier to later concept-bearing works.
    Lineage,
    /// Adds `coauthor` edges between authors sharing a work.
    CoWork,
}

impl GraphMode {
    /// Parse a mode name; unknown names fall back to the default.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "lineage" => GraphMode::Lineage,
            "co_work" | "cowork" => GraphMode::CoWork,
            _ => GraphMode::ConceptLineage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Concept {
        id: String,
        label: String,
        code: String,
    },
    Author {
        id: String,
        label: String,
        orcid: Option<String>,
        code: String,
    },
    Work {
        id: String,
        label: String,
        year: Option<i32>,
        url: Option<String>,
    },
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Concept { id, .. } | Node::Author { id, .. } | Node::Work { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::Concept { label, .. } | Node::Author { label, .. } | Node::Work { label, .. } => {
                label
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Authored,
    Concept,
    Coauthor,
    Influences,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// A work cited under a concept code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRef {
    pub title: String,
    pub url: Option<String>,
    pub doi: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub refs: BTreeMap<String, Vec<ConceptRef>>,
}

/// A resolved person and the works gathered for them.
#[derive(Debug, Clone)]
pub struct AuthorWorks {
    pub person: Person,
    pub works: Vec<Work>,
}

/// What a prompt asks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptPlan {
    pub names: Vec<String>,
    pub concepts: Vec<String>,
    pub window: YearWindow,
}

pub fn extract_concepts(prompt: &str) -> Vec<String> {
    let lower = prompt.to_lowercase();
    CONCEPT_RES
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(c, _)| c.to_string())
        .collect()
}

/// Names listed after "across", or the whole prompt when there is no list.
pub fn extract_names(prompt: &str) -> Vec<String> {
    let Some(m) = ACROSS_RE.find(prompt) else {
        let name = prompt.trim();
        return if name.is_empty() {
            vec![]
        } else {
            vec![name.to_string()]
        };
    };

    let list = AND_RE.replace_all(&prompt[m.end()..], ",");
    list.split(',')
        .map(|n| {
            n.trim_matches(|c: char| {
                c == ' ' || c == '.' || c == '-' || c == '–' || c.is_ascii_digit()
            })
        })
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

pub fn extract_window(prompt: &str) -> YearWindow {
    let years = extract_years(prompt);
    YearWindow {
        min: years.first().copied(),
        max: (years.len() > 1).then(|| years[years.len() - 1]),
    }
}

pub fn plan(prompt: &str) -> PromptPlan {
    PromptPlan {
        names: extract_names(prompt),
        concepts: extract_concepts(prompt),
        window: extract_window(prompt),
    }
}

fn work_id(work: &Work) -> String {
    work.doi
        .clone()
        .or_else(|| work.url.clone())
        .unwrap_or_else(|| work.title.clone())
}

/// Assemble the graph from resolved authors and their works.
pub fn build_graph(concepts: &[String], authors: &[AuthorWorks], mode: GraphMode) -> Graph {
    let mut graph = Graph::default();
    let mut node_ids: HashSet<String> = HashSet::new();
    let mut edge_set: HashSet<Edge> = HashSet::new();
    let mut work_years: HashMap<String, Option<i32>> = HashMap::new();
    let mut work_order: Vec<String> = Vec::new();
    let mut conceptual: HashSet<String> = HashSet::new();

    let mut push_edge = |graph: &mut Graph, source: &str, target: &str, kind: EdgeKind| {
        let edge = Edge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
        };
        if edge_set.insert(edge.clone()) {
            graph.edges.push(edge);
        }
    };

    for c in concepts {
        let id = format!("concept:{}", c);
        let code = concept_code(c);
        if node_ids.insert(id.clone()) {
            graph.nodes.push(Node::Concept {
                id,
                label: c.clone(),
                code: code.clone(),
            });
            graph.refs.entry(code).or_default();
        }
    }

    for AuthorWorks { person, works } in authors {
        let aid = person.orcid.clone().unwrap_or_else(|| person.name.clone());
        if node_ids.insert(aid.clone()) {
            graph.nodes.push(Node::Author {
                id: aid.clone(),
                label: person.name.clone(),
                orcid: person.orcid.clone(),
                code: initials(&person.name),
            });
        }

        for w in works {
            let wid = work_id(w);
            let first_sighting = node_ids.insert(wid.clone());
            if first_sighting {
                graph.nodes.push(Node::Work {
                    id: wid.clone(),
                    label: w.title.clone(),
                    year: w.year,
                    url: w.url.clone(),
                });
                work_years.insert(wid.clone(), w.year);
                work_order.push(wid.clone());
            }
            push_edge(&mut graph, &aid, &wid, EdgeKind::Authored);

            if !first_sighting {
                continue;
            }
            let title = w.title.to_lowercase();
            for c in concepts {
                if title.contains(&c.to_lowercase()) {
                    push_edge(&mut graph, &format!("concept:{}", c), &wid, EdgeKind::Concept);
                    conceptual.insert(wid.clone());
                    graph
                        .refs
                        .entry(concept_code(c))
                        .or_default()
                        .push(ConceptRef {
                            title: w.title.clone(),
                            url: w.url.clone(),
                            doi: w.doi.clone(),
                            year: w.year,
                        });
                }
            }
        }
    }

    match mode {
        GraphMode::ConceptLineage => {}
        GraphMode::CoWork => {
            let mut by_work: Vec<(String, Vec<String>)> = Vec::new();
            for e in graph.edges.iter().filter(|e| e.kind == EdgeKind::Authored) {
                match by_work.iter_mut().find(|(w, _)| *w == e.target) {
                    Some((_, authors)) => authors.push(e.source.clone()),
                    None => by_work.push((e.target.clone(), vec![e.source.clone()])),
                }
            }
            for (_, authors) in by_work {
                for i in 0..authors.len() {
                    for j in (i + 1)..authors.len() {
                        push_edge(&mut graph, &authors[i], &authors[j], EdgeKind::Coauthor);
                    }
                }
            }
        }
        GraphMode::Lineage => {
            for a in &work_order {
                for b in &work_order {
                    if !conceptual.contains(a) || !conceptual.contains(b) {
                        continue;
                    }
                    if let (Some(Some(ya)), Some(Some(yb))) = (work_years.get(a), work_years.get(b))
                        && ya < yb
                    {
                        push_edge(&mut graph, a, b, EdgeKind::Influences);
                    }
                }
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, orcid: Option<&str>) -> Person {
        Person {
            orcid: orcid.map(String::from),
            ..Person::literal(name)
        }
    }

    fn work(title: &str, year: Option<i32>, doi: Option<&str>) -> Work {
        Work {
            title: title.to_string(),
            year,
            doi: doi.map(String::from),
            url: doi.map(|d| format!("https://doi.org/{d}")),
        }
    }

    #[test]
    fn concepts_from_prompt() {
        assert_eq!(
            extract_concepts("compare Assemblage and affects across Massumi"),
            vec!["assemblage", "affect"]
        );
        assert_eq!(
            extract_concepts("deterritorialization in Buchanan"),
            vec!["deterritorialization"]
        );
        assert!(extract_concepts("nothing relevant").is_empty());
    }

    #[test]
    fn names_after_across() {
        assert_eq!(
            extract_names("compare assemblage across Massumi, Protevi, DeLanda and Buchanan."),
            vec!["Massumi", "Protevi", "DeLanda", "Buchanan"]
        );
        assert_eq!(extract_names("Affect ACROSS Massumi, , ."), vec!["Massumi"]);
        assert_eq!(extract_names(" Ian Buchanan "), vec!["Ian Buchanan"]);
        assert!(extract_names("   ").is_empty());
    }

    #[test]
    fn window_from_prompt() {
        let plan = plan("assemblage across Protevi 2000–2010");
        assert_eq!(plan.names, vec!["Protevi"]);
        assert_eq!(plan.window, YearWindow { min: Some(2000), max: Some(2010) });
        assert!(extract_window("no years").is_open());
    }

    #[test]
    fn mode_names() {
        assert_eq!(GraphMode::from_name("co_work"), GraphMode::CoWork);
        assert_eq!(GraphMode::from_name("lineage"), GraphMode::Lineage);
        assert_eq!(GraphMode::from_name("concept_lineage"), GraphMode::ConceptLineage);
        assert_eq!(GraphMode::from_name("bogus"), GraphMode::ConceptLineage);
    }

    #[test]
    fn base_graph_shape() {
        let authors = vec![AuthorWorks {
            person: person("Manuel DeLanda", None),
            works: vec![
                work("Assemblage Theory", Some(2016), Some("10.1/at")),
                work("Philosophy and Simulation", Some(2011), None),
            ],
        }];
        let graph = build_graph(&["assemblage".to_string()], &authors, GraphMode::ConceptLineage);

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][0]["type"], "concept");
        assert_eq!(value["nodes"][0]["code"], "#ASS");
        assert_eq!(value["nodes"][1]["type"], "author");
        assert_eq!(value["nodes"][1]["id"], "Manuel DeLanda");
        assert_eq!(value["nodes"][1]["code"], "MD");
        assert!(value["nodes"][1]["orcid"].is_null());
        assert_eq!(value["nodes"][2]["id"], "10.1/at");
        assert_eq!(value["nodes"][3]["id"], "Philosophy and Simulation");

        assert_eq!(graph.edges.len(), 3);
        assert_eq!(
            graph.edges[1],
            Edge {
                source: "concept:assemblage".into(),
                target: "10.1/at".into(),
                kind: EdgeKind::Concept,
            }
        );
        assert_eq!(graph.refs["#ASS"].len(), 1);
        assert_eq!(graph.refs["#ASS"][0].year, Some(2016));
    }

    #[test]
    fn concept_without_matching_works_keeps_empty_refs() {
        let graph = build_graph(&["rhizome".to_string()], &[], GraphMode::ConceptLineage);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.refs["#RHI"].is_empty());
    }

    #[test]
    fn shared_work_emitted_once() {
        let shared = work("Deleuze and the Body", Some(2011), Some("10.1/shared"));
        let authors = vec![
            AuthorWorks {
                person: person("Laura Guillaume", Some("0000-0001-0000-0001")),
                works: vec![shared.clone()],
            },
            AuthorWorks {
                person: person("Joe Hughes", None),
                works: vec![shared],
            },
        ];
        let graph = build_graph(&[], &authors, GraphMode::CoWork);

        let work_nodes = graph.nodes.iter().filter(|n| matches!(n, Node::Work { .. })).count();
        assert_eq!(work_nodes, 1);
        let coauthor: Vec<&Edge> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Coauthor)
            .collect();
        assert_eq!(coauthor.len(), 1);
        assert_eq!(coauthor[0].source, "0000-0001-0000-0001");
        assert_eq!(coauthor[0].target, "Joe Hughes");
    }

    #[test]
    fn lineage_links_earlier_to_later_concept_works() {
        let authors = vec![AuthorWorks {
            person: person("Ian Buchanan", None),
            works: vec![
                work("Assemblage Theory and Method", Some(2021), Some("10.1/b")),
                work("Deleuze and Assemblage", Some(2000), Some("10.1/a")),
                work("Assemblage notes", None, Some("10.1/c")),
                work("Unrelated", Some(1990), Some("10.1/d")),
            ],
        }];
        let graph = build_graph(&["assemblage".to_string()], &authors, GraphMode::Lineage);
        let influences: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Influences)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(influences, vec![("10.1/a", "10.1/b")]);
    }
}
