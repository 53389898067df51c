//! Regex-based intent matching for the chat endpoint.
//!
//! There is no language understanding here: a message either matches one of a
//! few tool intents or receives a canned answer keyed on substrings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::text_utils::extract_years;

static QUERY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"for ([a-z0-9\- ]+)").unwrap());
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"type (book|article|chapter|edited volume|thesis|other)").unwrap()
});

pub const DEFAULT_SITE_ID: &str = "buchanan-vault";

const WIKI_SAMPLE: &str =
    "* ''Assemblage Theory and Method''. Bloomsbury. 2021. ISBN 9781350014680.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

impl Citation {
    pub fn bibliography() -> Self {
        Self {
            title: "Bibliography".to_string(),
            url: "/bibliography".to_string(),
        }
    }
}

/// Filters for the bibliography page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BibliographyFilter {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

/// A client-side tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "args")]
pub enum ToolCall {
    #[serde(rename = "openBibliography")]
    OpenBibliography(BibliographyFilter),
    #[serde(rename = "copyWikiBlock")]
    CopyWikiBlock { selection: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolProposal {
    pub needs_tool: bool,
    pub call: ToolCall,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Reply to a chat query: a tool proposal, or a plain answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryReply {
    Tool(ToolProposal),
    Answer(Answer),
}

pub fn answer_stub(_site_id: &str, msg: &str) -> String {
    let m = msg.to_lowercase();
    let text = if m.contains("assemblage") {
        "Assemblage theory (per Deleuze & Guattari) treats phenomena as contingent wholes \
         composed of heterogeneous parts whose relations are productive and revisable, not essences. \
         Buchanan's scholarship clarifies method: describe components, relations, capacities, \
         and territorialization/deterritorialization dynamics."
    } else if m.contains("wikipedia") && m.contains("block") {
        "Use the Wikipedia block generator on the right rail of the Bibliography page, then copy."
    } else if m.contains("formatting") || m.contains("referenc") {
        "Open the Formatting page for APA, Chicago, Harvard examples and BibTeX/RIS export."
    } else {
        "Ask about Buchanan's works, assemblage, schizoanalysis, or say 'open bibliography for <topic> 2000–2010'."
    };
    text.to_string()
}

/// Parse bibliography filters out of an "open bibliography ..." message.
fn bibliography_filter(m: &str) -> BibliographyFilter {
    let query = QUERY_RE
        .captures(m)
        .map(|c| c[1].trim().to_string())
        .filter(|q| !q.is_empty());
    let years = extract_years(m);
    let kind = TYPE_RE.captures(m).map(|c| c[1].to_string());

    BibliographyFilter {
        query,
        kind,
        year_min: years.first().copied(),
        year_max: (years.len() > 1).then(|| years[years.len() - 1]),
    }
}

pub fn propose_tool(msg: &str) -> Option<ToolProposal> {
    let m = msg.to_lowercase();

    if m.starts_with("open bibliography") || m.contains("open the bibliography") {
        return Some(ToolProposal {
            needs_tool: true,
            call: ToolCall::OpenBibliography(bibliography_filter(&m)),
            answer: "Opening Bibliography with your filters…".to_string(),
            citations: Some(vec![Citation::bibliography()]),
            confirm: None,
            draft: None,
        });
    }

    if m.contains("copy wikipedia block") || m.contains("copy wiki block") {
        return Some(ToolProposal {
            needs_tool: true,
            call: ToolCall::CopyWikiBlock {
                selection: WIKI_SAMPLE.to_string(),
            },
            answer: "Copied to clipboard.".to_string(),
            citations: None,
            confirm: Some(true),
            draft: Some("Copy the current Wikipedia block?".to_string()),
        });
    }

    None
}

/// Answer a chat message: propose a tool if one matches, otherwise a canned answer.
pub fn reply(site_id: &str, msg: &str) -> QueryReply {
    let msg = msg.trim();
    match propose_tool(msg) {
        Some(tool) => QueryReply::Tool(tool),
        None => QueryReply::Answer(Answer {
            answer: answer_stub(site_id, msg),
            citations: vec![Citation::bibliography()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_bibliography_with_filters() {
        let tool = propose_tool("Open bibliography for assemblage type book 2000 to 2010").unwrap();
        let ToolCall::OpenBibliography(filter) = tool.call else {
            panic!("expected openBibliography");
        };
        assert_eq!(filter.query.as_deref(), Some("assemblage type book 2000 to 2010"));
        assert_eq!(filter.kind.as_deref(), Some("book"));
        assert_eq!(filter.year_min, Some(2000));
        assert_eq!(filter.year_max, Some(2010));
    }

    #[test]
    fn single_year_sets_only_min() {
        let tool = propose_tool("please open the bibliography, 1999").unwrap();
        let ToolCall::OpenBibliography(filter) = tool.call else {
            panic!("expected openBibliography");
        };
        assert_eq!(filter.query, None);
        assert_eq!(filter.year_min, Some(1999));
        assert_eq!(filter.year_max, None);
    }

    #[test]
    fn open_bibliography_serializes_like_the_client_expects() {
        let tool = propose_tool("open bibliography for affect").unwrap();
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(
            value,
            json!({
                "needsTool": true,
                "call": {
                    "name": "openBibliography",
                    "args": {"query": "affect", "type": null, "yearMin": null, "yearMax": null}
                },
                "answer": "Opening Bibliography with your filters…",
                "citations": [{"title": "Bibliography", "url": "/bibliography"}]
            })
        );
    }

    #[test]
    fn copy_wiki_block_asks_for_confirmation() {
        let tool = propose_tool("Copy wiki block please").unwrap();
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["call"]["name"], "copyWikiBlock");
        assert_eq!(value["confirm"], true);
        assert_eq!(value["draft"], "Copy the current Wikipedia block?");
        assert!(value.get("citations").is_none());
    }

    #[test]
    fn no_tool_for_questions() {
        assert!(propose_tool("what is assemblage?").is_none());
        assert!(propose_tool("").is_none());
    }

    #[test]
    fn canned_answers() {
        assert!(answer_stub(DEFAULT_SITE_ID, "Explain ASSEMBLAGE").starts_with("Assemblage theory"));
        assert!(answer_stub(DEFAULT_SITE_ID, "wikipedia block?").contains("Wikipedia block generator"));
        assert!(answer_stub(DEFAULT_SITE_ID, "references style").contains("Formatting page"));
        assert!(answer_stub(DEFAULT_SITE_ID, "hello").starts_with("Ask about"));
    }

    #[test]
    fn reply_falls_back_to_answer() {
        let value = serde_json::to_value(reply(DEFAULT_SITE_ID, "  hello ")).unwrap();
        assert_eq!(value["citations"][0]["url"], "/bibliography");
        assert!(value.get("needsTool").is_none());
    }
}
