use std::time::Duration;

use serde_json::Value;

use super::{SourceError, SourceFuture, WorkSource, get_json, json_str, json_year};
use crate::Work;
use crate::resolver::Person;

pub struct Crossref {
    pub base: String,
    pub mailto: Option<String>,
}

impl Crossref {
    pub fn new(base: impl Into<String>, mailto: Option<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            mailto,
        }
    }

    /// Free-text search over works, biased by the given concepts.
    pub async fn search(
        &self,
        name: &str,
        concepts: &[String],
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Vec<Work>, SourceError> {
        let url = format!("{}/works", self.base);
        let query = search_query(name, concepts);

        let mut params = vec![("query", query.as_str()), ("rows", "5")];
        if let Some(ref email) = self.mailto {
            params.push(("mailto", email.as_str()));
        }

        let data = get_json(client, &url, &params, timeout).await?;
        Ok(parse_works(&data))
    }
}

impl WorkSource for Crossref {
    fn name(&self) -> &str {
        "Crossref"
    }

    fn applies_to(&self, _person: &Person) -> bool {
        true
    }

    fn fetch_works<'a>(
        &'a self,
        person: &'a Person,
        concepts: &'a [String],
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Vec<Work>> {
        Box::pin(self.search(&person.name, concepts, client, timeout))
    }
}

fn search_query(name: &str, concepts: &[String]) -> String {
    if concepts.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, concepts.join(" "))
    }
}

pub fn parse_works(data: &Value) -> Vec<Work> {
    data["message"]["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| Work {
                    title: item["title"]
                        .as_array()
                        .and_then(|t| t.first())
                        .and_then(json_str)
                        .unwrap_or_default(),
                    year: json_year(&item["issued"]["date-parts"][0][0]),
                    doi: json_str(&item["DOI"]),
                    url: json_str(&item["URL"]),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_appends_concepts() {
        assert_eq!(search_query("Ian Buchanan", &[]), "Ian Buchanan");
        assert_eq!(
            search_query("Ian Buchanan", &["assemblage".into(), "affect".into()]),
            "Ian Buchanan assemblage affect"
        );
    }

    #[test]
    fn items_map_fields() {
        let data = json!({"message": {"items": [
            {
                "title": ["The Problem of the Body in Deleuze and Guattari"],
                "issued": {"date-parts": [[1997, 3]]},
                "DOI": "10.1177/1357034X97003003004",
                "URL": "http://dx.doi.org/10.1177/1357034X97003003004"
            },
            {"title": [], "issued": {"date-parts": [[null]]}}
        ]}});
        let works = parse_works(&data);
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].year, Some(1997));
        assert_eq!(works[0].doi.as_deref(), Some("10.1177/1357034X97003003004"));
        assert_eq!(works[1].title, "");
        assert_eq!(works[1].year, None);
    }

    #[test]
    fn missing_message_is_empty() {
        assert!(parse_works(&json!({"status": "failed"})).is_empty());
    }
}
