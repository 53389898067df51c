use std::time::Duration;

use serde_json::Value;

use super::{
    AuthorDirectory, AuthorHit, SourceError, SourceFuture, WorkSource, get_json, json_str,
    json_year,
};
use crate::Work;
use crate::resolver::{IdentitySource, Person};

pub struct OpenAlex {
    pub base: String,
}

impl OpenAlex {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Top author search result as `(id, display_name)`.
    pub async fn lookup_author(
        &self,
        name: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Option<(String, Option<String>)>, SourceError> {
        let url = format!("{}/authors", self.base);
        let data = get_json(client, &url, &[("search", name)], timeout).await?;
        Ok(parse_author_search(&data))
    }

    pub async fn works_by_author(
        &self,
        author_id: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Vec<Work>, SourceError> {
        let url = format!("{}/works", self.base);
        let filter = format!("author.id:{}", author_id);
        let data = get_json(
            client,
            &url,
            &[("filter", filter.as_str()), ("per-page", "5")],
            timeout,
        )
        .await?;
        Ok(parse_works(&data))
    }
}

impl AuthorDirectory for OpenAlex {
    fn source(&self) -> IdentitySource {
        IdentitySource::OpenAlex
    }

    fn lookup<'a>(
        &'a self,
        name: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Option<AuthorHit>> {
        Box::pin(async move {
            let hit = self
                .lookup_author(name, client, timeout)
                .await?
                .map(|(id, display_name)| AuthorHit {
                    name: display_name,
                    orcid: None,
                    openalex: Some(id),
                    homepage: None,
                });
            Ok(hit)
        })
    }
}

impl WorkSource for OpenAlex {
    fn name(&self) -> &str {
        "OpenAlex"
    }

    fn applies_to(&self, person: &Person) -> bool {
        person.openalex.is_some()
    }

    fn fetch_works<'a>(
        &'a self,
        person: &'a Person,
        _concepts: &'a [String],
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Vec<Work>> {
        Box::pin(async move {
            match person.openalex.as_deref() {
                Some(id) => self.works_by_author(id, client, timeout).await,
                None => Ok(vec![]),
            }
        })
    }
}

pub fn parse_author_search(data: &Value) -> Option<(String, Option<String>)> {
    let first = data["results"].as_array()?.first()?;
    let id = json_str(&first["id"])?;
    Some((id, json_str(&first["display_name"])))
}

pub fn parse_works(data: &Value) -> Vec<Work> {
    data["results"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .map(|w| Work {
                    title: json_str(&w["title"]).unwrap_or_default(),
                    year: json_year(&w["publication_year"]),
                    doi: json_str(&w["doi"]),
                    url: json_str(&w["id"]),
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
    fn author_search_takes_first_result() {
        let data = json!({"results": [
            {"id": "https://openalex.org/A5023888391", "display_name": "John Protevi"},
            {"id": "https://openalex.org/A1", "display_name": "Someone Else"}
        ]});
        assert_eq!(
            parse_author_search(&data),
            Some((
                "https://openalex.org/A5023888391".to_string(),
                Some("John Protevi".to_string())
            ))
        );
        assert_eq!(parse_author_search(&json!({"results": []})), None);
        assert_eq!(parse_author_search(&json!({"results": [{"display_name": "No Id"}]})), None);
    }

    #[test]
    fn works_map_fields() {
        let data = json!({"results": [
            {
                "id": "https://openalex.org/W2015",
                "title": "Political Affect",
                "publication_year": 2009,
                "doi": "https://doi.org/10.5749/j.ctttv0ts"
            },
            {"id": "https://openalex.org/W2016", "title": null, "publication_year": null}
        ]});
        let works = parse_works(&data);
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].title, "Political Affect");
        assert_eq!(works[0].year, Some(2009));
        assert_eq!(works[0].url.as_deref(), Some("https://openalex.org/W2015"));
        assert_eq!(works[1].title, "");
        assert_eq!(works[1].doi, None);
    }
}
