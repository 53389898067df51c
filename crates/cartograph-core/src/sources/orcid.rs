use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::{
    AuthorDirectory, AuthorHit, SourceError, SourceFuture, WorkSource, get_json, json_str,
    json_year,
};
use crate::Work;
use crate::resolver::{IdentitySource, Person};

/// Client for the ORCID public API (v3.0).
pub struct Orcid {
    pub base: String,
}

/// Name and homepage from an ORCID `/person` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrcidPerson {
    pub name: Option<String>,
    pub homepage: Option<String>,
}

/// A bibliography entry as served by the ORCID proxy route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiblioItem {
    pub id: String,
    pub source: &'static str,
    pub orcid_putcode: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    pub urls: Vec<BiblioLink>,
    pub authors: Vec<BiblioAuthor>,
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiblioLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiblioAuthor {
    pub family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl Orcid {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// First ORCID iD returned by a name search.
    pub async fn search_by_name(
        &self,
        name: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Option<String>, SourceError> {
        let url = format!("{}/search/", self.base);
        let q = format!("name:{}", name);
        let data = get_json(client, &url, &[("q", q.as_str())], timeout).await?;
        Ok(parse_search(&data))
    }

    pub async fn person(
        &self,
        orcid: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<OrcidPerson, SourceError> {
        let url = format!("{}/{}/person", self.base, urlencoding::encode(orcid));
        let data = get_json(client, &url, &[], timeout).await?;
        Ok(parse_person(&data))
    }

    pub async fn works(
        &self,
        orcid: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Vec<Work>, SourceError> {
        let data = self.works_payload(orcid, client, timeout).await?;
        Ok(parse_works(&data))
    }

    pub async fn biblio_items(
        &self,
        orcid: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Vec<BiblioItem>, SourceError> {
        let data = self.works_payload(orcid, client, timeout).await?;
        Ok(parse_biblio_items(orcid, &data))
    }

    /// Raw `/works` payload (summaries grouped by work).
    pub async fn works_payload(
        &self,
        orcid: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Value, SourceError> {
        let url = format!("{}/{}/works", self.base, urlencoding::encode(orcid));
        get_json(client, &url, &[], timeout).await
    }

    /// Full record for a single work.
    pub async fn work_detail(
        &self,
        orcid: &str,
        putcode: &str,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Value, SourceError> {
        let url = format!(
            "{}/{}/work/{}",
            self.base,
            urlencoding::encode(orcid),
            urlencoding::encode(putcode)
        );
        get_json(client, &url, &[], timeout).await
    }
}

impl AuthorDirectory for Orcid {
    fn source(&self) -> IdentitySource {
        IdentitySource::Orcid
    }

    fn lookup<'a>(
        &'a self,
        name: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Option<AuthorHit>> {
        Box::pin(async move {
            let Some(orcid) = self.search_by_name(name, client, timeout).await? else {
                return Ok(None);
            };

            // A failed person lookup still leaves us with a usable iD.
            let person = self
                .person(&orcid, client, timeout)
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(orcid = %orcid, error = %e, "ORCID person lookup failed");
                    OrcidPerson::default()
                });

            Ok(Some(AuthorHit {
                name: person.name,
                orcid: Some(orcid),
                openalex: None,
                homepage: person.homepage,
            }))
        })
    }
}

impl WorkSource for Orcid {
    fn name(&self) -> &str {
        "ORCID"
    }

    fn applies_to(&self, person: &Person) -> bool {
        person.orcid.is_some()
    }

    fn fetch_works<'a>(
        &'a self,
        person: &'a Person,
        _concepts: &'a [String],
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SourceFuture<'a, Vec<Work>> {
        Box::pin(async move {
            match person.orcid.as_deref() {
                Some(orcid) => self.works(orcid, client, timeout).await,
                None => Ok(vec![]),
            }
        })
    }
}

pub fn parse_search(data: &Value) -> Option<String> {
    data["result"]
        .as_array()?
        .iter()
        .find_map(|r| json_str(&r["orcid-identifier"]["path"]))
}

pub fn parse_person(data: &Value) -> OrcidPerson {
    let given = json_str(&data["name"]["given-names"]["value"]);
    let family = json_str(&data["name"]["family-name"]["value"]);
    let name = [given, family]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let homepage = data["researcher-urls"]["researcher-url"]
        .as_array()
        .and_then(|urls| urls.first())
        .and_then(|u| json_str(&u["url"]["value"]));

    OrcidPerson {
        name: (!name.is_empty()).then_some(name),
        homepage,
    }
}

/// First external id of the given type (case-insensitive), e.g. `doi`.
pub fn external_id(work: &Value, kind: &str) -> Option<String> {
    work["external-ids"]["external-id"]
        .as_array()?
        .iter()
        .find(|e| {
            e["external-id-type"]
                .as_str()
                .is_some_and(|t| t.eq_ignore_ascii_case(kind))
        })
        .and_then(|e| json_str(&e["external-id-value"]))
}

/// The first summary of every work group.
fn first_summaries(data: &Value) -> impl Iterator<Item = &Value> {
    data["group"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|g| g["work-summary"].as_array().and_then(|s| s.first()))
}

pub fn parse_works(data: &Value) -> Vec<Work> {
    first_summaries(data)
        .map(|w| {
            let doi = external_id(w, "doi");
            Work {
                title: json_str(&w["title"]["title"]["value"]).unwrap_or_default(),
                year: json_year(&w["publication-date"]["year"]["value"]),
                url: doi.as_ref().map(|d| format!("https://doi.org/{}", d)),
                doi,
            }
        })
        .collect()
}

pub fn parse_biblio_items(orcid: &str, data: &Value) -> Vec<BiblioItem> {
    first_summaries(data)
        .map(|s| {
            let putcode = match (&s["put-code"], &s["putcode"]) {
                (Value::Number(n), _) | (_, Value::Number(n)) => n.to_string(),
                (Value::String(p), _) | (_, Value::String(p)) => p.clone(),
                _ => String::new(),
            };
            let doi = external_id(s, "doi");
            let isbn = external_id(s, "isbn");
            let kind = s["type"]
                .as_str()
                .unwrap_or("other")
                .to_lowercase()
                .replace('_', "-");

            BiblioItem {
                id: doi
                    .clone()
                    .or_else(|| isbn.clone())
                    .unwrap_or_else(|| format!("{}-{}", orcid, putcode)),
                source: "orcid",
                orcid_putcode: putcode,
                title: json_str(&s["title"]["title"]["value"])
                    .unwrap_or_else(|| "Untitled".to_string()),
                year: json_year(&s["publication-date"]["year"]["value"]).filter(|y| *y != 0),
                kind,
                venue: json_str(&s["journal-title"]["value"]),
                urls: doi
                    .iter()
                    .map(|d| BiblioLink {
                        label: "DOI".to_string(),
                        href: format!("https://doi.org/{}", d),
                    })
                    .collect(),
                doi,
                isbn13: isbn,
                authors: vec![],
                concepts: vec![],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn works_payload() -> Value {
        json!({
            "group": [
                {"work-summary": [
                    {
                        "put-code": 101,
                        "type": "BOOK_CHAPTER",
                        "title": {"title": {"value": "Assemblage Theory and Method"}},
                        "publication-date": {"year": {"value": "2021"}},
                        "journal-title": {"value": "Bloomsbury"},
                        "external-ids": {"external-id": [
                            {"external-id-type": "isbn", "external-id-value": "9781350014680"},
                            {"external-id-type": "doi", "external-id-value": "10.5040/9781350015616"}
                        ]}
                    },
                    {
                        "put-code": 102,
                        "title": {"title": {"value": "Duplicate summary"}}
                    }
                ]},
                {"work-summary": [
                    {
                        "put-code": 103,
                        "title": {"title": {"value": "Deleuzism"}},
                        "publication-date": null,
                        "external-ids": {"external-id": [
                            {"external-id-type": "isbn", "external-id-value": "0748610464"}
                        ]}
                    }
                ]},
                {"work-summary": []}
            ]
        })
    }

    #[test]
    fn search_takes_first_present_path() {
        let data = json!({"result": [
            {"orcid-identifier": {}},
            {"orcid-identifier": {"path": "0000-0003-4864-6495"}},
            {"orcid-identifier": {"path": "0000-0000-0000-0001"}}
        ]});
        assert_eq!(parse_search(&data).as_deref(), Some("0000-0003-4864-6495"));
        assert_eq!(parse_search(&json!({"result": null})), None);
    }

    #[test]
    fn person_name_and_homepage() {
        let data = json!({
            "name": {"given-names": {"value": "Ian"}, "family-name": {"value": "Buchanan"}},
            "researcher-urls": {"researcher-url": [{"url": {"value": "https://example.edu/ib"}}]}
        });
        let p = parse_person(&data);
        assert_eq!(p.name.as_deref(), Some("Ian Buchanan"));
        assert_eq!(p.homepage.as_deref(), Some("https://example.edu/ib"));

        let family_only = parse_person(&json!({"name": {"family-name": {"value": "Buchanan"}}}));
        assert_eq!(family_only.name.as_deref(), Some("Buchanan"));
        assert_eq!(parse_person(&json!({})), OrcidPerson::default());
    }

    #[test]
    fn works_use_first_summary_per_group() {
        let works = parse_works(&works_payload());
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].title, "Assemblage Theory and Method");
        assert_eq!(works[0].year, Some(2021));
        assert_eq!(works[0].doi.as_deref(), Some("10.5040/9781350015616"));
        assert_eq!(
            works[0].url.as_deref(),
            Some("https://doi.org/10.5040/9781350015616")
        );
        assert_eq!(works[1].title, "Deleuzism");
        assert_eq!(works[1].year, None);
        assert_eq!(works[1].url, None);
    }

    #[test]
    fn biblio_items_ids_and_types() {
        let items = parse_biblio_items("0000-0003-4864-6495", &works_payload());
        assert_eq!(items[0].id, "10.5040/9781350015616");
        assert_eq!(items[0].kind, "book-chapter");
        assert_eq!(items[0].orcid_putcode, "101");
        assert_eq!(items[0].venue.as_deref(), Some("Bloomsbury"));
        assert_eq!(items[0].urls.len(), 1);
        assert_eq!(items[1].id, "0748610464");
        assert_eq!(items[1].kind, "other");
        assert!(items[1].urls.is_empty());

        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["orcidPutcode"], "101");
        assert_eq!(json["type"], "book-chapter");
        assert_eq!(json["source"], "orcid");
    }

    #[test]
    fn biblio_item_without_ids_uses_putcode() {
        let data = json!({"group": [{"work-summary": [{"put-code": 7}]}]});
        let items = parse_biblio_items("0000-0001-2345-6789", &data);
        assert_eq!(items[0].id, "0000-0001-2345-6789-7");
        assert_eq!(items[0].title, "Untitled");
    }
}
