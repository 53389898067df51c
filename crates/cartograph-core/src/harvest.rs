//! Offline ORCID harvesting: per-author CSV/Markdown dumps, the master CSV
//! and the cross-author comparison matrix.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CoreError;
use crate::sources::orcid::{Orcid, external_id};
use crate::sources::{SourceError, json_str};
use crate::text_utils::normalize_title;

/// Number of most recent years kept as matrix columns.
pub const MATRIX_YEARS: usize = 10;

/// One harvested work, in master CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestRow {
    pub orcid_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub year: String,
    pub journal_or_publisher: String,
    pub doi: String,
    pub isbn: String,
    pub url: String,
    pub source: String,
}

impl HarvestRow {
    /// `doi:<lowercased doi>`, else `ty:<normalized title>|<year>`.
    pub fn dedupe_key(&self) -> String {
        if self.doi.is_empty() {
            format!("ty:{}|{}", normalize_title(&self.title), self.year)
        } else {
            format!("doi:{}", self.doi.to_lowercase())
        }
    }

    /// Build a row from a full ORCID `/work/{putcode}` record.
    pub fn from_detail(orcid: &str, work: &Value) -> Self {
        let title = json_str(&work["title"]["title"]["value"]).unwrap_or_default();
        let title = match json_str(&work["title"]["subtitle"]["value"]) {
            Some(sub) => format!("{}: {}", title, sub),
            None => title,
        };
        let year = match &work["publication-date"]["year"]["value"] {
            Value::Number(n) => n.to_string(),
            v => json_str(v).unwrap_or_default(),
        };

        Self {
            orcid_id: orcid.to_string(),
            title,
            kind: json_str(&work["type"]).unwrap_or_default(),
            year,
            journal_or_publisher: json_str(&work["journal-title"]["value"])
                .or_else(|| json_str(&work["publisher"]))
                .unwrap_or_default(),
            doi: external_id(work, "doi").unwrap_or_default(),
            isbn: external_id(work, "isbn").unwrap_or_default(),
            url: external_id(work, "uri")
                .or_else(|| external_id(work, "url"))
                .unwrap_or_default(),
            source: "ORCID".to_string(),
        }
    }
}

/// Keep the first row for every dedupe key.
pub fn dedupe_rows(rows: Vec<HarvestRow>) -> Vec<HarvestRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert(r.dedupe_key()))
        .collect()
}

/// Put-codes of every summary in a `/works` payload.
pub fn putcodes(data: &Value) -> Vec<String> {
    data["group"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|g| g["work-summary"].as_array())
        .flatten()
        .filter_map(|s| match &s["put-code"] {
            Value::Number(n) => Some(n.to_string()),
            v => json_str(v),
        })
        .collect()
}

/// Fetch every work of `orcid_id` in full and return deduplicated rows.
///
/// A failed summaries request aborts the harvest. A failed detail request only
/// drops that work.
pub async fn harvest_orcid(
    orcid: &Orcid,
    orcid_id: &str,
    client: &reqwest::Client,
    timeout: Duration,
) -> Result<Vec<HarvestRow>, SourceError> {
    let summaries = orcid.works_payload(orcid_id, client, timeout).await?;
    let codes = putcodes(&summaries);
    tracing::info!(orcid = orcid_id, works = codes.len(), "harvesting ORCID works");

    let mut rows = Vec::with_capacity(codes.len());
    for putcode in codes {
        match orcid.work_detail(orcid_id, &putcode, client, timeout).await {
            Ok(detail) => rows.push(HarvestRow::from_detail(orcid_id, &detail)),
            Err(e) => {
                tracing::warn!(orcid = orcid_id, putcode = %putcode, error = %e, "work detail failed")
            }
        }
    }
    Ok(dedupe_rows(rows))
}

/// Write rows as CSV. Nothing is written for an empty slice.
pub fn write_csv(rows: &[HarvestRow], path: &Path) -> Result<(), CoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read rows from a CSV file; a missing file reads as empty.
pub fn read_csv(path: &Path) -> Result<Vec<HarvestRow>, CoreError> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn year_or_sentinel(row: &HarvestRow) -> &str {
    if row.year.is_empty() { "9999" } else { &row.year }
}

pub fn render_markdown(orcid: &str, rows: &[HarvestRow]) -> String {
    let mut sorted: Vec<&HarvestRow> = rows.iter().collect();
    sorted.sort_by_cached_key(|r| (year_or_sentinel(r).to_string(), normalize_title(&r.title)));

    let mut lines = vec![format!("# ORCID {} — Works\n", orcid)];
    let mut current: Option<&str> = None;
    for r in sorted {
        let year = if r.year.is_empty() { "n.d." } else { r.year.as_str() };
        if current != Some(year) {
            lines.push(format!("\n## {}\n", year));
            current = Some(year);
        }

        let title = if r.title.is_empty() { "(untitled)" } else { &r.title };
        let mut parts = vec![format!("**{}**", title)];
        if !r.journal_or_publisher.is_empty() {
            parts.push(r.journal_or_publisher.clone());
        }
        if !r.kind.is_empty() {
            parts.push(format!("_{}_", r.kind));
        }
        if !r.doi.is_empty() {
            parts.push(format!("DOI: {}", r.doi));
        }
        if !r.url.is_empty() {
            parts.push(format!("[link]({})", r.url));
        }
        lines.push(format!("- {}", parts.join(" — ")));
    }
    lines.join("\n")
}

/// Where harvest outputs land.
#[derive(Debug, Clone)]
pub struct HarvestPaths {
    /// Site-facing dumps (`<ORCID>.csv`, `author_latest.md`, `compare/`).
    pub out_dir: PathBuf,
    /// Holds `master.csv`.
    pub data_dir: PathBuf,
}

impl Default for HarvestPaths {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("site/public/data"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl HarvestPaths {
    pub fn master(&self) -> PathBuf {
        self.data_dir.join("master.csv")
    }

    pub fn compare_dir(&self) -> PathBuf {
        self.out_dir.join("compare")
    }

    /// Write `<ORCID>.csv` and `<ORCID>.md`, plus the `author_latest` aliases when `latest`.
    pub fn write_author(&self, orcid: &str, rows: &[HarvestRow], latest: bool) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.out_dir)?;
        let md = render_markdown(orcid, rows);

        write_csv(rows, &self.out_dir.join(format!("{}.csv", orcid)))?;
        std::fs::write(self.out_dir.join(format!("{}.md", orcid)), &md)?;
        if latest {
            write_csv(rows, &self.out_dir.join("author_latest.csv"))?;
            std::fs::write(self.out_dir.join("author_latest.md"), &md)?;
        }
        Ok(())
    }

    /// Append rows to the master CSV and re-deduplicate it.
    pub fn merge_master(&self, rows: &[HarvestRow]) -> Result<Vec<HarvestRow>, CoreError> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.master();
        let mut all = read_csv(&path)?;
        all.extend_from_slice(rows);
        let merged = dedupe_rows(all);
        write_csv(&merged, &path)?;
        tracing::info!(path = %path.display(), rows = merged.len(), "master CSV updated");
        Ok(merged)
    }

    /// Write `compare/matrix.csv` and `compare/summary.json`.
    pub fn write_comparison(&self, summary: &ComparisonSummary) -> Result<(), CoreError> {
        let dir = self.compare_dir();
        std::fs::create_dir_all(&dir)?;

        let mut writer = csv::Writer::from_path(dir.join("matrix.csv"))?;
        for record in summary.matrix_records() {
            writer.write_record(&record)?;
        }
        writer.flush()?;

        let json = serde_json::to_string_pretty(summary).map_err(std::io::Error::other)?;
        std::fs::write(dir.join("summary.json"), json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub orcid_id: String,
    pub total: usize,
    pub by_year: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
}

/// Per-author publication counts across the compared ORCIDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSummary {
    /// The most recent known years, ascending.
    pub years: Vec<String>,
    /// Authors in order of first appearance.
    pub authors: Vec<AuthorSummary>,
}

impl ComparisonSummary {
    pub fn build(rows: &[HarvestRow]) -> Self {
        let mut authors: Vec<AuthorSummary> = Vec::new();
        for r in rows {
            let idx = match authors.iter().position(|a| a.orcid_id == r.orcid_id) {
                Some(i) => i,
                None => {
                    authors.push(AuthorSummary {
                        orcid_id: r.orcid_id.clone(),
                        ..Default::default()
                    });
                    authors.len() - 1
                }
            };
            let agg = &mut authors[idx];
            let year = if r.year.is_empty() { "n.d." } else { r.year.as_str() };
            agg.total += 1;
            *agg.by_year.entry(year.to_string()).or_default() += 1;
            *agg.by_type.entry(r.kind.clone()).or_default() += 1;
        }

        let known: std::collections::BTreeSet<&String> = authors
            .iter()
            .flat_map(|a| a.by_year.keys())
            .filter(|y| y.as_str() != "n.d.")
            .collect();
        let skip = known.len().saturating_sub(MATRIX_YEARS);
        let years = known.into_iter().skip(skip).cloned().collect();

        Self { years, authors }
    }

    /// Header plus one record per author: `orcid_id, total, <year counts...>`.
    pub fn matrix_records(&self) -> Vec<Vec<String>> {
        let mut header = vec!["orcid_id".to_string(), "total".to_string()];
        header.extend(self.years.iter().cloned());

        let mut records = vec![header];
        for a in &self.authors {
            let mut record = vec![a.orcid_id.clone(), a.total.to_string()];
            record.extend(
                self.years
                    .iter()
                    .map(|y| a.by_year.get(y).copied().unwrap_or(0).to_string()),
            );
            records.push(record);
        }
        records
    }
}
