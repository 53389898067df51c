use std::io::Write;
use std::path::Path;

use cartograph_core::Person;
use cartograph_core::harvest::{ComparisonSummary, HarvestRow};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the result of harvesting one ORCID iD.
pub fn print_harvest(
    w: &mut dyn Write,
    orcid: &str,
    rows: &[HarvestRow],
    out_dir: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    let with_doi = rows.iter().filter(|r| !r.doi.is_empty()).count();
    if color.enabled() {
        writeln!(
            w,
            "{} {}: {} works ({} with DOI)",
            "Harvested".green().bold(),
            orcid.bold(),
            rows.len(),
            with_doi
        )?;
        writeln!(w, "  {}", format!("written to {}", out_dir.display()).dimmed())?;
    } else {
        writeln!(
            w,
            "Harvested {}: {} works ({} with DOI)",
            orcid,
            rows.len(),
            with_doi
        )?;
        writeln!(w, "  written to {}", out_dir.display())?;
    }
    Ok(())
}

pub fn print_master(w: &mut dyn Write, path: &Path, total: usize, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {} ({} rows)", "Master:".bold(), path.display(), total)
    } else {
        writeln!(w, "Master: {} ({} rows)", path.display(), total)
    }
}

/// Print the per-author totals of a comparison.
pub fn print_comparison(
    w: &mut dyn Write,
    summary: &ComparisonSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Comparison".bold().underline())?;
    } else {
        writeln!(w, "Comparison")?;
    }
    if let (Some(first), Some(last)) = (summary.years.first(), summary.years.last()) {
        writeln!(w, "Years {}–{}", first, last)?;
    }
    for a in &summary.authors {
        let in_range: usize = summary
            .years
            .iter()
            .filter_map(|y| a.by_year.get(y))
            .sum();
        writeln!(w, "  {:<20} total {:>4}  in range {:>4}", a.orcid_id, a.total, in_range)?;
    }
    Ok(())
}

/// One line per resolved person: name, identity source and confidence.
pub fn print_people(w: &mut dyn Write, people: &[Person], color: ColorMode) -> std::io::Result<()> {
    for p in people {
        let id = p
            .orcid
            .as_deref()
            .or(p.openalex.as_deref())
            .unwrap_or("-");
        if color.enabled() {
            let source = match p.confidence {
                c if c >= 0.9 => p.source.to_string().green().to_string(),
                c if c >= 0.8 => p.source.to_string().yellow().to_string(),
                _ => p.source.to_string().red().to_string(),
            };
            writeln!(w, "{} [{} {:.2}] {}", p.name.bold(), source, p.confidence, id.dimmed())?;
        } else {
            writeln!(w, "{} [{} {:.2}] {}", p.name, p.source, p.confidence, id)?;
        }
    }
    Ok(())
}

/// Report malformed ORCID iDs in a catalog. Returns whether the catalog is valid.
pub fn print_validation(
    w: &mut dyn Write,
    checked: usize,
    invalid: &[(String, String)],
    color: ColorMode,
) -> std::io::Result<bool> {
    for (name, orcid) in invalid {
        if color.enabled() {
            writeln!(w, "{} {}: {}", "Invalid ORCID for".red(), name, orcid.red())?;
        } else {
            writeln!(w, "Invalid ORCID for {}: {}", name, orcid)?;
        }
    }
    if invalid.is_empty() {
        writeln!(w, "Checked {} scholars", checked)?;
    }
    Ok(invalid.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<bool>) -> (String, bool) {
        let mut buf = Vec::new();
        let ok = f(&mut buf).unwrap();
        (String::from_utf8(buf).unwrap(), ok)
    }

    #[test]
    fn validation_lists_bad_ids() {
        let bad = vec![("Someone".to_string(), "1234".to_string())];
        let (out, ok) = render(|w| print_validation(w, 3, &bad, ColorMode(false)));
        assert!(!ok);
        assert_eq!(out, "Invalid ORCID for Someone: 1234\n");

        let (out, ok) = render(|w| print_validation(w, 3, &[], ColorMode(false)));
        assert!(ok);
        assert_eq!(out, "Checked 3 scholars\n");
    }

    #[test]
    fn people_plain_output() {
        let mut buf = Vec::new();
        let mut p = Person::literal("Nobody");
        print_people(&mut buf, std::slice::from_ref(&p), ColorMode(false)).unwrap();
        p.orcid = Some("0000-0003-4864-6495".into());
        print_people(&mut buf, &[p], ColorMode(false)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Nobody [string 0.50] -\nNobody [string 0.50] 0000-0003-4864-6495\n"
        );
    }
}
