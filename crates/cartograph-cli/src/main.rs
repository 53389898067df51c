use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use cartograph_core::harvest::{self, ComparisonSummary, HarvestPaths, HarvestRow};
use cartograph_core::sources::Orcid;
use cartograph_core::text_utils::is_valid_orcid;
use cartograph_core::{Cartographer, Catalog, Config, GraphMode, YearWindow, build_client};

mod output;

use output::ColorMode;

/// Bibliography cartography: harvest ORCID records, resolve scholars, compile concept graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Comma-separated list of sources to disable (ORCID, OpenAlex, Crossref)
    #[arg(long, global = true, value_delimiter = ',')]
    disable_sources: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest every work of an ORCID iD into CSV and Markdown dumps
    Harvest {
        /// ORCID iD, e.g. 0000-0003-4864-6495
        orcid: String,

        /// Directory for per-author dumps
        #[arg(long, default_value = "site/public/data")]
        out_dir: PathBuf,

        /// Directory holding master.csv
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Harvest several ORCID iDs and write a comparison matrix
    Compare {
        /// Comma-separated ORCID iDs
        #[arg(value_delimiter = ',', required = true)]
        orcids: Vec<String>,

        /// Directory for per-author dumps and compare/
        #[arg(long, default_value = "site/public/data")]
        out_dir: PathBuf,

        /// Directory holding master.csv
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Check the scholar catalog for malformed ORCID iDs
    ValidateCatalog {
        /// Catalog path (defaults to the configured catalog)
        path: Option<PathBuf>,
    },

    /// Resolve names to identities
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Fetch deduplicated works for one name
    Works {
        name: String,

        /// Concepts to bias the Crossref search
        #[arg(long = "concept")]
        concepts: Vec<String>,

        /// Maximum number of works
        #[arg(long)]
        limit: Option<usize>,

        /// Earliest publication year
        #[arg(long)]
        since: Option<i32>,

        /// Latest publication year
        #[arg(long)]
        until: Option<i32>,
    },

    /// Compile a cartography graph from a prompt and print it as JSON
    Compile {
        prompt: String,

        /// concept_lineage, lineage or co_work
        #[arg(long, default_value = "concept_lineage")]
        mode: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = ColorMode(!cli.no_color);

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let mut config = Config::load();
    if !cli.disable_sources.is_empty() {
        config.disabled_sources = cli.disable_sources.clone();
    }

    match cli.command {
        Command::Harvest {
            orcid,
            out_dir,
            data_dir,
            timeout,
        } => {
            let paths = HarvestPaths { out_dir, data_dir };
            harvest_one(&config, &orcid, &paths, timeout, color).await
        }
        Command::Compare {
            orcids,
            out_dir,
            data_dir,
            timeout,
        } => {
            let paths = HarvestPaths { out_dir, data_dir };
            compare(&config, &orcids, &paths, timeout, color).await
        }
        Command::ValidateCatalog { path } => {
            validate_catalog(&path.unwrap_or_else(|| config.catalog_path.clone()), color)
        }
        Command::Resolve { names, json } => {
            let pipeline = Cartographer::new(&config)?;
            let people = pipeline.resolve(&names).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&people)?);
            } else {
                output::print_people(&mut std::io::stdout(), &people, color)?;
            }
            Ok(())
        }
        Command::Works {
            name,
            concepts,
            limit,
            since,
            until,
        } => {
            let pipeline = Cartographer::new(&config)?;
            let people = pipeline.resolve(std::slice::from_ref(&name)).await;
            let window = YearWindow {
                min: since,
                max: until,
            };
            let limit = limit.unwrap_or(pipeline.works_limit());
            let works = match people.first() {
                Some(person) => pipeline.fetch_for(person, &concepts, window, limit).await,
                None => vec![],
            };
            println!("{}", serde_json::to_string_pretty(&works)?);
            Ok(())
        }
        Command::Compile { prompt, mode } => {
            let pipeline = Cartographer::new(&config)?;
            let graph = pipeline.compile(&prompt, GraphMode::from_name(&mode)).await;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
    }
}

async fn fetch_rows(
    orcid: &Orcid,
    client: &reqwest::Client,
    id: &str,
    timeout: u64,
) -> anyhow::Result<Vec<HarvestRow>> {
    if !is_valid_orcid(id) {
        anyhow::bail!("Not a valid ORCID iD: {}", id);
    }
    let rows = harvest::harvest_orcid(orcid, id, client, Duration::from_secs(timeout)).await?;
    tracing::info!(orcid = id, works = rows.len(), "harvested");
    Ok(rows)
}

async fn harvest_one(
    config: &Config,
    id: &str,
    paths: &HarvestPaths,
    timeout: u64,
    color: ColorMode,
) -> anyhow::Result<()> {
    let client = build_client()?;
    let orcid = Orcid::new(&config.orcid_base);
    let rows = fetch_rows(&orcid, &client, id, timeout).await?;

    paths.write_author(id, &rows, true)?;
    let master = paths.merge_master(&rows)?;

    let mut out = std::io::stdout();
    output::print_harvest(&mut out, id, &rows, &paths.out_dir, color)?;
    output::print_master(&mut out, &paths.master(), master.len(), color)?;
    Ok(())
}

async fn compare(
    config: &Config,
    ids: &[String],
    paths: &HarvestPaths,
    timeout: u64,
    color: ColorMode,
) -> anyhow::Result<()> {
    let ids: Vec<&str> = ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if ids.is_empty() {
        anyhow::bail!("No ORCID iDs given");
    }

    let client = build_client()?;
    let orcid = Orcid::new(&config.orcid_base);
    let mut out = std::io::stdout();
    let mut harvested = Vec::new();
    for id in ids {
        let rows = fetch_rows(&orcid, &client, id, timeout).await?;
        paths.write_author(id, &rows, false)?;
        output::print_harvest(&mut out, id, &rows, &paths.out_dir, color)?;
        harvested.extend(rows);
    }

    let master = paths.merge_master(&harvested)?;
    let summary = ComparisonSummary::build(&master);
    paths.write_comparison(&summary)?;

    output::print_master(&mut out, &paths.master(), master.len(), color)?;
    output::print_comparison(&mut out, &summary, color)?;
    out.flush()?;
    Ok(())
}

fn validate_catalog(path: &std::path::Path, color: ColorMode) -> anyhow::Result<()> {
    let catalog = Catalog::load(path)?;
    let invalid = catalog.invalid_orcids();
    let ok = output::print_validation(&mut std::io::stdout(), catalog.len(), &invalid, color)?;
    if !ok {
        anyhow::bail!("{} invalid ORCID iD(s) in {}", invalid.len(), path.display());
    }
    Ok(())
}
