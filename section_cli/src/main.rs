//! # section-cli
//!
//! Command-line lookup and search over the steel section catalogue.
//! Results go to stdout as pretty JSON; logs and errors go to stderr.
//!
//! ```bash
//! section-cli show 457x191x67
//! section-cli show 305x305x137 --type UC
//! section-cli --region US list W --limit 10
//! section-cli search UB mass_per_metre__gt=100 h__lte=700
//! section-cli types
//! section-cli export UB --out ub.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use section_core::store::export_table;
use section_core::{Catalogue, CatalogueConfig, CatalogueError, CatalogueResult, Region, SectionType};

#[derive(Parser, Debug)]
#[command(name = "section-cli")]
#[command(about = "Steel section catalogue lookup and search", long_about = None)]
struct Args {
    /// Region to query (UK, EU, US); defaults to the configured region
    #[arg(short, long, global = true)]
    region: Option<Region>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show one section; the type is detected when not given
    Show {
        designation: String,
        #[arg(short = 't', long = "type")]
        section_type: Option<SectionType>,
    },
    /// List designations of a section type in catalogue order
    List {
        section_type: SectionType,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Section types with data in the region
    Types,
    /// Search a section type with field__op=value criteria (op: eq, ne, gt, lt, gte, lte)
    Search {
        section_type: SectionType,
        criteria: Vec<String>,
    },
    /// Write a section type's table to a JSON file
    Export {
        section_type: SectionType,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Convert the region's JSON tables into a SQLite database
    #[cfg(feature = "sqlite")]
    BuildSqlite {
        /// Database path (default: <data_root>/<REGION>_sections.sqlite3)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Replace an existing database
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'static str,
    message: String,
    details: &'a CatalogueError,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let report = ErrorReport {
                error: err.error_code(),
                message: err.to_string(),
                details: &err,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> CatalogueResult<String> {
    let mut config = CatalogueConfig::load(args.config.as_deref())?;
    if let Some(root) = args.data_root {
        config.data_root = root;
    }
    let region = args.region.unwrap_or(config.default_region);
    let catalogue = Catalogue::open(config)?;
    tracing::debug!(%region, data_root = %catalogue.config().data_root.display(), "catalogue opened");

    match args.command {
        Commands::Show {
            designation,
            section_type,
        } => {
            let section = catalogue.create_section(region, &designation, section_type)?;
            to_json(&section)
        }
        Commands::List { section_type, limit } => {
            let mut designations = catalogue.list_sections(region, section_type)?;
            if let Some(limit) = limit {
                designations.truncate(limit);
            }
            to_json(&designations)
        }
        Commands::Types => {
            let types: Vec<TypeSummary> = catalogue
                .get_available_types(region)?
                .into_iter()
                .map(|t| TypeSummary {
                    tag: t.tag(),
                    name: t.display_name(),
                })
                .collect();
            to_json(&types)
        }
        Commands::Search { section_type, criteria } => {
            let pairs = criteria
                .iter()
                .map(|c| parse_criterion(c))
                .collect::<CatalogueResult<Vec<_>>>()?;
            let results = catalogue.search_criteria(region, section_type, pairs)?;
            let records: Vec<_> = results.iter().map(|(_, record)| record.as_ref()).collect();
            to_json(&records)
        }
        Commands::Export { section_type, out } => {
            let table = catalogue.database(region).table(section_type)?;
            let written = export_table(&table, &out)?;
            to_json(&serde_json::json!({
                "region": region,
                "section_type": section_type,
                "records": written,
                "path": out,
            }))
        }
        #[cfg(feature = "sqlite")]
        Commands::BuildSqlite { out, force } => {
            let root = catalogue.config().data_root.clone();
            let db_path = out.unwrap_or_else(|| section_core::store::SqliteSource::new(&root).database_path(region));
            let report = section_core::store::build_sqlite_database(&root, region, &db_path, force)?;
            to_json(&report)
        }
    }
}

#[derive(Serialize)]
struct TypeSummary {
    tag: &'static str,
    name: &'static str,
}

/// `field__op=value` into its key and value halves
fn parse_criterion(raw: &str) -> CatalogueResult<(String, String)> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| CatalogueError::invalid_predicate(raw, "", "expected field__op=value"))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CatalogueResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CatalogueError::SerializationError { reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_search_args() {
        let args = Args::try_parse_from([
            "section-cli",
            "--region",
            "eu",
            "search",
            "IPE",
            "mass_per_metre__gt=40",
        ])
        .unwrap();
        assert_eq!(args.region, Some(Region::EU));
        match args.command {
            Commands::Search { section_type, criteria } => {
                assert_eq!(section_type, SectionType::IPE);
                assert_eq!(criteria, vec!["mass_per_metre__gt=40"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_criterion() {
        assert_eq!(
            parse_criterion("h__lte = 700").unwrap(),
            ("h__lte".to_string(), "700".to_string())
        );
        assert!(parse_criterion("h__lte").is_err());
    }

    #[test]
    fn test_run_against_bundled_data() {
        let args = Args::try_parse_from(["section-cli", "show", "457x191x67", "--type", "UB"]).unwrap();
        let output = run(args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["family"], "universal");
        assert_eq!(value["mass_per_metre"], 67.1);
    }
}
