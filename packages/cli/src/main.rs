#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Fix-It map toolchain.
//!
//! `serve` starts the API server; `query` loads the datasets and runs a
//! single aggregation against them, printing the ranked clusters to
//! stdout.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fixit_map_aggregate::{aggregate, count_matching, max_report_count};
use fixit_map_aggregate_models::{DatePreset, DateRange, QueryParams};
use fixit_map_datastore::{DataStore, all_categories};
use fixit_map_server_models::DatasetSelector;

#[derive(Parser)]
#[command(name = "fixit_map_cli", about = "Fix-It map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Directory containing the category CSV exports
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Run one aggregation query and print the ranked clusters
    Query {
        /// Category identifier (e.g. "encampment", "`abandoned_vehicle`"),
        /// or "all" for the flat union of the service-request datasets
        category: String,
        /// Date-range preset (e.g. "`LAST_30_DAYS`", "`ALL_DATES`").
        /// Overrides --from/--to.
        #[arg(long)]
        preset: Option<String>,
        /// Window start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Exact-match neighborhood filter (case-insensitive)
        #[arg(long)]
        neighborhood: Option<String>,
        /// Coordinate rounding precision in decimal digits (3 = a little
        /// smoothing, 2 = more)
        #[arg(long)]
        smoothing: Option<u32>,
        /// Maximum number of clusters to print
        #[arg(long)]
        limit: Option<usize>,
        /// Directory containing the category CSV exports
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// List all configured categories
    Categories,
    /// List the neighborhood labels present in a category's dataset
    Neighborhoods {
        /// Category identifier (e.g. "encampment"), or "all" for the
        /// union dataset
        category: String,
        /// Directory containing the category CSV exports
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { data_dir } => {
            actix_web::rt::System::new()
                .block_on(fixit_map_server::run_server(&data_dir))?;
        }
        Commands::Query {
            category,
            preset,
            from,
            to,
            neighborhood,
            smoothing,
            limit,
            data_dir,
        } => {
            run_query(
                &category,
                preset.as_deref(),
                from,
                to,
                neighborhood,
                smoothing,
                limit,
                &data_dir,
            )?;
        }
        Commands::Categories => {
            for spec in all_categories() {
                println!(
                    "{:<20} {:<18} color={:<14} neighborhoods={}",
                    spec.category, spec.name, spec.color, spec.has_neighborhood
                );
            }
        }
        Commands::Neighborhoods { category, data_dir } => {
            let selector = parse_selector(&category)?;
            let store = DataStore::load(&data_dir, &all_categories())?;
            let labels = match selector {
                DatasetSelector::All => store.combined_neighborhoods(),
                DatasetSelector::Category(category) => store.neighborhoods(category),
            };
            for neighborhood in labels {
                println!("{neighborhood}");
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_query(
    category: &str,
    preset: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    neighborhood: Option<String>,
    smoothing: Option<u32>,
    limit: Option<usize>,
    data_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let selector = parse_selector(category)?;
    let store = DataStore::load(data_dir, &all_categories())?;

    let last_date = store
        .last_date()
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let date_range = resolve_date_range(preset, from, to, last_date)?;

    let params = QueryParams {
        date_range,
        neighborhood,
        smoothing_precision: smoothing,
        limit,
    };

    let dataset = match selector {
        DatasetSelector::All => store.combined(),
        DatasetSelector::Category(category) => store.dataset(category),
    };
    let total = count_matching(dataset, &params.date_range, params.neighborhood.as_deref());
    let rows = aggregate(dataset, &params);
    let max = max_report_count(&rows);

    println!(
        "{selector}: {} clusters from {total} reports between {} and {} (max cluster {max})",
        rows.len(),
        params.date_range.start,
        params.date_range.end,
    );
    for row in &rows {
        println!(
            "{:>6}  ({:.6}, {:.6})  {}",
            row.report_count, row.latitude, row.longitude, row.location
        );
    }

    Ok(())
}

fn parse_selector(value: &str) -> Result<DatasetSelector, String> {
    value
        .to_uppercase()
        .parse::<DatasetSelector>()
        .map_err(|_| format!("Unknown category: {value}"))
}

fn resolve_date_range(
    preset: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    last_date: NaiveDate,
) -> Result<DateRange, String> {
    if let Some(preset) = preset {
        let preset = preset
            .to_uppercase()
            .parse::<DatePreset>()
            .map_err(|_| format!("Unknown preset: {preset}"))?;
        return Ok(preset.resolve(last_date));
    }

    Ok(match (from, to) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        (Some(start), None) => DateRange::new(start, last_date),
        (None, Some(end)) => DateRange::new(DatePreset::AllDates.resolve(last_date).start, end),
        (None, None) => DatePreset::Last30Days.resolve(last_date),
    })
}
