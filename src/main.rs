mod output;

use analytics::{Choice, Selection, ValueRange};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configuration::{init_logging, load_config, Config, OutputFormat};
use core_types::{AggregationMethod, BucketFilter, GroupKey, Measure, Period, Quarter, SortOrder};
use dashboards::{
    measure_chart, screener_dashboard, sector_dashboard, symbol_dashboard, DashboardError, MeasureQuery,
    SectorQuery, SymbolQuery,
};
use dataset::{load_csv, Dataset};
use std::path::PathBuf;
use tracing::{info, warn};

/// The main entry point for the fundamentals explorer.
fn main() -> anyhow::Result<()> {
    // Load FUNDAMENTALS__* overrides from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = cli.data {
        config.dataset.path = path;
    }
    if cli.json {
        config.display.format = OutputFormat::Json;
    }

    // The guard flushes the log file on drop, so it lives until main returns.
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    let dataset = load_csv(&config.dataset.path)
        .with_context(|| format!("Failed to load dataset from {}", config.dataset.path.display()))?;
    if !dataset.row_errors().is_empty() {
        warn!(skipped = dataset.row_errors().len(), "Some rows could not be read and were skipped.");
    }

    // Execute the appropriate command
    match cli.command {
        Commands::Options => handle_options(&dataset, &config),
        Commands::Sector(args) => handle_sector(args, &dataset, &config),
        Commands::Symbol(args) => handle_symbol(args, &dataset, &config),
        Commands::Screen(args) => handle_screen(args, &dataset, &config),
        Commands::Aggregate(args) => handle_aggregate(args, &dataset, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Explore listed companies' quarterly fundamentals by sector, symbol or screen.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// The fundamentals CSV to read, overriding the configured path.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sectors, years and quarters available for selection.
    Options,
    /// Compare the companies of one sector.
    Sector(SectorArgs),
    /// Show one company's history for a quarter.
    Symbol(SymbolArgs),
    /// Screen a period by price, book value, EPS and DPS.
    Screen(ScreenArgs),
    /// Aggregate any measure over a selection.
    Aggregate(AggregateArgs),
}

#[derive(Parser)]
struct SectorArgs {
    #[arg(long)]
    sector: String,

    /// Defaults to the latest year in the dataset.
    #[arg(long)]
    year: Option<i32>,

    /// Defaults to the latest quarter in the dataset.
    #[arg(long)]
    quarter: Option<Quarter>,

    /// A single symbol, or "All".
    #[arg(long, default_value = "All")]
    symbol: String,
}

#[derive(Parser)]
struct SymbolArgs {
    #[arg(long)]
    symbol: String,

    /// Defaults to the quarter of the last row in the dataset.
    #[arg(long)]
    quarter: Option<Quarter>,
}

#[derive(Parser)]
struct ScreenArgs {
    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Parser)]
struct AggregateArgs {
    #[arg(long, value_enum)]
    measure: Measure,

    #[arg(long, value_enum)]
    by: Option<GroupKey>,

    /// Defaults to sum for balance figures and mean for everything else.
    #[arg(long, value_enum)]
    method: Option<AggregationMethod>,

    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    #[command(flatten)]
    filters: FilterArgs,
}

/// The selection controls shared by the screen and aggregate commands.
#[derive(Args)]
struct FilterArgs {
    /// Repeat to select several sectors.
    #[arg(long)]
    sector: Vec<String>,

    /// Repeat to select several symbols.
    #[arg(long)]
    symbol: Vec<String>,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    quarter: Option<Quarter>,

    /// Anything that is not a number leaves the bound open.
    #[arg(long, default_value = "All")]
    price_from: String,

    #[arg(long, default_value = "All")]
    price_to: String,

    #[arg(long, default_value = "All")]
    book_from: String,

    #[arg(long, default_value = "All")]
    book_to: String,

    #[arg(long, value_enum)]
    eps: Option<BucketFilter>,

    #[arg(long, value_enum)]
    dps: Option<BucketFilter>,
}

impl FilterArgs {
    fn selection(&self) -> Selection {
        let mut builder = Selection::builder()
            .price(ValueRange::parse(&self.price_from, &self.price_to))
            .book_value(ValueRange::parse(&self.book_from, &self.book_to))
            .eps(self.eps.unwrap_or_default())
            .dps(self.dps.unwrap_or_default());
        if !self.sector.is_empty() {
            builder = builder.sectors(self.sector.iter().cloned());
        }
        if !self.symbol.is_empty() {
            builder = builder.symbol_choice(Choice::Only(self.symbol.clone()));
        }
        if let Some(year) = self.year {
            builder = builder.year(year);
        }
        if let Some(quarter) = &self.quarter {
            builder = builder.quarter(quarter.clone());
        }
        builder.build()
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Reports an empty selection as a notice and passes every other error on.
fn or_no_data<T>(result: Result<T, DashboardError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_no_data() => {
            println!("{e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn latest_period(dataset: &Dataset) -> anyhow::Result<Period> {
    dataset
        .latest_period()
        .context("The dataset has no rows to take a default period from")
}

fn handle_options(dataset: &Dataset, config: &Config) -> anyhow::Result<()> {
    let catalog = dataset.catalog();
    output::render(&catalog, config.display.format, output::catalog_table)
}

fn handle_sector(args: SectorArgs, dataset: &Dataset, config: &Config) -> anyhow::Result<()> {
    // Only look up the latest period when a default is actually needed.
    let (year, quarter) = match (args.year, args.quarter) {
        (Some(year), Some(quarter)) => (year, quarter),
        (year, quarter) => {
            let latest = latest_period(dataset)?;
            (year.unwrap_or(latest.year), quarter.unwrap_or(latest.quarter))
        }
    };
    let query = SectorQuery {
        sector: args.sector,
        year: Some(year),
        quarter: Some(quarter),
        symbol: Choice::from_control(&args.symbol),
    };
    info!(sector = %query.sector, "Building sector dashboard.");

    let Some(dashboard) = or_no_data(sector_dashboard(dataset, &query, &config.display))? else {
        return Ok(());
    };
    output::render(&dashboard, config.display.format, output::sector_table)
}

fn handle_symbol(args: SymbolArgs, dataset: &Dataset, config: &Config) -> anyhow::Result<()> {
    let quarter = match args.quarter {
        Some(quarter) => quarter,
        None => latest_period(dataset)?.quarter,
    };
    let query = SymbolQuery {
        symbol: args.symbol,
        quarter,
    };

    let Some(dashboard) = or_no_data(symbol_dashboard(dataset, &query, &config.display))? else {
        return Ok(());
    };
    output::render(&dashboard, config.display.format, |d| {
        output::symbol_table(d, &config.display)
    })
}

fn handle_screen(args: ScreenArgs, dataset: &Dataset, config: &Config) -> anyhow::Result<()> {
    let listed = dataset.without_sectors(&config.dataset.excluded_sectors);
    let selection = args.filters.selection();

    let Some(dashboard) = or_no_data(screener_dashboard(&listed, &selection, &config.display))? else {
        return Ok(());
    };
    output::render(&dashboard, config.display.format, |d| {
        output::screener_table(d, &config.display)
    })
}

fn handle_aggregate(args: AggregateArgs, dataset: &Dataset, config: &Config) -> anyhow::Result<()> {
    let query = MeasureQuery {
        measure: args.measure,
        group_by: args.by.unwrap_or(GroupKey::Symbol),
        method: args.method,
        sort: args.sort.unwrap_or_default(),
    };
    let selection = args.filters.selection();

    let Some(chart) = or_no_data(measure_chart(dataset, &selection, &query, &config.display))? else {
        return Ok(());
    };
    output::render(&chart, config.display.format, output::chart_table)
}
