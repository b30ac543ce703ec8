use crate::commands::{
    run_benchmark, run_expansion, run_lost_revenue, run_occupancy, run_overview, run_search,
    ExpansionArgs, OccupancyArgs, SearchArgs, Session,
};
use allcamp_analytics::config::{AnalysisSettings, AppConfig};
use allcamp_analytics::error::AppError;
use allcamp_analytics::ingest::Dataset;
use allcamp_analytics::telemetry;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "allcamp-analytics",
    about = "Occupancy, expansion, and revenue analytics over Allcamp exports",
    version
)]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Directory holding campgrounds.csv, transactions.csv, and searches.csv
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Override the configured analysis year
    #[arg(long, global = true)]
    pub(crate) year: Option<i32>,
    /// Override the configured expansion region
    #[arg(long, global = true)]
    pub(crate) region: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Monthly occupancy by cell
    Occupancy(OccupancyArgs),
    /// Regional supply/demand mismatch and expansion priority by cell
    Expansion(ExpansionArgs),
    /// Revenue lost to unmet regional demand
    LostRevenue,
    /// Market-size benchmark at a flat occupancy assumption
    Benchmark,
    /// Headline facility, booking, and revenue figures for the year
    Overview,
    /// Search demand by destination, origin, channel, and facet
    Search(SearchArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let GlobalArgs {
        data_dir,
        year,
        region,
    } = cli.global;
    let settings = AnalysisSettings::new(
        year.unwrap_or(config.analysis.year),
        region.unwrap_or(config.analysis.region),
    )?;
    let data_dir = data_dir.unwrap_or(config.data.dir);
    let dataset = Dataset::load(&data_dir)?;
    let session = Session::new(dataset, settings);

    match cli.command {
        Command::Occupancy(args) => run_occupancy(&session, args),
        Command::Expansion(args) => run_expansion(&session, args),
        Command::LostRevenue => run_lost_revenue(&session),
        Command::Benchmark => run_benchmark(&session),
        Command::Overview => run_overview(&session),
        Command::Search(args) => run_search(&session, args),
    }
}
