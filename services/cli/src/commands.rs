use allcamp_analytics::analytics::{
    benchmark, compute_expansion, compute_occupancy, compute_overview, estimate_lost_revenue,
    regional_activity, summarize_searches, AnalysisWindow, CategorySelector, CellExpansion,
    ExpansionRanking, ExpansionSummary, ExpansionTable, OccupancyQuery,
};
use allcamp_analytics::config::AnalysisSettings;
use allcamp_analytics::error::AppError;
use allcamp_analytics::ingest::Dataset;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

/// Loaded exports plus the analysis year and region they are read against.
pub(crate) struct Session {
    dataset: Dataset,
    settings: AnalysisSettings,
}

impl Session {
    pub(crate) fn new(dataset: Dataset, settings: AnalysisSettings) -> Self {
        Self { dataset, settings }
    }

    fn annual_window(&self) -> Result<AnalysisWindow, AppError> {
        Ok(self.settings.annual_window()?)
    }

    fn expansion(&self) -> Result<ExpansionTable, AppError> {
        let window = self.annual_window()?;
        Ok(compute_expansion(
            &self.dataset.facilities,
            &self.dataset.transactions,
            &self.dataset.searches,
            &self.settings.region,
            &window,
        )?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CategoryArg {
    All,
    TentOrRv,
    RvOnly,
    Structure,
}

impl From<CategoryArg> for CategorySelector {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::All => CategorySelector::All,
            CategoryArg::TentOrRv => CategorySelector::TentOrRv,
            CategoryArg::RvOnly => CategorySelector::RvOnly,
            CategoryArg::Structure => CategorySelector::Structure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RankArg {
    /// Occupancy times searchers
    Priority,
    /// Largest demand-to-supply ratio across site types
    Mismatch,
}

impl From<RankArg> for ExpansionRanking {
    fn from(value: RankArg) -> Self {
        match value {
            RankArg::Priority => ExpansionRanking::Priority,
            RankArg::Mismatch => ExpansionRanking::Mismatch,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct OccupancyArgs {
    /// Calendar month (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub(crate) month: u32,
    /// Site category to measure
    #[arg(long, value_enum, default_value_t = CategoryArg::All)]
    pub(crate) category: CategoryArg,
    /// Count only Friday, Saturday, and Sunday nights
    #[arg(long)]
    pub(crate) weekend_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExpansionArgs {
    /// Only list the N highest-ranked cells
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Drop cells with fewer total searchers than this
    #[arg(long, default_value_t = 0.0)]
    pub(crate) min_searchers: f64,
    /// Score used to order the cells
    #[arg(long, value_enum, default_value_t = RankArg::Priority)]
    pub(crate) rank_by: RankArg,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Truncate each ranked list to N entries
    #[arg(long)]
    pub(crate) top: Option<usize>,
}

#[derive(Serialize)]
struct ExpansionReport<'a> {
    region: &'a str,
    window: AnalysisWindow,
    summary: ExpansionSummary,
    cells: Vec<&'a CellExpansion>,
}

pub(crate) fn run_occupancy(session: &Session, args: OccupancyArgs) -> Result<(), AppError> {
    let query = OccupancyQuery::new(
        session.settings.year,
        args.month,
        args.category.into(),
        args.weekend_only,
    );
    let table = compute_occupancy(
        &session.dataset.facilities,
        &session.dataset.transactions,
        query,
    )?;
    info!(
        month = args.month,
        cells = table.cells.len(),
        capacity = table.total_capacity(),
        used = table.total_used(),
        "occupancy computed"
    );
    emit(&table)
}

pub(crate) fn run_expansion(session: &Session, args: ExpansionArgs) -> Result<(), AppError> {
    let table = session.expansion()?;

    let cells = table.shortlist(
        args.rank_by.into(),
        args.min_searchers,
        args.top.unwrap_or(usize::MAX),
    );

    info!(
        region = %table.region,
        rank_by = ?args.rank_by,
        cells = cells.len(),
        "expansion computed"
    );
    emit(&ExpansionReport {
        region: &table.region,
        window: table.window,
        summary: table.summary(),
        cells,
    })
}

pub(crate) fn run_lost_revenue(session: &Session) -> Result<(), AppError> {
    let window = session.annual_window()?;
    let table = session.expansion()?;
    let activity = regional_activity(
        &session.dataset.facilities,
        &session.dataset.transactions,
        &session.settings.region,
        &window,
    )?;
    emit(&estimate_lost_revenue(&table, &activity))
}

pub(crate) fn run_benchmark(session: &Session) -> Result<(), AppError> {
    let window = session.annual_window()?;
    let table = session.expansion()?;
    emit(&benchmark(&session.dataset.transactions, &window, &table))
}

pub(crate) fn run_overview(session: &Session) -> Result<(), AppError> {
    let window = session.annual_window()?;
    emit(&compute_overview(
        &session.dataset.facilities,
        &session.dataset.transactions,
        &window,
    ))
}

pub(crate) fn run_search(session: &Session, args: SearchArgs) -> Result<(), AppError> {
    let mut summary = summarize_searches(&session.dataset.searches);
    if let Some(top) = args.top {
        summary.truncate(top);
    }
    emit(&summary)
}

fn emit<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_arguments_map_to_engine_selectors() {
        assert_eq!(
            CategorySelector::from(CategoryArg::TentOrRv),
            CategorySelector::TentOrRv
        );
        assert_eq!(
            CategoryArg::from_str("rv-only", true).expect("known value"),
            CategoryArg::RvOnly
        );
        assert_eq!(
            ExpansionRanking::from(RankArg::from_str("mismatch", true).expect("known value")),
            ExpansionRanking::Mismatch
        );
    }
}
