//! Regional supply/demand mismatch scoring for expansion planning.
//!
//! For every cell touched by the region's live facilities or by search demand,
//! the scorer combines partial-year capacity and booked nights per site type
//! with destination search volume. Searchers who did not pick a site type are
//! spread over the types in proportion to the searchers who did, and each
//! type's shortfall against capacity becomes a mismatch ratio.

use super::capacity::{partial_year_capacity, TypedCapacity};
use super::domain::{
    AnalysisWindow, AnalyticsError, BookingCategory, Facility, SearchRecord, SiteType, Transaction,
};
use super::interval::inclusive_overlap_days;
use super::occupancy::occupancy_rate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;
use tracing::{debug, warn};

/// Mismatch reported when a type has demand but no supply at all.
pub const UNBOUNDED_MISMATCH: f64 = 10.0;

/// A value per site type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeSplit {
    pub rv: f64,
    pub tent: f64,
    pub structure: f64,
}

impl TypeSplit {
    pub fn get(&self, site_type: SiteType) -> f64 {
        match site_type {
            SiteType::Rv => self.rv,
            SiteType::Tent => self.tent,
            SiteType::Structure => self.structure,
        }
    }

    pub fn total(&self) -> f64 {
        self.rv + self.tent + self.structure
    }

    /// Booked nights attributed to site types by booking category. Tent-or-RV
    /// stays split evenly; anything unclassified lands on tent.
    pub fn from_booking(category: BookingCategory, nights: f64) -> Self {
        match category {
            BookingCategory::RvOnly => Self {
                rv: nights,
                ..Self::default()
            },
            BookingCategory::Structure => Self {
                structure: nights,
                ..Self::default()
            },
            BookingCategory::TentOrRv => Self {
                rv: nights / 2.0,
                tent: nights / 2.0,
                structure: 0.0,
            },
            BookingCategory::Unspecified => Self {
                tent: nights,
                ..Self::default()
            },
        }
    }
}

impl AddAssign for TypeSplit {
    fn add_assign(&mut self, other: Self) {
        self.rv += other.rv;
        self.tent += other.tent;
        self.structure += other.structure;
    }
}

/// Result of spreading general searchers over the classified types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Redistribution {
    /// Total minus classified searchers. Negative when the classified counts
    /// exceed the reported total; kept as-is.
    pub general_searchers: f64,
    pub sum_of_specified: f64,
    pub adjusted: TypeSplit,
}

pub fn redistribute_general_demand(total_searchers: f64, specified: TypeSplit) -> Redistribution {
    let sum_of_specified = specified.total();
    let general_searchers = total_searchers - sum_of_specified;

    let adjusted = if sum_of_specified > 0.0 {
        TypeSplit {
            rv: specified.rv + general_searchers * (specified.rv / sum_of_specified),
            tent: specified.tent + general_searchers * (specified.tent / sum_of_specified),
            structure: specified.structure
                + general_searchers * (specified.structure / sum_of_specified),
        }
    } else {
        specified
    };

    Redistribution {
        general_searchers,
        sum_of_specified,
        adjusted,
    }
}

/// Relative shortfall of `supply` against `demand`.
pub fn mismatch_ratio(demand: f64, supply: f64) -> f64 {
    if demand <= supply {
        0.0
    } else if supply > 0.0 {
        (demand - supply) / supply
    } else {
        UNBOUNDED_MISMATCH
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeMetrics {
    pub capacity: i64,
    pub used_nights: f64,
    pub searchers: f64,
    pub adjusted_demand: f64,
    pub mismatch_ratio: f64,
}

impl TypeMetrics {
    pub fn unfilled_demand(&self) -> f64 {
        (self.adjusted_demand - self.capacity as f64).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellExpansion {
    pub cell_id: String,
    pub partial_capacity: i64,
    pub used_site_nights: i64,
    pub occupancy_rate: f64,
    pub searchers: f64,
    pub general_searchers: f64,
    pub sum_of_specified: f64,
    pub rv: TypeMetrics,
    pub tent: TypeMetrics,
    pub structure: TypeMetrics,
    pub max_mismatch_ratio: f64,
    /// Occupancy times total searchers; only meaningful for ranking.
    pub priority_score: f64,
}

impl CellExpansion {
    pub fn site_type(&self, site_type: SiteType) -> &TypeMetrics {
        match site_type {
            SiteType::Rv => &self.rv,
            SiteType::Tent => &self.tent,
            SiteType::Structure => &self.structure,
        }
    }

    pub fn unfilled_site_nights(&self) -> f64 {
        SiteType::ordered()
            .into_iter()
            .map(|site_type| self.site_type(site_type).unfilled_demand())
            .sum()
    }
}

/// Score used to order cells in a shortlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionRanking {
    Priority,
    Mismatch,
}

impl ExpansionRanking {
    fn score(self, cell: &CellExpansion) -> f64 {
        match self {
            ExpansionRanking::Priority => cell.priority_score,
            ExpansionRanking::Mismatch => cell.max_mismatch_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpansionSummary {
    pub total_capacity: i64,
    pub total_used: i64,
    pub overall_occupancy: f64,
    pub cells_with_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionTable {
    pub region: String,
    pub window: AnalysisWindow,
    /// Sorted by cell id.
    pub cells: Vec<CellExpansion>,
}

impl ExpansionTable {
    pub fn cell(&self, cell_id: &str) -> Option<&CellExpansion> {
        self.cells.iter().find(|cell| cell.cell_id == cell_id)
    }

    pub fn total_searchers(&self) -> f64 {
        self.cells.iter().map(|cell| cell.searchers).sum()
    }

    pub fn summary(&self) -> ExpansionSummary {
        let total_capacity = self.cells.iter().map(|cell| cell.partial_capacity).sum();
        let total_used = self.cells.iter().map(|cell| cell.used_site_nights).sum();
        let cells_with_capacity = self
            .cells
            .iter()
            .filter(|cell| cell.partial_capacity > 0)
            .count();

        ExpansionSummary {
            total_capacity,
            total_used,
            overall_occupancy: occupancy_rate(total_used as f64, total_capacity as f64),
            cells_with_capacity,
        }
    }

    pub fn with_min_searchers(&self, threshold: f64) -> Vec<&CellExpansion> {
        self.cells
            .iter()
            .filter(|cell| cell.searchers >= threshold)
            .collect()
    }

    /// Cells with at least `min_searchers`, highest score first, ties by cell id.
    pub fn shortlist(
        &self,
        ranking: ExpansionRanking,
        min_searchers: f64,
        limit: usize,
    ) -> Vec<&CellExpansion> {
        let mut cells = self.with_min_searchers(min_searchers);
        cells.sort_by(|a, b| {
            ranking
                .score(b)
                .total_cmp(&ranking.score(a))
                .then_with(|| a.cell_id.cmp(&b.cell_id))
        });
        cells.truncate(limit);
        cells
    }
}

#[derive(Debug, Default)]
struct CellAccumulator {
    capacity: TypedCapacity,
    used: i64,
    used_by_type: TypeSplit,
    searchers: f64,
    specified: TypeSplit,
}

pub fn compute_expansion(
    facilities: &[Facility],
    transactions: &[Transaction],
    searches: &[SearchRecord],
    region: &str,
    window: &AnalysisWindow,
) -> Result<ExpansionTable, AnalyticsError> {
    if region.trim().is_empty() {
        return Err(AnalyticsError::EmptyRegion);
    }

    let mut cells: BTreeMap<&str, CellAccumulator> = BTreeMap::new();
    let mut facility_cells: HashMap<&str, &str> = HashMap::new();

    for facility in facilities
        .iter()
        .filter(|facility| facility.is_live() && facility.in_region(region))
    {
        facility_cells.insert(facility.facility_id.as_str(), facility.cell_id.as_str());
        cells.entry(facility.cell_id.as_str()).or_default().capacity +=
            partial_year_capacity(facility, window);
    }

    for transaction in transactions.iter().filter(|transaction| !transaction.canceled) {
        let Some(&cell_id) = facility_cells.get(transaction.facility_id.as_str()) else {
            continue;
        };
        let last_night = transaction.check_out.and_then(|check_out| check_out.pred_opt());
        let booked = inclusive_overlap_days(transaction.check_in, last_night, window);

        let cell = cells.entry(cell_id).or_default();
        cell.used += booked;
        cell.used_by_type += TypeSplit::from_booking(transaction.category, booked as f64);
    }

    for search in searches {
        let cell = cells.entry(search.destination_cell.as_str()).or_default();
        cell.searchers += search.searchers as f64;
        cell.specified += TypeSplit {
            rv: search.facets.rv as f64,
            tent: search.facets.tent as f64,
            structure: search.facets.glamping as f64,
        };
    }

    let mut negative_general = 0usize;
    let cells: Vec<CellExpansion> = cells
        .into_iter()
        .map(|(cell_id, accumulator)| {
            let cell = score_cell(cell_id, accumulator);
            if cell.general_searchers < 0.0 {
                negative_general += 1;
            }
            cell
        })
        .collect();

    if negative_general > 0 {
        warn!(
            cells = negative_general,
            "classified searchers exceed reported totals; negative general demand redistributed"
        );
    }

    debug!(
        region,
        facilities = facility_cells.len(),
        cells = cells.len(),
        "computed expansion opportunities"
    );

    Ok(ExpansionTable {
        region: region.trim().to_string(),
        window: *window,
        cells,
    })
}

fn score_cell(cell_id: &str, accumulator: CellAccumulator) -> CellExpansion {
    let CellAccumulator {
        capacity,
        used,
        used_by_type,
        searchers,
        specified,
    } = accumulator;

    let occupancy = occupancy_rate(used as f64, capacity.total as f64);
    let redistribution = redistribute_general_demand(searchers, specified);

    let metrics = |site_type: SiteType| {
        let supply = capacity.for_type(site_type);
        let demand = redistribution.adjusted.get(site_type);
        TypeMetrics {
            capacity: supply,
            used_nights: used_by_type.get(site_type),
            searchers: specified.get(site_type),
            adjusted_demand: demand,
            mismatch_ratio: mismatch_ratio(demand, supply as f64),
        }
    };

    let rv = metrics(SiteType::Rv);
    let tent = metrics(SiteType::Tent);
    let structure = metrics(SiteType::Structure);
    let max_mismatch_ratio = rv
        .mismatch_ratio
        .max(tent.mismatch_ratio)
        .max(structure.mismatch_ratio);

    CellExpansion {
        cell_id: cell_id.to_string(),
        partial_capacity: capacity.total,
        used_site_nights: used,
        occupancy_rate: occupancy,
        searchers,
        general_searchers: redistribution.general_searchers,
        sum_of_specified: redistribution.sum_of_specified,
        rv,
        tent,
        structure,
        max_mismatch_ratio,
        priority_score: occupancy * searchers,
    }
}
