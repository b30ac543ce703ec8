use super::capacity::site_nights;
use super::domain::{AnalysisWindow, AnalyticsError, CategorySelector, Facility, Transaction};
use super::interval::{inclusive_overlap, qualifying_days};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Parameters of a monthly occupancy view.
///
/// The query is `Copy + Eq + Hash` so callers can key an external cache on it;
/// [`compute_occupancy`] itself never remembers anything between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OccupancyQuery {
    pub year: i32,
    pub month: u32,
    pub category: CategorySelector,
    pub weekend_only: bool,
}

impl OccupancyQuery {
    pub fn new(year: i32, month: u32, category: CategorySelector, weekend_only: bool) -> Self {
        Self {
            year,
            month,
            category,
            weekend_only,
        }
    }

    pub fn window(&self) -> Result<AnalysisWindow, AnalyticsError> {
        AnalysisWindow::for_month(self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellOccupancy {
    pub cell_id: String,
    pub capacity_site_nights: i64,
    pub used_site_nights: i64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyTable {
    pub query: OccupancyQuery,
    pub window: AnalysisWindow,
    /// Sorted by cell id.
    pub cells: Vec<CellOccupancy>,
}

impl OccupancyTable {
    pub fn cell(&self, cell_id: &str) -> Option<&CellOccupancy> {
        self.cells.iter().find(|cell| cell.cell_id == cell_id)
    }

    pub fn total_capacity(&self) -> i64 {
        self.cells.iter().map(|cell| cell.capacity_site_nights).sum()
    }

    pub fn total_used(&self) -> i64 {
        self.cells.iter().map(|cell| cell.used_site_nights).sum()
    }
}

/// Used over available site-nights, bounded to `[0, 1]`. Zero capacity gives 0
/// regardless of usage.
pub fn occupancy_rate(used: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        (used / capacity).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Default)]
struct CellTotals {
    capacity: i64,
    used: i64,
}

pub fn compute_occupancy(
    facilities: &[Facility],
    transactions: &[Transaction],
    query: OccupancyQuery,
) -> Result<OccupancyTable, AnalyticsError> {
    let window = query.window()?;
    let mut cells: BTreeMap<&str, CellTotals> = BTreeMap::new();

    for facility in facilities.iter().filter(|facility| facility.is_live()) {
        let capacity = site_nights(facility, &window, query.category, query.weekend_only);
        cells.entry(facility.cell_id.as_str()).or_default().capacity += capacity;
    }

    let bookings = transactions.iter().filter(|transaction| {
        !transaction.canceled
            && transaction
                .check_out
                .is_some_and(|check_out| check_out <= window.end())
            && query.category.matches(transaction.category)
    });

    for transaction in bookings {
        let used = match inclusive_overlap(transaction.check_in, transaction.check_out, &window) {
            Some((first, last)) => qualifying_days(first, last, query.weekend_only),
            None => 0,
        };
        cells.entry(transaction.cell_id.as_str()).or_default().used += used;
    }

    let mut overbooked = 0usize;
    let mut uncovered = 0usize;
    let cells: Vec<CellOccupancy> = cells
        .into_iter()
        .map(|(cell_id, totals)| {
            if totals.capacity == 0 && totals.used > 0 {
                uncovered += 1;
            } else if totals.used > totals.capacity {
                overbooked += 1;
            }
            CellOccupancy {
                cell_id: cell_id.to_string(),
                capacity_site_nights: totals.capacity,
                used_site_nights: totals.used,
                occupancy_rate: occupancy_rate(totals.used as f64, totals.capacity as f64),
            }
        })
        .collect();

    if uncovered > 0 || overbooked > 0 {
        warn!(
            uncovered,
            overbooked,
            month = query.month,
            category = query.category.label(),
            "usage recorded beyond available capacity; occupancy clamped"
        );
    }

    debug!(
        cells = cells.len(),
        month = query.month,
        category = query.category.label(),
        weekend_only = query.weekend_only,
        "computed monthly occupancy"
    );

    Ok(OccupancyTable {
        query,
        window,
        cells,
    })
}
