//! Revenue estimates derived from observed bookings.
//!
//! These are policy heuristics rather than fitted models; the rates and the
//! stay multiplier are reproduced exactly so dashboard figures stay stable.

use super::domain::{AnalysisWindow, AnalyticsError, Facility, Transaction};
use super::expansion::ExpansionTable;
use super::proration::prorate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Average nights per booking applied to the lost-revenue total.
pub const AVERAGE_STAY_MULTIPLIER: f64 = 2.0;

/// Flat annual occupancy assumed by the market-size benchmark.
pub const BENCHMARK_OCCUPANCY: f64 = 0.45;

/// Non-canceled bookings with at least one night inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BookingActivity {
    pub bookings: u64,
    pub nights: i64,
    pub revenue: f64,
}

pub fn booking_activity<'a, I>(transactions: I, window: &AnalysisWindow) -> BookingActivity
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut booking_ids: HashSet<&'a str> = HashSet::new();
    let mut activity = BookingActivity::default();

    for transaction in transactions {
        if transaction.canceled {
            continue;
        }
        let stay = prorate(transaction, window);
        if !stay.touches_window() {
            continue;
        }
        booking_ids.insert(transaction.booking_id.as_str());
        activity.nights += stay.overlap_nights;
        activity.revenue += stay.prorated_cost;
    }

    activity.bookings = booking_ids.len() as u64;
    activity
}

/// Booking activity at the region's live facilities.
pub fn regional_activity(
    facilities: &[Facility],
    transactions: &[Transaction],
    region: &str,
    window: &AnalysisWindow,
) -> Result<BookingActivity, AnalyticsError> {
    if region.trim().is_empty() {
        return Err(AnalyticsError::EmptyRegion);
    }

    let regional: HashSet<&str> = facilities
        .iter()
        .filter(|facility| facility.is_live() && facility.in_region(region))
        .map(|facility| facility.facility_id.as_str())
        .collect();

    Ok(booking_activity(
        transactions
            .iter()
            .filter(|transaction| regional.contains(transaction.facility_id.as_str())),
        window,
    ))
}

pub fn conversion_rate(bookings: u64, searchers: f64) -> f64 {
    if searchers > 0.0 {
        bookings as f64 / searchers
    } else {
        0.0
    }
}

pub fn nightly_rate(revenue: f64, nights: i64) -> f64 {
    if nights > 0 {
        revenue / nights as f64
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellLostRevenue {
    pub cell_id: String,
    pub unfilled_site_nights: f64,
    pub lost_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LostRevenueEstimate {
    pub conversion_rate: f64,
    pub nightly_rate: f64,
    pub total_unfilled_site_nights: f64,
    pub total_lost_revenue: f64,
    pub cells: Vec<CellLostRevenue>,
}

/// Revenue foregone because adjusted demand exceeded capacity, priced at the
/// region's observed conversion and nightly rates.
pub fn estimate_lost_revenue(
    table: &ExpansionTable,
    activity: &BookingActivity,
) -> LostRevenueEstimate {
    let conversion_rate = conversion_rate(activity.bookings, table.total_searchers());
    let nightly_rate = nightly_rate(activity.revenue, activity.nights);

    let cells: Vec<CellLostRevenue> = table
        .cells
        .iter()
        .map(|cell| {
            let unfilled_site_nights = cell.unfilled_site_nights();
            CellLostRevenue {
                cell_id: cell.cell_id.clone(),
                unfilled_site_nights,
                lost_revenue: unfilled_site_nights * conversion_rate * nightly_rate,
            }
        })
        .collect();

    let total_unfilled_site_nights = cells
        .iter()
        .map(|cell| cell.unfilled_site_nights)
        .sum::<f64>();
    let total_lost_revenue =
        cells.iter().map(|cell| cell.lost_revenue).sum::<f64>() * AVERAGE_STAY_MULTIPLIER;

    debug!(
        conversion_rate,
        nightly_rate, total_lost_revenue, "estimated lost revenue"
    );

    LostRevenueEstimate {
        conversion_rate,
        nightly_rate,
        total_unfilled_site_nights,
        total_lost_revenue,
        cells,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Benchmark {
    pub activity: BookingActivity,
    pub avg_revenue_per_booking: f64,
    pub avg_nights_per_booking: f64,
    pub avg_revenue_per_night: f64,
    pub regional_capacity: i64,
    pub assumed_occupancy: f64,
    pub assumed_used_site_nights: f64,
    pub market_size_estimate: f64,
}

/// Market-size benchmark: the region's partial-year capacity filled at
/// [`BENCHMARK_OCCUPANCY`] and priced at the all-bookings nightly average.
pub fn benchmark(
    transactions: &[Transaction],
    window: &AnalysisWindow,
    table: &ExpansionTable,
) -> Benchmark {
    let activity = booking_activity(transactions, window);

    let (avg_revenue_per_booking, avg_nights_per_booking, avg_revenue_per_night) =
        if activity.bookings > 0 {
            let bookings = activity.bookings as f64;
            (
                activity.revenue / bookings,
                activity.nights as f64 / bookings,
                nightly_rate(activity.revenue, activity.nights),
            )
        } else {
            (0.0, 0.0, 0.0)
        };

    let regional_capacity = table.summary().total_capacity;
    let assumed_used_site_nights = regional_capacity as f64 * BENCHMARK_OCCUPANCY;

    Benchmark {
        activity,
        avg_revenue_per_booking,
        avg_nights_per_booking,
        avg_revenue_per_night,
        regional_capacity,
        assumed_occupancy: BENCHMARK_OCCUPANCY,
        assumed_used_site_nights,
        market_size_estimate: assumed_used_site_nights * avg_revenue_per_night,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::{
        BookingCategory, SearchChannels, SearchFacets, SearchRecord, SiteCounts,
    };
    use crate::analytics::expansion::compute_expansion;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn year_2028() -> AnalysisWindow {
        AnalysisWindow::for_year(2028).expect("2028 window")
    }

    fn facility(id: &str, region: &str) -> Facility {
        Facility {
            facility_id: id.to_string(),
            cell_id: format!("hex-{id}"),
            went_live_on: Some(date(2028, 12, 22)),
            first_booked_on: None,
            state: Some("FL".to_string()),
            region: Some(region.to_string()),
            sites: SiteCounts {
                total: 1,
                tent: 1,
                rv: 1,
                structure: 0,
            },
        }
    }

    fn booking(id: &str, facility_id: &str, nights: i64, cost: f64) -> Transaction {
        let check_in = date(2028, 12, 22);
        Transaction {
            booking_id: id.to_string(),
            facility_id: facility_id.to_string(),
            cell_id: format!("hex-{facility_id}"),
            check_in: Some(check_in),
            check_out: Some(check_in + chrono::Duration::days(nights)),
            total_cost: cost,
            category: BookingCategory::RvOnly,
            canceled: false,
        }
    }

    fn search(cell: &str, searchers: u64, rv: u64, tent: u64) -> SearchRecord {
        SearchRecord {
            destination_cell: cell.to_string(),
            destination_parent: None,
            origin_cell: "origin".to_string(),
            origin_parent: None,
            searchers,
            facets: SearchFacets {
                rv,
                tent,
                ..SearchFacets::default()
            },
            channels: SearchChannels::default(),
        }
    }

    #[test]
    fn rates_default_to_zero_without_denominators() {
        assert_eq!(conversion_rate(12, 0.0), 0.0);
        assert_eq!(conversion_rate(5, 100.0), 0.05);
        assert_eq!(nightly_rate(500.0, 0), 0.0);
        assert_eq!(nightly_rate(500.0, 4), 125.0);
    }

    #[test]
    fn activity_counts_distinct_bookings_inside_the_window() {
        let mut canceled = booking("b-3", "cg-1", 2, 999.0);
        canceled.canceled = true;
        let mut outside = booking("b-4", "cg-1", 2, 100.0);
        outside.check_in = Some(date(2027, 5, 1));
        outside.check_out = Some(date(2027, 5, 3));
        let transactions = vec![
            booking("b-1", "cg-1", 2, 200.0),
            booking("b-1", "cg-1", 2, 200.0),
            booking("b-2", "cg-2", 4, 300.0),
            canceled,
            outside,
        ];

        let activity = booking_activity(&transactions, &year_2028());
        assert_eq!(activity.bookings, 2);
        assert_eq!(activity.nights, 8);
        assert_abs_diff_eq!(activity.revenue, 700.0, epsilon = 1e-9);

        let facilities = vec![facility("cg-1", "Southeast"), facility("cg-2", "Northeast")];
        let regional = regional_activity(&facilities, &transactions, "Southeast", &year_2028())
            .expect("regional activity");
        assert_eq!(regional.bookings, 1);
        assert_eq!(regional.nights, 4);
    }

    #[test]
    fn lost_revenue_prices_unfilled_demand_and_doubles_for_stay_length() {
        let facilities = vec![facility("cg-1", "Southeast")];
        let transactions = vec![booking("b-1", "cg-1", 5, 500.0)];
        // RV supply is 10 site-nights; 40 RV searchers leave 30 unfilled.
        // Tent supply is 10; 10 tent searchers fill it exactly.
        let searches = vec![search("hex-cg-1", 50, 40, 10)];
        let window = year_2028();

        let table = compute_expansion(&facilities, &transactions, &searches, "Southeast", &window)
            .expect("expansion computes");
        let activity =
            regional_activity(&facilities, &transactions, "Southeast", &window).expect("activity");
        let estimate = estimate_lost_revenue(&table, &activity);

        assert_abs_diff_eq!(estimate.conversion_rate, 1.0 / 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(estimate.nightly_rate, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.total_unfilled_site_nights, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.cells[0].lost_revenue, 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.total_lost_revenue, 120.0, epsilon = 1e-9);
    }

    #[test]
    fn benchmark_applies_flat_occupancy_to_regional_capacity() {
        let facilities = vec![facility("cg-1", "Southeast")];
        let transactions = vec![
            booking("b-1", "cg-1", 2, 300.0),
            booking("b-2", "cg-1", 4, 300.0),
        ];
        let window = year_2028();
        let table = compute_expansion(&facilities, &transactions, &[], "Southeast", &window)
            .expect("expansion computes");

        let result = benchmark(&transactions, &window, &table);
        assert_eq!(result.activity.bookings, 2);
        assert_abs_diff_eq!(result.avg_revenue_per_booking, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.avg_nights_per_booking, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.avg_revenue_per_night, 100.0, epsilon = 1e-9);
        assert_eq!(result.regional_capacity, 10);
        assert_abs_diff_eq!(result.assumed_used_site_nights, 4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(result.market_size_estimate, 450.0, epsilon = 1e-9);
    }

    #[test]
    fn benchmark_without_bookings_is_zero() {
        let window = year_2028();
        let table = compute_expansion(&[], &[], &[], "Southeast", &window).expect("empty table");
        let result = benchmark(&[], &window, &table);
        assert_eq!(result.avg_revenue_per_night, 0.0);
        assert_eq!(result.market_size_estimate, 0.0);
    }
}
