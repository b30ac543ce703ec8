use super::domain::{AnalysisWindow, BookingCategory, Facility, Transaction};
use super::proration::prorate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRevenue {
    pub state: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryBookings {
    pub category: BookingCategory,
    pub bookings: u64,
}

/// Headline figures for a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub window: AnalysisWindow,
    pub total_facilities: usize,
    pub live_facilities: usize,
    pub active_facilities: usize,
    pub total_revenue: f64,
    pub total_bookings: u64,
    /// Highest revenue first.
    pub revenue_by_state: Vec<StateRevenue>,
    /// In [`BookingCategory::ordered`] order; categories without bookings are omitted.
    pub bookings_by_category: Vec<CategoryBookings>,
}

pub fn compute_overview(
    facilities: &[Facility],
    transactions: &[Transaction],
    window: &AnalysisWindow,
) -> OverviewStats {
    let mut facility_ids: HashSet<&str> = HashSet::new();
    let mut live_ids: HashSet<&str> = HashSet::new();
    let mut active_ids: HashSet<&str> = HashSet::new();
    let mut facility_states: HashMap<&str, &str> = HashMap::new();

    for facility in facilities {
        let id = facility.facility_id.as_str();
        facility_ids.insert(id);
        if facility.is_live() {
            live_ids.insert(id);
        }
        if facility.first_booked_on.is_some() {
            active_ids.insert(id);
        }
        if let Some(state) = facility.state.as_deref() {
            facility_states.insert(id, state);
        }
    }

    let mut total_revenue = 0.0;
    let mut booking_ids: HashSet<&str> = HashSet::new();
    let mut by_state: BTreeMap<&str, f64> = BTreeMap::new();
    let mut by_category: BTreeMap<BookingCategory, HashSet<&str>> = BTreeMap::new();

    for transaction in transactions.iter().filter(|transaction| !transaction.canceled) {
        let stay = prorate(transaction, window);
        if !stay.touches_window() {
            continue;
        }

        let booking_id = transaction.booking_id.as_str();
        total_revenue += stay.prorated_cost;
        booking_ids.insert(booking_id);
        by_category
            .entry(transaction.category)
            .or_default()
            .insert(booking_id);

        if let Some(&state) = facility_states.get(transaction.facility_id.as_str()) {
            *by_state.entry(state).or_default() += stay.prorated_cost;
        }
    }

    let mut revenue_by_state: Vec<StateRevenue> = by_state
        .into_iter()
        .map(|(state, revenue)| StateRevenue {
            state: state.to_string(),
            revenue,
        })
        .collect();
    revenue_by_state.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.state.cmp(&b.state))
    });

    let bookings_by_category = BookingCategory::ordered()
        .into_iter()
        .filter_map(|category| {
            by_category.get(&category).map(|ids| CategoryBookings {
                category,
                bookings: ids.len() as u64,
            })
        })
        .collect();

    debug!(
        facilities = facility_ids.len(),
        bookings = booking_ids.len(),
        total_revenue,
        "computed overview"
    );

    OverviewStats {
        window: *window,
        total_facilities: facility_ids.len(),
        live_facilities: live_ids.len(),
        active_facilities: active_ids.len(),
        total_revenue,
        total_bookings: booking_ids.len() as u64,
        revenue_by_state,
        bookings_by_category,
    }
}
