//! Supply/demand analytics over facility inventory, bookings, and search demand.
//!
//! Every operation here is a pure function of its inputs: no I/O, no caching,
//! no state carried between calls.

pub mod capacity;
pub mod domain;
pub mod expansion;
pub mod interval;
pub mod occupancy;
pub mod overview;
pub mod proration;
pub mod revenue;
pub mod search;

pub use capacity::{partial_year_capacity, site_nights, TypedCapacity};
pub use domain::{
    AnalysisWindow, AnalyticsError, BookingCategory, CategorySelector, Facility, SearchChannels,
    SearchFacets, SearchRecord, SiteCounts, SiteType, Transaction,
};
pub use expansion::{
    compute_expansion, mismatch_ratio, redistribute_general_demand, CellExpansion,
    ExpansionRanking, ExpansionSummary, ExpansionTable, Redistribution, TypeMetrics, TypeSplit,
    UNBOUNDED_MISMATCH,
};
pub use interval::{inclusive_overlap_days, nights_in_window, qualifying_days};
pub use occupancy::{compute_occupancy, occupancy_rate, CellOccupancy, OccupancyQuery, OccupancyTable};
pub use overview::{compute_overview, CategoryBookings, OverviewStats, StateRevenue};
pub use proration::{prorate, prorate_stay, ProratedStay};
pub use revenue::{
    benchmark, booking_activity, conversion_rate, estimate_lost_revenue, nightly_rate,
    regional_activity, Benchmark, BookingActivity, CellLostRevenue, LostRevenueEstimate,
    AVERAGE_STAY_MULTIPLIER, BENCHMARK_OCCUPANCY,
};
pub use search::{summarize_searches, CellSearchVolume, ParentSearchVolume, SearchSummary};
