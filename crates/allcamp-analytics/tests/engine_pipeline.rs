use allcamp_analytics::analytics::{
    benchmark, compute_expansion, compute_occupancy, compute_overview, estimate_lost_revenue,
    regional_activity, summarize_searches, AnalysisWindow, CategorySelector, Facility,
    OccupancyQuery, SearchRecord, Transaction, AVERAGE_STAY_MULTIPLIER, UNBOUNDED_MISMATCH,
};
use allcamp_analytics::ingest::{read_facilities, read_searches, read_transactions};
use approx::assert_abs_diff_eq;

const CAMPGROUNDS: &str = "\
campground_uuid,campground_h3_hexagon_id_l4,went_live_date,first_booked_at_date,campground_state,campground_region,number_of_sites,tent_friendly_sites,rv_friendly_sites,structure_sites
cg-1,hex-a,2027-01-01,2027-02-10T09:00:00Z,GA,Southeast,10,6,4,1
cg-2,hex-b,2028-06-15,,FL,Southeast,4,4,0,0
cg-3,hex-c,,,FL,Southeast,20,20,20,0
cg-4,hex-d,2026-03-01,2026-04-01,NY,Northeast,8,8,8,0
";

const TRANSACTIONS: &str = "\
booking_uuid,campground_uuid,h3_hexagon_id_l4,trip_checkin_date,trip_checkout_date,trip_total_cost,campsite_category,is_booking_canceled
b-1,cg-1,hex-a,2028-07-01,2028-07-04,300,rv-only,false
b-2,cg-1,hex-a,2027-12-30,2028-01-03,400,tent-or-rv,false
b-3,cg-2,hex-b,2028-06-20,2028-06-22,200,tent-or-rv,true
b-4,cg-2,hex-b,2028-08-10,2028-08-12,180,structure,false
b-5,cg-4,hex-d,2028-05-01,2028-05-03,500,rv-only,false
";

const SEARCHES: &str = "\
destination_h3_cell_id,destination_h3_parent_id,origin_h3_cell_id,origin_h3_parent_id,searchers,rv_searchers,tent_searchers,glamping_searchers
hex-a,parent-1,hex-o,parent-9,400,120,60,20
hex-b,parent-1,hex-o,parent-9,50,5,10,0
hex-e,parent-2,hex-p,parent-9,90,0,0,0
hex-a,parent-1,hex-p,parent-9,100,30,15,5
";

fn fixtures() -> (Vec<Facility>, Vec<Transaction>, Vec<SearchRecord>) {
    (
        read_facilities(CAMPGROUNDS.as_bytes()).expect("campgrounds parse"),
        read_transactions(TRANSACTIONS.as_bytes()).expect("transactions parse"),
        read_searches(SEARCHES.as_bytes()).expect("searches parse"),
    )
}

fn year_2028() -> AnalysisWindow {
    AnalysisWindow::for_year(2028).expect("2028 window")
}

#[test]
fn occupancy_rates_stay_bounded_for_every_query() {
    let (facilities, transactions, _) = fixtures();

    for month in 1..=12 {
        for category in CategorySelector::ordered() {
            for weekend_only in [false, true] {
                let query = OccupancyQuery::new(2028, month, category, weekend_only);
                let table =
                    compute_occupancy(&facilities, &transactions, query).expect("occupancy");
                for cell in &table.cells {
                    assert!(
                        (0.0..=1.0).contains(&cell.occupancy_rate),
                        "{query:?} {cell:?}"
                    );
                    assert!(cell.capacity_site_nights >= 0);
                    assert!(cell.used_site_nights >= 0);
                }

                let again =
                    compute_occupancy(&facilities, &transactions, query).expect("occupancy");
                assert_eq!(table, again);
            }
        }
    }
}

#[test]
fn july_occupancy_reflects_the_rv_booking() {
    let (facilities, transactions, _) = fixtures();
    let query = OccupancyQuery::new(2028, 7, CategorySelector::RvOnly, false);
    let table = compute_occupancy(&facilities, &transactions, query).expect("occupancy");

    let hex_a = table.cell("hex-a").expect("hex-a present");
    assert_eq!(hex_a.capacity_site_nights, 31 * 4);
    assert_eq!(hex_a.used_site_nights, 4);
    assert_abs_diff_eq!(hex_a.occupancy_rate, 4.0 / 124.0, epsilon = 1e-12);

    assert!(table.cell("hex-c").is_none());
}

#[test]
fn expansion_scores_regional_cells_and_joins_search_only_cells() {
    let (facilities, transactions, searches) = fixtures();
    let table = compute_expansion(
        &facilities,
        &transactions,
        &searches,
        "Southeast",
        &year_2028(),
    )
    .expect("expansion");

    let ids: Vec<&str> = table.cells.iter().map(|cell| cell.cell_id.as_str()).collect();
    assert_eq!(ids, vec!["hex-a", "hex-b", "hex-e"]);

    let summary = table.summary();
    assert_eq!(summary.total_capacity, 3660 + 800);
    assert_eq!(summary.cells_with_capacity, 2);
    assert_eq!(summary.total_used, 5 + 2);

    let hex_a = table.cell("hex-a").expect("hex-a");
    assert_eq!(hex_a.used_site_nights, 5);
    assert_abs_diff_eq!(hex_a.rv.used_nights, 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hex_a.tent.used_nights, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hex_a.searchers, 500.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hex_a.general_searchers, 250.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hex_a.rv.adjusted_demand, 300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(hex_a.tent.adjusted_demand, 150.0, epsilon = 1e-9);
    assert_abs_diff_eq!(hex_a.structure.adjusted_demand, 50.0, epsilon = 1e-9);

    let hex_e = table.cell("hex-e").expect("search-only cell");
    assert_eq!(hex_e.partial_capacity, 0);
    assert_eq!(hex_e.occupancy_rate, 0.0);
    assert_eq!(hex_e.priority_score, 0.0);
    assert_eq!(hex_e.max_mismatch_ratio, 0.0);

    let hex_b = table.cell("hex-b").expect("hex-b");
    assert_eq!(hex_b.rv.mismatch_ratio, UNBOUNDED_MISMATCH);

    for cell in &table.cells {
        if cell.sum_of_specified > 0.0 {
            let adjusted =
                cell.rv.adjusted_demand + cell.tent.adjusted_demand + cell.structure.adjusted_demand;
            assert_abs_diff_eq!(adjusted, cell.searchers, epsilon = 1e-9);
        }
    }
}

#[test]
fn lost_revenue_and_benchmark_follow_regional_activity() {
    let (facilities, transactions, searches) = fixtures();
    let window = year_2028();
    let table = compute_expansion(&facilities, &transactions, &searches, "Southeast", &window)
        .expect("expansion");
    let activity = regional_activity(&facilities, &transactions, "Southeast", &window)
        .expect("regional activity");

    // b-1 (3 nights, $300), b-2 (2 of 4 nights, $200), b-4 (2 nights, $180).
    assert_eq!(activity.bookings, 3);
    assert_eq!(activity.nights, 7);
    assert_abs_diff_eq!(activity.revenue, 680.0, epsilon = 1e-9);

    let estimate = estimate_lost_revenue(&table, &activity);
    assert_abs_diff_eq!(estimate.conversion_rate, 3.0 / 640.0, epsilon = 1e-12);
    assert_abs_diff_eq!(estimate.nightly_rate, 680.0 / 7.0, epsilon = 1e-9);
    let per_cell: f64 = estimate.cells.iter().map(|cell| cell.lost_revenue).sum();
    assert_abs_diff_eq!(
        estimate.total_lost_revenue,
        per_cell * AVERAGE_STAY_MULTIPLIER,
        epsilon = 1e-9
    );
    assert!(estimate.cells.iter().all(|cell| cell.lost_revenue >= 0.0));

    let market = benchmark(&transactions, &window, &table);
    assert_eq!(market.activity.bookings, 4);
    assert_eq!(market.regional_capacity, 4460);
    assert_abs_diff_eq!(
        market.market_size_estimate,
        4460.0 * 0.45 * market.avg_revenue_per_night,
        epsilon = 1e-6
    );
}

#[test]
fn overview_and_search_summaries_cover_the_exports() {
    let (facilities, transactions, searches) = fixtures();
    let stats = compute_overview(&facilities, &transactions, &year_2028());
    assert_eq!(stats.total_facilities, 4);
    assert_eq!(stats.live_facilities, 3);
    assert_eq!(stats.active_facilities, 2);
    assert_eq!(stats.total_bookings, 4);
    assert_abs_diff_eq!(stats.total_revenue, 1180.0, epsilon = 1e-9);
    let states: Vec<(&str, f64)> = stats
        .revenue_by_state
        .iter()
        .map(|row| (row.state.as_str(), row.revenue))
        .collect();
    assert_eq!(states, vec![("GA", 500.0), ("NY", 500.0), ("FL", 180.0)]);

    let summary = summarize_searches(&searches);
    assert_eq!(summary.total_searchers, 640);
    assert_eq!(summary.distinct_origins, 2);
    assert_eq!(summary.by_destination[0].cell_id, "hex-a");
    assert_eq!(summary.by_destination[0].searchers, 500);
    assert_eq!(summary.by_origin_parent[0].searchers, 640);
}

#[test]
fn blank_region_is_rejected_before_aggregation() {
    let (facilities, transactions, searches) = fixtures();
    let result = compute_expansion(&facilities, &transactions, &searches, "  ", &year_2028());
    assert!(result.is_err());
}
