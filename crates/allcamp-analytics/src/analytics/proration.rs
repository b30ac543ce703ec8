use super::domain::{AnalysisWindow, Transaction};
use super::interval::nights_in_window;
use chrono::NaiveDate;
use serde::Serialize;

/// Portion of a stay that falls inside an analysis window.
///
/// `trip_nights` is the full length of any dated stay with check-out after
/// check-in, even when none of it overlaps the window. Undated or inverted
/// stays report zero for every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProratedStay {
    pub overlap_nights: i64,
    pub trip_nights: i64,
    pub prorated_cost: f64,
}

impl ProratedStay {
    pub fn touches_window(&self) -> bool {
        self.overlap_nights > 0
    }
}

/// Allocates `total_cost` to the nights of `[check_in, check_out)` inside
/// `window`. Same-day, inverted, or undated stays prorate to all zeros.
pub fn prorate_stay(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    total_cost: f64,
    window: &AnalysisWindow,
) -> ProratedStay {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return ProratedStay::default();
    };

    let trip_nights = (check_out - check_in).num_days();
    if trip_nights <= 0 {
        return ProratedStay::default();
    }

    let overlap_nights = nights_in_window(Some(check_in), Some(check_out), window);
    let prorated_cost = if overlap_nights > 0 {
        (overlap_nights as f64 / trip_nights as f64) * total_cost
    } else {
        0.0
    };

    ProratedStay {
        overlap_nights,
        trip_nights,
        prorated_cost,
    }
}

pub fn prorate(transaction: &Transaction, window: &AnalysisWindow) -> ProratedStay {
    prorate_stay(
        transaction.check_in,
        transaction.check_out,
        transaction.total_cost,
        window,
    )
}
