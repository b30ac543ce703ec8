//! Date-range overlap arithmetic.
//!
//! Two conventions coexist and must not be swapped for one another:
//!
//! * [`nights_in_window`] reads a stay as `[check_in, check_out)` and the
//!   window as `[start, end]`. Used for revenue and night proration.
//! * [`inclusive_overlap_days`] reads both ranges as inclusive on both ends.
//!   Used for go-live capacity spans, expansion usage, and monthly usage.
//!
//! Both return 0 when the ranges are disjoint or an endpoint is missing.

use super::domain::AnalysisWindow;
use chrono::{Datelike, NaiveDate};

/// Nights of a `[check_in, check_out)` stay that fall inside `window`.
pub fn nights_in_window(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    window: &AnalysisWindow,
) -> i64 {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return 0;
    };

    let first = check_in.max(window.start());
    let stop = match window.end().succ_opt() {
        Some(day_after_window) => check_out.min(day_after_window),
        None => check_out,
    };

    (stop - first).num_days().max(0)
}

/// Days shared by the inclusive range `[start, end]` and `window`.
pub fn inclusive_overlap_days(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    window: &AnalysisWindow,
) -> i64 {
    match inclusive_overlap(start, end, window) {
        Some((first, last)) => (last - first).num_days() + 1,
        None => 0,
    }
}

/// The inclusive `(first, last)` days shared by `[start, end]` and `window`.
pub(crate) fn inclusive_overlap(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    window: &AnalysisWindow,
) -> Option<(NaiveDate, NaiveDate)> {
    let (start, end) = (start?, end?);
    let first = start.max(window.start());
    let last = end.min(window.end());
    (first <= last).then_some((first, last))
}

/// Friday, Saturday, and Sunday nights (Monday = 0 ... Sunday = 6; 4..=6 qualify).
pub fn is_weekend_night(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 4
}

/// Days in the inclusive range `[first, last]`, restricted to weekend nights
/// when `weekend_only` is set.
pub fn qualifying_days(first: NaiveDate, last: NaiveDate, weekend_only: bool) -> i64 {
    let span = (last - first).num_days() + 1;
    if span <= 0 {
        return 0;
    }
    if !weekend_only {
        return span;
    }

    // Every run of seven consecutive days holds exactly three weekend nights;
    // the tail starts on the same weekday as `first`.
    let lead = i64::from(first.weekday().num_days_from_monday());
    let tail = (0..span % 7)
        .filter(|offset| (lead + offset) % 7 >= 4)
        .count() as i64;

    (span / 7) * 3 + tail
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn year_2028() -> AnalysisWindow {
        AnalysisWindow::for_year(2028).expect("2028 window")
    }

    #[test]
    fn stay_straddling_window_start_counts_only_inside_nights() {
        let nights = nights_in_window(
            Some(date(2027, 12, 30)),
            Some(date(2028, 1, 3)),
            &year_2028(),
        );
        assert_eq!(nights, 2);
    }

    #[test]
    fn checkout_exclusive_convention_at_window_end() {
        let window = year_2028();
        // Night of Dec 31 belongs to the window; checkout on Jan 1 is exclusive.
        assert_eq!(
            nights_in_window(Some(date(2028, 12, 31)), Some(date(2029, 1, 1)), &window),
            1
        );
        // Checking in the day after the window ends yields nothing.
        assert_eq!(
            nights_in_window(Some(date(2029, 1, 1)), Some(date(2029, 1, 4)), &window),
            0
        );
        // Checking out on the first day of the window yields nothing.
        assert_eq!(
            nights_in_window(Some(date(2027, 12, 28)), Some(date(2028, 1, 1)), &window),
            0
        );
    }

    #[test]
    fn inclusive_convention_counts_both_endpoints() {
        let window = year_2028();
        assert_eq!(
            inclusive_overlap_days(Some(date(2028, 1, 1)), Some(date(2028, 1, 1)), &window),
            1
        );
        assert_eq!(
            inclusive_overlap_days(Some(date(2027, 12, 31)), Some(date(2028, 1, 1)), &window),
            1
        );
        assert_eq!(
            inclusive_overlap_days(Some(date(2028, 12, 31)), Some(NaiveDate::MAX), &window),
            1
        );
        assert_eq!(
            inclusive_overlap_days(Some(date(2029, 1, 1)), Some(date(2029, 1, 2)), &window),
            0
        );
    }

    #[test]
    fn conventions_differ_by_one_night_for_the_same_dates() {
        let window = year_2028();
        let (check_in, check_out) = (Some(date(2028, 3, 1)), Some(date(2028, 3, 4)));
        assert_eq!(nights_in_window(check_in, check_out, &window), 3);
        assert_eq!(inclusive_overlap_days(check_in, check_out, &window), 4);
    }

    #[test]
    fn missing_endpoints_yield_zero() {
        let window = year_2028();
        assert_eq!(nights_in_window(None, Some(date(2028, 3, 4)), &window), 0);
        assert_eq!(nights_in_window(Some(date(2028, 3, 1)), None, &window), 0);
        assert_eq!(inclusive_overlap_days(None, Some(date(2028, 3, 4)), &window), 0);
        assert_eq!(inclusive_overlap_days(Some(date(2028, 3, 1)), None, &window), 0);
    }

    #[test]
    fn weekend_counting_uses_friday_through_sunday() {
        // 2028-06-01 is a Thursday.
        assert!(!is_weekend_night(date(2028, 6, 1)));
        assert!(is_weekend_night(date(2028, 6, 2)));
        assert!(is_weekend_night(date(2028, 6, 4)));
        assert!(!is_weekend_night(date(2028, 6, 5)));

        assert_eq!(qualifying_days(date(2028, 6, 1), date(2028, 6, 30), false), 30);
        // June 2028: Fridays 2,9,16,23,30; Saturdays 3,10,17,24; Sundays 4,11,18,25.
        assert_eq!(qualifying_days(date(2028, 6, 1), date(2028, 6, 30), true), 13);
        assert_eq!(qualifying_days(date(2028, 6, 5), date(2028, 6, 1), true), 0);
    }

    proptest! {
        #[test]
        fn overlaps_are_never_negative(
            start_offset in -800i64..800,
            length in -30i64..400,
        ) {
            let window = year_2028();
            let a = date(2028, 1, 1) + chrono::Duration::days(start_offset);
            let b = a + chrono::Duration::days(length);
            prop_assert!(nights_in_window(Some(a), Some(b), &window) >= 0);
            prop_assert!(inclusive_overlap_days(Some(a), Some(b), &window) >= 0);
        }

        #[test]
        fn stays_inside_the_window_keep_every_night(
            start_offset in 0i64..300,
            length in 1i64..60,
        ) {
            let window = year_2028();
            let check_in = date(2028, 1, 1) + chrono::Duration::days(start_offset);
            let check_out = check_in + chrono::Duration::days(length);
            prop_assume!(check_out <= date(2029, 1, 1));
            prop_assert_eq!(nights_in_window(Some(check_in), Some(check_out), &window), length);
            prop_assert_eq!(
                inclusive_overlap_days(Some(check_in), Some(check_out), &window),
                (length + 1).min((date(2028, 12, 31) - check_in).num_days() + 1)
            );
        }

        #[test]
        fn weekend_count_matches_day_by_day_scan(
            start_offset in 0i64..366,
            length in 0i64..120,
        ) {
            let first = date(2028, 1, 1) + chrono::Duration::days(start_offset);
            let last = first + chrono::Duration::days(length);
            let scanned = first
                .iter_days()
                .take_while(|day| *day <= last)
                .filter(|day| is_weekend_night(*day))
                .count() as i64;
            prop_assert_eq!(qualifying_days(first, last, true), scanned);
        }
    }
}
