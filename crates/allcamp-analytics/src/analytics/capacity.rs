use super::domain::{AnalysisWindow, CategorySelector, Facility, SiteType};
use super::interval::{inclusive_overlap_days, qualifying_days};
use chrono::NaiveDate;
use serde::Serialize;
use std::ops::AddAssign;

/// Site-nights a facility offers inside `window` for the selected category.
///
/// Capacity starts at the later of go-live and window start and runs through
/// the window end. Facilities that never went live offer nothing.
pub fn site_nights(
    facility: &Facility,
    window: &AnalysisWindow,
    selector: CategorySelector,
    weekend_only: bool,
) -> i64 {
    let Some(went_live_on) = facility.went_live_on else {
        return 0;
    };

    let sites = selector.site_count(&facility.sites);
    let first = went_live_on.max(window.start());
    let last = window.end();
    if last < first || sites == 0 {
        return 0;
    }

    qualifying_days(first, last, weekend_only) * sites as i64
}

/// Partial-year capacity split by site type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypedCapacity {
    pub total: i64,
    pub rv: i64,
    pub tent: i64,
    pub structure: i64,
}

impl TypedCapacity {
    pub fn for_type(&self, site_type: SiteType) -> i64 {
        match site_type {
            SiteType::Rv => self.rv,
            SiteType::Tent => self.tent,
            SiteType::Structure => self.structure,
        }
    }
}

impl AddAssign for TypedCapacity {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.rv += other.rv;
        self.tent += other.tent;
        self.structure += other.structure;
    }
}

/// Capacity over `window` for a facility live from its go-live date onward,
/// using the inclusive overlap of `[went_live_on, +inf)` and the window.
pub fn partial_year_capacity(facility: &Facility, window: &AnalysisWindow) -> TypedCapacity {
    let days_live = inclusive_overlap_days(facility.went_live_on, Some(NaiveDate::MAX), window);
    if days_live == 0 {
        return TypedCapacity::default();
    }

    let sites = &facility.sites;
    TypedCapacity {
        total: days_live * i64::from(sites.total),
        rv: days_live * SiteType::Rv.site_count(sites) as i64,
        tent: days_live * SiteType::Tent.site_count(sites) as i64,
        structure: days_live * SiteType::Structure.site_count(sites) as i64,
    }
}
