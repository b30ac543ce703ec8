use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Site inventory for a single facility.
///
/// Counts are independent of each other: a site that accepts both tents and
/// RVs is counted in `tent` and in `rv`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCounts {
    pub total: u32,
    pub tent: u32,
    pub rv: u32,
    pub structure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: String,
    pub cell_id: String,
    /// `None` when the facility was never publicly listed.
    pub went_live_on: Option<NaiveDate>,
    pub first_booked_on: Option<NaiveDate>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub sites: SiteCounts,
}

impl Facility {
    pub fn is_live(&self) -> bool {
        self.went_live_on.is_some()
    }

    pub fn in_region(&self, region: &str) -> bool {
        self.region
            .as_deref()
            .is_some_and(|own| own.trim().eq_ignore_ascii_case(region.trim()))
    }
}

/// Site category recorded on a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingCategory {
    TentOrRv,
    RvOnly,
    Structure,
    Unspecified,
}

impl BookingCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::TentOrRv,
            Self::RvOnly,
            Self::Structure,
            Self::Unspecified,
        ]
    }

    /// Labels outside the known set collapse to `Unspecified`.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tent-or-rv" => Self::TentOrRv,
            "rv-only" => Self::RvOnly,
            "structure" => Self::Structure,
            _ => Self::Unspecified,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TentOrRv => "tent-or-rv",
            Self::RvOnly => "rv-only",
            Self::Structure => "structure",
            Self::Unspecified => "unspecified",
        }
    }
}

/// Category filter applied to capacity and usage in occupancy queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategorySelector {
    All,
    TentOrRv,
    RvOnly,
    Structure,
}

impl CategorySelector {
    pub const fn ordered() -> [Self; 4] {
        [Self::All, Self::TentOrRv, Self::RvOnly, Self::Structure]
    }

    /// Unrecognized labels select everything.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tent-or-rv" => Self::TentOrRv,
            "rv-only" => Self::RvOnly,
            "structure" => Self::Structure,
            _ => Self::All,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::TentOrRv => "tent-or-rv",
            Self::RvOnly => "rv-only",
            Self::Structure => "structure",
        }
    }

    /// Sites that can host a booking of this category. Tent-or-RV adds the tent
    /// and RV counts, so a dual-use site contributes twice.
    pub fn site_count(self, sites: &SiteCounts) -> u64 {
        match self {
            Self::All => u64::from(sites.total),
            Self::TentOrRv => u64::from(sites.tent) + u64::from(sites.rv),
            Self::RvOnly => u64::from(sites.rv),
            Self::Structure => u64::from(sites.structure),
        }
    }

    pub fn matches(self, category: BookingCategory) -> bool {
        match self {
            Self::All => true,
            Self::TentOrRv => category == BookingCategory::TentOrRv,
            Self::RvOnly => category == BookingCategory::RvOnly,
            Self::Structure => category == BookingCategory::Structure,
        }
    }
}

/// Site type buckets used by the expansion analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    Rv,
    Tent,
    Structure,
}

impl SiteType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Rv, Self::Tent, Self::Structure]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rv => "RV",
            Self::Tent => "Tent",
            Self::Structure => "Structure",
        }
    }

    pub fn site_count(self, sites: &SiteCounts) -> u64 {
        match self {
            Self::Rv => u64::from(sites.rv),
            Self::Tent => u64::from(sites.tent),
            Self::Structure => u64::from(sites.structure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub booking_id: String,
    pub facility_id: String,
    /// Cell recorded on the booking; may lag behind the facility's current cell.
    pub cell_id: String,
    pub check_in: Option<NaiveDate>,
    /// Exclusive end of the stay.
    pub check_out: Option<NaiveDate>,
    pub total_cost: f64,
    pub category: BookingCategory,
    pub canceled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFacets {
    pub rv: u64,
    pub tent: u64,
    pub glamping: u64,
    pub family_friendly: u64,
    pub pet_friendly: u64,
    pub good_for_groups: u64,
}

impl SearchFacets {
    pub fn accumulate(&mut self, other: &Self) {
        self.rv = self.rv.saturating_add(other.rv);
        self.tent = self.tent.saturating_add(other.tent);
        self.glamping = self.glamping.saturating_add(other.glamping);
        self.family_friendly = self.family_friendly.saturating_add(other.family_friendly);
        self.pet_friendly = self.pet_friendly.saturating_add(other.pet_friendly);
        self.good_for_groups = self.good_for_groups.saturating_add(other.good_for_groups);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchChannels {
    pub seo: u64,
    pub paid_search_engine: u64,
    pub social: u64,
    pub sharing: u64,
    pub direct: u64,
    pub other: u64,
}

impl SearchChannels {
    pub fn accumulate(&mut self, other: &Self) {
        self.seo = self.seo.saturating_add(other.seo);
        self.paid_search_engine = self.paid_search_engine.saturating_add(other.paid_search_engine);
        self.social = self.social.saturating_add(other.social);
        self.sharing = self.sharing.saturating_add(other.sharing);
        self.direct = self.direct.saturating_add(other.direct);
        self.other = self.other.saturating_add(other.other);
    }
}

/// Aggregated search demand between an origin cell and a destination cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub destination_cell: String,
    pub destination_parent: Option<String>,
    pub origin_cell: String,
    pub origin_parent: Option<String>,
    pub searchers: u64,
    pub facets: SearchFacets,
    pub channels: SearchChannels,
}

/// Inclusive calendar window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AnalysisWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl AnalysisWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalyticsError> {
        if end < start {
            return Err(AnalyticsError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn for_year(year: i32) -> Result<Self, AnalyticsError> {
        let start =
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or(AnalyticsError::UnsupportedYear(year))?;
        let end =
            NaiveDate::from_ymd_opt(year, 12, 31).ok_or(AnalyticsError::UnsupportedYear(year))?;
        Self::new(start, end)
    }

    pub fn for_month(year: i32, month: u32) -> Result<Self, AnalyticsError> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::InvalidMonth(month));
        }
        let start =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(AnalyticsError::UnsupportedYear(year))?;
        let (next_year, next_month) = if month == 12 {
            let next_year = year
                .checked_add(1)
                .ok_or(AnalyticsError::UnsupportedYear(year))?;
            (next_year, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .ok_or(AnalyticsError::UnsupportedYear(year))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Fatal parameter errors, raised before any aggregation starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("analysis window ends ({end}) before it starts ({start})")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("year {0} is outside the supported calendar range")]
    UnsupportedYear(i32),
    #[error("analysis region must not be empty")]
    EmptyRegion,
}
