use super::normalizer::{normalize_identifier, normalize_label};
use super::IngestError;
use crate::analytics::{
    BookingCategory, Facility, SearchChannels, SearchFacets, SearchRecord, SiteCounts, Transaction,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) const FACILITY_COLUMNS: &[&str] = &[
    "campground_uuid",
    "campground_h3_hexagon_id_l4",
    "went_live_date",
    "number_of_sites",
];

pub(crate) const TRANSACTION_COLUMNS: &[&str] = &[
    "booking_uuid",
    "campground_uuid",
    "h3_hexagon_id_l4",
    "trip_checkin_date",
    "trip_checkout_date",
    "trip_total_cost",
    "campsite_category",
    "is_booking_canceled",
];

pub(crate) const SEARCH_COLUMNS: &[&str] =
    &["destination_h3_cell_id", "origin_h3_cell_id", "searchers"];

/// Parsed transaction plus whether its category label was recognised.
#[derive(Debug)]
pub(crate) struct ParsedTransaction {
    pub(crate) transaction: Transaction,
    pub(crate) unknown_category: bool,
}

pub(crate) fn parse_facilities<R: Read>(reader: R) -> Result<Vec<Facility>, IngestError> {
    let mut csv_reader = reader_for(reader);
    require_columns(&mut csv_reader, "campgrounds", FACILITY_COLUMNS)?;

    let mut facilities = Vec::new();
    for record in csv_reader.deserialize::<FacilityRow>() {
        facilities.push(record?.into_facility());
    }
    Ok(facilities)
}

pub(crate) fn parse_transactions<R: Read>(
    reader: R,
) -> Result<Vec<ParsedTransaction>, IngestError> {
    let mut csv_reader = reader_for(reader);
    require_columns(&mut csv_reader, "transactions", TRANSACTION_COLUMNS)?;

    let mut transactions = Vec::new();
    for record in csv_reader.deserialize::<TransactionRow>() {
        transactions.push(record?.into_parsed());
    }
    Ok(transactions)
}

pub(crate) fn parse_searches<R: Read>(reader: R) -> Result<Vec<SearchRecord>, IngestError> {
    let mut csv_reader = reader_for(reader);
    require_columns(&mut csv_reader, "searches", SEARCH_COLUMNS)?;

    let mut searches = Vec::new();
    for record in csv_reader.deserialize::<SearchRow>() {
        searches.push(record?.into_record());
    }
    Ok(searches)
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn require_columns<R: Read>(
    csv_reader: &mut csv::Reader<R>,
    dataset: &'static str,
    required: &[&'static str],
) -> Result<(), IngestError> {
    let headers = csv_reader.headers()?;
    for &column in required {
        if !headers.iter().any(|header| header == column) {
            return Err(IngestError::MissingColumn { dataset, column });
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct FacilityRow {
    campground_uuid: String,
    campground_h3_hexagon_id_l4: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    went_live_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    first_booked_at_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    campground_state: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    campground_region: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    number_of_sites: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    tent_friendly_sites: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    rv_friendly_sites: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    structure_sites: u64,
}

impl FacilityRow {
    fn into_facility(self) -> Facility {
        Facility {
            facility_id: normalize_identifier(&self.campground_uuid),
            cell_id: normalize_identifier(&self.campground_h3_hexagon_id_l4),
            went_live_on: self.went_live_date.as_deref().and_then(parse_date),
            first_booked_on: self.first_booked_at_date.as_deref().and_then(parse_date),
            state: self.campground_state.as_deref().map(normalize_label),
            region: self.campground_region.as_deref().map(normalize_label),
            sites: SiteCounts {
                total: saturate(self.number_of_sites),
                tent: saturate(self.tent_friendly_sites),
                rv: saturate(self.rv_friendly_sites),
                structure: saturate(self.structure_sites),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    booking_uuid: String,
    campground_uuid: String,
    h3_hexagon_id_l4: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    trip_checkin_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    trip_checkout_date: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    trip_total_cost: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    campsite_category: Option<String>,
    #[serde(deserialize_with = "flag")]
    is_booking_canceled: bool,
}

impl TransactionRow {
    fn into_parsed(self) -> ParsedTransaction {
        let label = self.campsite_category.as_deref().unwrap_or_default();
        let category = BookingCategory::from_label(label);
        let unknown_category =
            category == BookingCategory::Unspecified && !label.trim().is_empty();

        ParsedTransaction {
            transaction: Transaction {
                booking_id: normalize_identifier(&self.booking_uuid),
                facility_id: normalize_identifier(&self.campground_uuid),
                cell_id: normalize_identifier(&self.h3_hexagon_id_l4),
                check_in: self.trip_checkin_date.as_deref().and_then(parse_date),
                check_out: self.trip_checkout_date.as_deref().and_then(parse_date),
                total_cost: self.trip_total_cost,
                category,
                canceled: self.is_booking_canceled,
            },
            unknown_category,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    destination_h3_cell_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    destination_h3_parent_id: Option<String>,
    origin_h3_cell_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    origin_h3_parent_id: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    rv_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    tent_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    glamping_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    family_friendly_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pet_friendly_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    good_for_groups_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    seo_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    paid_search_engine_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    social_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    sharing_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    direct_searchers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    other_channel_searchers: u64,
}

impl SearchRow {
    fn into_record(self) -> SearchRecord {
        SearchRecord {
            destination_cell: normalize_identifier(&self.destination_h3_cell_id),
            destination_parent: self
                .destination_h3_parent_id
                .as_deref()
                .map(normalize_identifier),
            origin_cell: normalize_identifier(&self.origin_h3_cell_id),
            origin_parent: self.origin_h3_parent_id.as_deref().map(normalize_identifier),
            searchers: self.searchers,
            facets: SearchFacets {
                rv: self.rv_searchers,
                tent: self.tent_searchers,
                glamping: self.glamping_searchers,
                family_friendly: self.family_friendly_searchers,
                pet_friendly: self.pet_friendly_searchers,
                good_for_groups: self.good_for_groups_searchers,
            },
            channels: SearchChannels {
                seo: self.seo_searchers,
                paid_search_engine: self.paid_search_engine_searchers,
                social: self.social_searchers,
                sharing: self.sharing_searchers,
                direct: self.direct_searchers,
                other: self.other_channel_searchers,
            },
        }
    }
}

fn saturate(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Whole-number counts that may be exported as floats (`12.0`). Blank or
/// negative values count as zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = lenient_amount(deserializer)?;
    if !amount.is_finite() {
        return Err(D::Error::custom(format!("count is not finite: {amount}")));
    }
    Ok(amount.max(0.0).round() as u64)
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none(deserializer)? {
        None => Ok(0.0),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, got '{raw}'"))),
    }
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none(deserializer)? {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "t" => Ok(true),
            "false" | "0" | "no" | "f" => Ok(false),
            _ => Err(D::Error::custom(format!("expected a boolean, got '{raw}'"))),
        },
    }
}

/// Dates arrive as plain dates, naive datetimes, or RFC 3339 timestamps.
/// Anything else is treated as missing.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_datetime(value).map(|dt| dt.date())
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
