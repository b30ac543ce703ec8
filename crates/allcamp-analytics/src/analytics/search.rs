use super::domain::{SearchChannels, SearchFacets, SearchRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSearchVolume {
    pub cell_id: String,
    pub searchers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentSearchVolume {
    pub parent_id: String,
    pub searchers: u64,
    pub rv_searchers: u64,
    pub tent_searchers: u64,
}

/// Where searchers come from and where they want to go.
///
/// Every ranked list is sorted by searchers, highest first, ties broken by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub total_searchers: u64,
    pub distinct_origins: usize,
    pub by_destination: Vec<CellSearchVolume>,
    pub by_origin: Vec<CellSearchVolume>,
    pub by_destination_parent: Vec<ParentSearchVolume>,
    pub by_origin_parent: Vec<ParentSearchVolume>,
    pub channels: SearchChannels,
    pub facets: SearchFacets,
}

impl SearchSummary {
    /// Keeps only the first `limit` entries of every ranked list. Totals are untouched.
    pub fn truncate(&mut self, limit: usize) {
        self.by_destination.truncate(limit);
        self.by_origin.truncate(limit);
        self.by_destination_parent.truncate(limit);
        self.by_origin_parent.truncate(limit);
    }
}

#[derive(Debug, Default)]
struct ParentTotals {
    searchers: u64,
    rv: u64,
    tent: u64,
}

impl ParentTotals {
    fn add(&mut self, record: &SearchRecord) {
        self.searchers = self.searchers.saturating_add(record.searchers);
        self.rv = self.rv.saturating_add(record.facets.rv);
        self.tent = self.tent.saturating_add(record.facets.tent);
    }
}

pub fn summarize_searches(records: &[SearchRecord]) -> SearchSummary {
    let mut total_searchers = 0u64;
    let mut origins: HashSet<&str> = HashSet::new();
    let mut by_destination: BTreeMap<&str, u64> = BTreeMap::new();
    let mut by_origin: BTreeMap<&str, u64> = BTreeMap::new();
    let mut by_destination_parent: BTreeMap<&str, ParentTotals> = BTreeMap::new();
    let mut by_origin_parent: BTreeMap<&str, ParentTotals> = BTreeMap::new();
    let mut channels = SearchChannels::default();
    let mut facets = SearchFacets::default();

    for record in records {
        total_searchers = total_searchers.saturating_add(record.searchers);
        origins.insert(record.origin_cell.as_str());
        add_searchers(&mut by_destination, &record.destination_cell, record.searchers);
        add_searchers(&mut by_origin, &record.origin_cell, record.searchers);

        if let Some(parent) = record.destination_parent.as_deref() {
            by_destination_parent.entry(parent).or_default().add(record);
        }
        if let Some(parent) = record.origin_parent.as_deref() {
            by_origin_parent.entry(parent).or_default().add(record);
        }

        channels.accumulate(&record.channels);
        facets.accumulate(&record.facets);
    }

    SearchSummary {
        total_searchers,
        distinct_origins: origins.len(),
        by_destination: rank_cells(by_destination),
        by_origin: rank_cells(by_origin),
        by_destination_parent: rank_parents(by_destination_parent),
        by_origin_parent: rank_parents(by_origin_parent),
        channels,
        facets,
    }
}

fn add_searchers<'a>(totals: &mut BTreeMap<&'a str, u64>, cell_id: &'a str, searchers: u64) {
    let total = totals.entry(cell_id).or_default();
    *total = total.saturating_add(searchers);
}

fn rank_cells(totals: BTreeMap<&str, u64>) -> Vec<CellSearchVolume> {
    let mut ranked: Vec<CellSearchVolume> = totals
        .into_iter()
        .map(|(cell_id, searchers)| CellSearchVolume {
            cell_id: cell_id.to_string(),
            searchers,
        })
        .collect();
    // BTreeMap already yields ids in order, so a stable sort keeps id tie-breaks.
    ranked.sort_by(|a, b| b.searchers.cmp(&a.searchers));
    ranked
}

fn rank_parents(totals: BTreeMap<&str, ParentTotals>) -> Vec<ParentSearchVolume> {
    let mut ranked: Vec<ParentSearchVolume> = totals
        .into_iter()
        .map(|(parent_id, totals)| ParentSearchVolume {
            parent_id: parent_id.to_string(),
            searchers: totals.searchers,
            rv_searchers: totals.rv,
            tent_searchers: totals.tent,
        })
        .collect();
    ranked.sort_by(|a, b| b.searchers.cmp(&a.searchers));
    ranked
}
