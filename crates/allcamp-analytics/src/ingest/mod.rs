//! CSV ingestion for the campground, booking, and search exports.
//!
//! Readers are lenient about values (blank counts are zero, unreadable dates
//! are missing) and strict about shape (required columns must be present,
//! numbers must parse).

mod normalizer;
mod parser;

use crate::analytics::{Facility, SearchRecord, Transaction};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const FACILITIES_FILE: &str = "campgrounds.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const SEARCHES_FILE: &str = "searches.csv";

#[derive(Debug)]
pub enum IngestError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },
    Source {
        path: PathBuf,
        source: Box<IngestError>,
    },
}

impl IngestError {
    fn at(path: &Path, source: IngestError) -> Self {
        Self::Source {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io(err) => write!(f, "failed to read export: {}", err),
            IngestError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            IngestError::MissingColumn { dataset, column } => {
                write!(f, "{} export is missing required column '{}'", dataset, column)
            }
            IngestError::Source { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(err) => Some(err),
            IngestError::Csv(err) => Some(err),
            IngestError::MissingColumn { .. } => None,
            IngestError::Source { source, .. } => Some(&**source),
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn read_facilities<R: Read>(reader: R) -> Result<Vec<Facility>, IngestError> {
    parser::parse_facilities(reader)
}

/// Unknown category labels are kept as `Unspecified` and reported once.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, IngestError> {
    let parsed = parser::parse_transactions(reader)?;
    let unknown = parsed.iter().filter(|row| row.unknown_category).count();
    if unknown > 0 {
        warn!(
            rows = unknown,
            "unrecognised campsite categories treated as unspecified"
        );
    }
    Ok(parsed.into_iter().map(|row| row.transaction).collect())
}

pub fn read_searches<R: Read>(reader: R) -> Result<Vec<SearchRecord>, IngestError> {
    parser::parse_searches(reader)
}

/// The three exports the engine works from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub facilities: Vec<Facility>,
    pub transactions: Vec<Transaction>,
    pub searches: Vec<SearchRecord>,
}

impl Dataset {
    /// Reads `campgrounds.csv`, `transactions.csv`, and `searches.csv` from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, IngestError> {
        let dir = dir.as_ref();
        let facilities = read_file(&dir.join(FACILITIES_FILE), read_facilities)?;
        let transactions = read_file(&dir.join(TRANSACTIONS_FILE), read_transactions)?;
        let searches = read_file(&dir.join(SEARCHES_FILE), read_searches)?;

        info!(
            dir = %dir.display(),
            facilities = facilities.len(),
            transactions = transactions.len(),
            searches = searches.len(),
            "loaded exports"
        );

        Ok(Self {
            facilities,
            transactions,
            searches,
        })
    }
}

fn read_file<T>(
    path: &Path,
    read: fn(std::fs::File) -> Result<Vec<T>, IngestError>,
) -> Result<Vec<T>, IngestError> {
    let file = std::fs::File::open(path).map_err(|err| IngestError::at(path, err.into()))?;
    read(file).map_err(|err| IngestError::at(path, err))
}
