use core_types::{FundamentalsRecord, Period, Quarter};
use itertools::Itertools;
use serde::Serialize;

/// A row that was dropped while loading, with its 1-based CSV line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// The fundamentals sheet held in memory for a session.
///
/// Records keep their file order, which is what "latest" means below.
/// Nothing mutates a `Dataset` after it is built; narrowing it produces a new one.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<FundamentalsRecord>,
    row_errors: Vec<RowError>,
}

/// The option lists a selection UI offers, derived from the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub rows: usize,
    pub sectors: Vec<String>,
    pub years: Vec<i32>,
    pub quarters: Vec<Quarter>,
    pub symbols: Vec<String>,
    pub latest_period: Option<Period>,
}

impl Dataset {
    pub fn new(records: Vec<FundamentalsRecord>) -> Self {
        Self {
            records,
            row_errors: Vec::new(),
        }
    }

    pub(crate) fn with_row_errors(records: Vec<FundamentalsRecord>, row_errors: Vec<RowError>) -> Self {
        Self { records, row_errors }
    }

    pub fn records(&self) -> &[FundamentalsRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row_errors(&self) -> &[RowError] {
        &self.row_errors
    }

    /// Distinct non-blank sectors, sorted.
    pub fn sectors(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.sector.as_str())
            .filter(|s| !s.is_empty())
            .unique()
            .sorted()
            .map(str::to_string)
            .collect()
    }

    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.year).unique().sorted().collect()
    }

    pub fn quarters(&self) -> Vec<Quarter> {
        self.records
            .iter()
            .map(|r| &r.quarter)
            .unique()
            .sorted()
            .cloned()
            .collect()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.symbol.as_str())
            .unique()
            .sorted()
            .map(str::to_string)
            .collect()
    }

    pub fn symbols_in_sector(&self, sector: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.sector == sector)
            .map(|r| r.symbol.as_str())
            .unique()
            .sorted()
            .map(str::to_string)
            .collect()
    }

    /// The period of the last row in file order, used as the default
    /// year/quarter selection. Sheets are appended to as quarters are
    /// published, so the last row is the newest filing.
    pub fn latest_period(&self) -> Option<Period> {
        self.records.last().map(FundamentalsRecord::period)
    }

    /// The newest period by year, then quarter, wherever its rows sit in the
    /// file.
    pub fn max_period(&self) -> Option<Period> {
        self.records.iter().map(FundamentalsRecord::period).max()
    }

    /// A copy of the dataset without rows from the given sectors.
    pub fn without_sectors(&self, excluded: &[String]) -> Dataset {
        let records: Vec<_> = self
            .records
            .iter()
            .filter(|r| !excluded.contains(&r.sector))
            .cloned()
            .collect();
        tracing::debug!(
            excluded = ?excluded,
            removed = self.records.len() - records.len(),
            "Removed excluded sectors."
        );
        Dataset {
            records,
            row_errors: self.row_errors.clone(),
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog {
            rows: self.len(),
            sectors: self.sectors(),
            years: self.years(),
            quarters: self.quarters(),
            symbols: self.symbols(),
            latest_period: self.latest_period(),
        }
    }
}
