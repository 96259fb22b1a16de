use core_types::{coerce_decimal, BucketFilter, FundamentalsRecord, Quarter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A categorical choice: everything, or an explicit list.
///
/// `Only` with an empty list matches nothing, the same as a multi-select
/// control with every option cleared.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    #[default]
    All,
    Only(Vec<String>),
}

impl Choice {
    pub fn one(value: impl Into<String>) -> Self {
        Choice::Only(vec![value.into()])
    }

    /// Interprets a control value where the literal `"All"` means no restriction.
    pub fn from_control(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            Choice::All
        } else {
            Choice::one(trimmed)
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(values) => values.iter().any(|v| v == value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    fn push(&mut self, value: String) {
        match self {
            Choice::All => *self = Choice::Only(vec![value]),
            Choice::Only(values) => values.push(value),
        }
    }
}

/// An inclusive numeric range with optional ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub lower: Option<Decimal>,
    pub upper: Option<Decimal>,
}

impl ValueRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(lower: Option<Decimal>, upper: Option<Decimal>) -> Self {
        Self { lower, upper }
    }

    /// Builds a range from free-text inputs. Text that is not a number,
    /// including the placeholder `"All"`, leaves that end open.
    pub fn parse(lower: &str, upper: &str) -> Self {
        Self {
            lower: coerce_decimal(lower),
            upper: coerce_decimal(upper),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// An unbounded range admits anything, missing values included. A
    /// bounded range never admits a missing value.
    pub fn contains(&self, value: Option<Decimal>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        self.lower.is_none_or(|lower| value >= lower) && self.upper.is_none_or(|upper| value <= upper)
    }
}

/// One independent condition of a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Sector(Choice),
    Year(i32),
    Quarter(Quarter),
    Symbol(Choice),
    Price(ValueRange),
    BookValue(ValueRange),
    Eps(BucketFilter),
    Dps(BucketFilter),
}

impl Predicate {
    pub fn matches(&self, record: &FundamentalsRecord) -> bool {
        match self {
            Predicate::Sector(choice) => choice.allows(&record.sector),
            Predicate::Year(year) => record.year == *year,
            Predicate::Quarter(quarter) => record.quarter == *quarter,
            Predicate::Symbol(choice) => choice.allows(&record.symbol),
            Predicate::Price(range) => range.contains(record.price),
            Predicate::BookValue(range) => range.contains(record.book_value),
            Predicate::Eps(bucket) => bucket.matches(record.eps),
            Predicate::Dps(bucket) => bucket.matches(record.dps),
        }
    }
}

/// Everything a user has picked in the selection controls.
///
/// A selection is an immutable value passed into the filter pipeline; every
/// field defaults to "no restriction".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub sector: Choice,
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub symbol: Choice,
    pub price: ValueRange,
    pub book_value: ValueRange,
    pub eps: BucketFilter,
    pub dps: BucketFilter,
}

impl Selection {
    pub fn builder() -> SelectionBuilder {
        SelectionBuilder::default()
    }

    /// The restricting conditions of this selection. Identity conditions
    /// ("All", open ranges) are left out, so an empty list means the
    /// selection admits every row.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if !self.sector.is_all() {
            predicates.push(Predicate::Sector(self.sector.clone()));
        }
        if let Some(year) = self.year {
            predicates.push(Predicate::Year(year));
        }
        if let Some(quarter) = &self.quarter {
            predicates.push(Predicate::Quarter(quarter.clone()));
        }
        if !self.symbol.is_all() {
            predicates.push(Predicate::Symbol(self.symbol.clone()));
        }
        if !self.price.is_unbounded() {
            predicates.push(Predicate::Price(self.price));
        }
        if !self.book_value.is_unbounded() {
            predicates.push(Predicate::BookValue(self.book_value));
        }
        if self.eps != BucketFilter::All {
            predicates.push(Predicate::Eps(self.eps));
        }
        if self.dps != BucketFilter::All {
            predicates.push(Predicate::Dps(self.dps));
        }
        predicates
    }

    pub fn matches(&self, record: &FundamentalsRecord) -> bool {
        self.predicates().iter().all(|p| p.matches(record))
    }
}

/// Builder for [`Selection`].
#[derive(Debug, Clone, Default)]
pub struct SelectionBuilder {
    selection: Selection,
}

impl SelectionBuilder {
    /// Adds a sector; repeated calls select several.
    pub fn sector(mut self, sector: impl Into<String>) -> Self {
        self.selection.sector.push(sector.into());
        self
    }

    pub fn sectors<I, S>(mut self, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.sector = Choice::Only(sectors.into_iter().map(Into::into).collect());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.selection.year = Some(year);
        self
    }

    pub fn quarter(mut self, quarter: Quarter) -> Self {
        self.selection.quarter = Some(quarter);
        self
    }

    /// Adds a symbol; repeated calls select several.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.selection.symbol.push(symbol.into());
        self
    }

    pub fn symbol_choice(mut self, choice: Choice) -> Self {
        self.selection.symbol = choice;
        self
    }

    pub fn price(mut self, range: ValueRange) -> Self {
        self.selection.price = range;
        self
    }

    pub fn book_value(mut self, range: ValueRange) -> Self {
        self.selection.book_value = range;
        self
    }

    pub fn eps(mut self, bucket: BucketFilter) -> Self {
        self.selection.eps = bucket;
        self
    }

    pub fn dps(mut self, bucket: BucketFilter) -> Self {
        self.selection.dps = bucket;
        self
    }

    pub fn build(self) -> Selection {
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unparsable_bounds_leave_the_range_open() {
        let range = ValueRange::parse("All", "abc");
        assert!(range.is_unbounded());

        let range = ValueRange::parse(" 100 ", "All");
        assert_eq!(range.lower, Some(dec!(100)));
        assert_eq!(range.upper, None);
    }

    #[test]
    fn ranges_are_inclusive() {
        let range = ValueRange::between(Some(dec!(100)), Some(dec!(200)));
        assert!(range.contains(Some(dec!(100))));
        assert!(range.contains(Some(dec!(200))));
        assert!(!range.contains(Some(dec!(99.99))));
        assert!(!range.contains(Some(dec!(200.01))));
    }

    #[test]
    fn missing_values_only_pass_open_ranges() {
        assert!(ValueRange::unbounded().contains(None));
        assert!(!ValueRange::between(Some(dec!(0)), None).contains(None));
    }

    #[test]
    fn builder_accumulates_sectors_and_symbols() {
        let selection = Selection::builder()
            .sector("Bank")
            .sector("Hydro")
            .symbol("NABIL")
            .year(2023)
            .build();
        assert_eq!(
            selection.sector,
            Choice::Only(vec!["Bank".to_string(), "Hydro".to_string()])
        );
        assert_eq!(selection.symbol, Choice::one("NABIL"));
        assert_eq!(selection.predicates().len(), 3);
    }

    #[test]
    fn default_selection_has_no_predicates() {
        assert!(Selection::default().predicates().is_empty());
        let all_buckets = Selection::builder()
            .eps(BucketFilter::All)
            .dps(BucketFilter::All)
            .price(ValueRange::parse("All", "All"))
            .build();
        assert!(all_buckets.predicates().is_empty());
    }

    #[test]
    fn control_values_map_all_to_no_restriction() {
        assert_eq!(Choice::from_control("All"), Choice::All);
        assert_eq!(Choice::from_control("NABIL"), Choice::one("NABIL"));
    }

    #[test]
    fn an_empty_multi_select_matches_nothing() {
        let choice = Choice::Only(Vec::new());
        assert!(!choice.allows("Bank"));
    }
}
