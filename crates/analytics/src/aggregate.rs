use core_types::{price_to_book, AggregationMethod, FundamentalsRecord, GroupKey, Measure, Quarter, SortOrder};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// The value a series point is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    Symbol(String),
    Year(i32),
    Quarter(Quarter),
}

impl GroupValue {
    fn of(record: &FundamentalsRecord, key: GroupKey) -> Self {
        match key {
            GroupKey::Symbol => GroupValue::Symbol(record.symbol.clone()),
            GroupKey::Year => GroupValue::Year(record.year),
            GroupKey::Quarter => GroupValue::Quarter(record.quarter.clone()),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Symbol(symbol) => f.write_str(symbol),
            GroupValue::Year(year) => write!(f, "{year}"),
            GroupValue::Quarter(quarter) => write!(f, "{quarter}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub key: GroupValue,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// An ordered group-key → value mapping, ready to be charted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Series {
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesPoint> {
        self.points.iter()
    }

    pub fn get(&self, key: &GroupValue) -> Option<Decimal> {
        self.points.iter().find(|p| &p.key == key).map(|p| p.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupValue> {
        self.points.iter().map(|p| &p.key)
    }

    /// Re-orders the series ascending by value or by key. Ties on value keep
    /// key order.
    pub fn sorted(mut self, order: SortOrder) -> Self {
        match order {
            SortOrder::Value => self
                .points
                .sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.key.cmp(&b.key))),
            SortOrder::Key => self.points.sort_by(|a, b| a.key.cmp(&b.key)),
        }
        self
    }

    /// Multiplies every value by `factor`. A point whose product does not
    /// fit in a `Decimal` is dropped.
    pub fn scaled(mut self, factor: Decimal) -> Self {
        self.points.retain_mut(|point| match point.value.checked_mul(factor) {
            Some(value) => {
                point.value = value;
                true
            }
            None => {
                warn!(key = %point.key, %factor, "Scaled value overflowed; point dropped.");
                false
            }
        });
        self
    }

    pub fn to_map(&self) -> BTreeMap<GroupValue, Decimal> {
        self.points.iter().map(|p| (p.key.clone(), p.value)).collect()
    }
}

#[derive(Default)]
struct Accumulator {
    sum: Decimal,
    count: usize,
    overflowed: bool,
}

impl Accumulator {
    fn add(&mut self, value: Decimal) {
        match self.sum.checked_add(value) {
            Some(sum) => self.sum = sum,
            None => self.overflowed = true,
        }
        self.count += 1;
    }
}

/// Groups `records` by `key` and combines `measure` with `method`.
///
/// Missing values are skipped. A group whose values are all missing sums to
/// zero, but has no mean and is left out of a mean series. A group whose
/// total overflows is left out as well. The result is sorted ascending by
/// value.
pub fn aggregate<'a, I>(records: I, key: GroupKey, measure: Measure, method: AggregationMethod) -> Series
where
    I: IntoIterator<Item = &'a FundamentalsRecord>,
{
    let mut groups: BTreeMap<GroupValue, Accumulator> = BTreeMap::new();
    for record in records {
        let acc = groups.entry(GroupValue::of(record, key)).or_default();
        if let Some(value) = record.value(measure) {
            acc.add(value);
        }
    }

    let points = groups
        .into_iter()
        .filter_map(|(key, acc)| {
            if acc.overflowed {
                warn!(%key, ?measure, "Group total overflowed; group dropped.");
                return None;
            }
            let value = match method {
                AggregationMethod::Sum => Some(acc.sum),
                AggregationMethod::Mean if acc.count == 0 => None,
                AggregationMethod::Mean => acc.sum.checked_div(Decimal::from(acc.count)),
            }?;
            Some(SeriesPoint { key, value })
        })
        .collect();

    let series = Series { points }.sorted(SortOrder::Value);
    debug!(?key, ?measure, ?method, groups = series.len(), "Aggregated measure.");
    series
}

/// Aggregates with the measure's own method and undoes its storage scale,
/// giving the values a chart should show.
pub fn display_series<'a, I>(records: I, key: GroupKey, measure: Measure) -> Series
where
    I: IntoIterator<Item = &'a FundamentalsRecord>,
{
    scale_for_display(aggregate(records, key, measure, measure.default_method()), measure)
}

/// Applies the ×1000 correction to paid-up capital and net profit; a no-op
/// for every other measure. Kept apart from [`aggregate`] so that
/// re-aggregating a series never scales it twice.
pub fn scale_for_display(series: Series, measure: Measure) -> Series {
    let factor = measure.display_scale();
    if factor == Decimal::ONE {
        series
    } else {
        series.scaled(factor)
    }
}

/// Price-to-book per group from already aggregated price and book value.
///
/// Values are rounded to one decimal. Groups missing either side, or with a
/// zero book value, are dropped. The result is sorted ascending by value.
pub fn price_to_book_series(price: &Series, book_value: &Series) -> Series {
    let book = book_value.to_map();
    let points = price
        .iter()
        .filter_map(|p| {
            let ratio = price_to_book(Some(p.value), book.get(&p.key).copied())?;
            Some(SeriesPoint {
                key: p.key.clone(),
                value: ratio,
            })
        })
        .collect();
    Series { points }.sorted(SortOrder::Value)
}
