use core_types::{FundamentalsRecord, Measure, Period, Quarter};
use rust_decimal::Decimal;

/// One symbol's history for a single quarter, oldest year first.
///
/// The view only borrows the matching rows. Iterating builds points on the
/// fly and can be repeated any number of times. Years with no row are simply
/// absent; nothing is interpolated.
#[derive(Debug, Clone)]
pub struct TimeSeries<'a> {
    rows: Vec<&'a FundamentalsRecord>,
}

/// A point of a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint<'a> {
    pub record: &'a FundamentalsRecord,
}

impl<'a> TimePoint<'a> {
    pub fn year(&self) -> i32 {
        self.record.year
    }

    pub fn period(&self) -> Period {
        self.record.period()
    }

    /// The "Quarter-Year" axis label, e.g. `1-2023`.
    pub fn timeframe(&self) -> String {
        self.period().to_string()
    }

    pub fn value(&self, measure: Measure) -> Option<Decimal> {
        self.record.value(measure)
    }

    pub fn display_value(&self, measure: Measure) -> Option<Decimal> {
        self.record.display_value(measure)
    }
}

/// Builds the history of `symbol` in `quarter`, ordered by year ascending.
/// Rows sharing a year keep their input order.
pub fn time_series<'a>(records: &'a [FundamentalsRecord], symbol: &str, quarter: &Quarter) -> TimeSeries<'a> {
    let mut rows: Vec<_> = records
        .iter()
        .filter(|r| r.symbol == symbol && &r.quarter == quarter)
        .collect();
    rows.sort_by_key(|r| r.year);
    TimeSeries { rows }
}

impl<'a> TimeSeries<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TimePoint<'a>> + '_ {
        self.into_iter()
    }

    /// `(timeframe, display value)` pairs for one measure.
    pub fn values(&self, measure: Measure) -> impl Iterator<Item = (String, Option<Decimal>)> + '_ {
        self.iter().map(move |p| (p.timeframe(), p.display_value(measure)))
    }
}

impl<'s, 'a> IntoIterator for &'s TimeSeries<'a> {
    type Item = TimePoint<'a>;
    type IntoIter = std::iter::Map<
        std::slice::Iter<'s, &'a FundamentalsRecord>,
        fn(&&'a FundamentalsRecord) -> TimePoint<'a>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        let to_point: fn(&&'a FundamentalsRecord) -> TimePoint<'a> = to_point;
        self.rows.iter().map(to_point)
    }
}

fn to_point<'a>(record: &&'a FundamentalsRecord) -> TimePoint<'a> {
    TimePoint { record }
}
