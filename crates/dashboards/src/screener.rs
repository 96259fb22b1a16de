use crate::chart::{bar_chart, Chart, ChartSpec};
use crate::error::DashboardError;
use crate::format::ValueFormat;
use analytics::{apply_filters, Selection};
use chrono::{DateTime, Utc};
use configuration::DisplayConfig;
use core_types::{FundamentalsRecord, Measure, Period, Quarter};
use dataset::Dataset;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, warn};

/// One screened company. Values are as stored, without display scaling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenerRow {
    pub symbol: String,
    pub sector: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub book_value: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub pbv: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub eps: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub dps: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub pe: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub roe: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub npl: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub public_shares: Option<Decimal>,
}

impl From<&FundamentalsRecord> for ScreenerRow {
    fn from(record: &FundamentalsRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            sector: record.sector.clone(),
            price: record.price,
            book_value: record.book_value,
            pbv: record.price_to_book(),
            eps: record.eps,
            dps: record.dps,
            pe: record.pe,
            roe: record.roe,
            npl: record.npl,
            public_shares: record.public_shares,
        }
    }
}

/// Companies of one period passing the screen, cheapest first.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenerDashboard {
    pub period: Period,
    pub selection: Selection,
    pub rows: Vec<ScreenerRow>,
    pub generated_at: DateTime<Utc>,
    pub charts: Vec<Chart>,
}

/// Screens a single period. When the selection names no year or quarter,
/// the newest period in the dataset is used, whatever the row order. Rows are not aggregated: each
/// chart has one bar per row.
///
/// Sector exclusion happens before this point; pass a dataset that has
/// already dropped delisted sectors.
pub fn screener_dashboard(
    dataset: &Dataset,
    selection: &Selection,
    display: &DisplayConfig,
) -> Result<ScreenerDashboard, DashboardError> {
    let Some(latest) = dataset.max_period() else {
        return Err(DashboardError::NoData("an empty dataset".to_string()));
    };
    let period = Period {
        year: selection.year.unwrap_or(latest.year),
        quarter: selection.quarter.clone().unwrap_or(latest.quarter),
    };
    let selection = Selection {
        year: Some(period.year),
        quarter: Some(period.quarter.clone()),
        ..selection.clone()
    };

    let mut rows = apply_filters(dataset.records(), &selection);
    if rows.is_empty() {
        warn!(%period, "Screen matched no rows.");
        return Err(DashboardError::NoData(format!("the screen in {period}")));
    }
    rows.sort_by(|a, b| missing_last(a.price, b.price));

    let value = ValueFormat::fixed(display.decimals);
    let ratio = ValueFormat::fixed(display.ratio_decimals);
    let tag = period_tag(&period);

    let chart = |field: &str, title: String, format: ValueFormat, pick: fn(&FundamentalsRecord) -> Option<Decimal>| {
        let points = rows.iter().filter_map(|r| pick(r).map(|v| (r.symbol.as_str(), v)));
        bar_chart(points, &ChartSpec::new(field, title).with_format(format))
    };

    let charts = vec![
        chart("Price", "Current Price".to_string(), value, |r| r.price),
        chart("EPS", format!("EPS {tag}"), value, |r| r.eps),
        chart("PE", format!("PE {tag}"), value, |r| r.pe),
        chart("PBV", "PBV (Price / Book Value)".to_string(), ratio, FundamentalsRecord::price_to_book),
        chart("Book Value", Measure::BookValue.label().to_string(), value, |r| r.book_value),
        chart("Public Shares", Measure::PublicShares.label().to_string(), value, |r| r.public_shares),
        chart("ROE", Measure::Roe.label().to_string(), value, |r| r.roe),
        chart("NPL", Measure::Npl.label().to_string(), value, |r| r.npl),
        chart("DPS", format!("DPS {tag}"), value, |r| r.dps),
    ];

    info!(%period, rows = rows.len(), "Built screener dashboard.");
    Ok(ScreenerDashboard {
        period,
        rows: rows.iter().map(|r| ScreenerRow::from(*r)).collect(),
        selection,
        generated_at: Utc::now(),
        charts,
    })
}

/// `2023 Q1`; quarters already labelled `Q1` are not prefixed twice.
fn period_tag(period: &Period) -> String {
    match &period.quarter {
        Quarter::Number(n) => format!("{} Q{n}", period.year),
        Quarter::Label(label) => format!("{} {label}", period.year),
    }
}

fn missing_last(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
