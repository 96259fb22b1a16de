use crate::chart::{bar_chart, series_points, Chart, ChartKind, ChartSeries, ChartSpec, Mark};
use crate::error::DashboardError;
use crate::format::ValueFormat;
use analytics::{apply_filters, display_series, price_to_book_series, Choice, Selection, Series};
use chrono::{DateTime, Utc};
use configuration::DisplayConfig;
use core_types::{FundamentalsRecord, GroupKey, Measure, Quarter, SortOrder};
use dataset::Dataset;
use serde::Serialize;
use tracing::{info, warn};

/// The controls of the sector view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorQuery {
    pub sector: String,
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub symbol: Choice,
}

impl SectorQuery {
    pub fn new(sector: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            year: None,
            quarter: None,
            symbol: Choice::All,
        }
    }

    pub fn selection(&self) -> Selection {
        let mut builder = Selection::builder()
            .sector(self.sector.clone())
            .symbol_choice(self.symbol.clone());
        if let Some(year) = self.year {
            builder = builder.year(year);
        }
        if let Some(quarter) = &self.quarter {
            builder = builder.quarter(quarter.clone());
        }
        builder.build()
    }
}

/// Per-symbol comparison of one sector for a period.
#[derive(Debug, Clone, Serialize)]
pub struct SectorDashboard {
    pub query: SectorQuery,
    pub rows: usize,
    pub generated_at: DateTime<Utc>,
    pub charts: Vec<Chart>,
}

/// Builds the sector view. Every chart is keyed by symbol and sorted
/// ascending by value.
pub fn sector_dashboard(
    dataset: &Dataset,
    query: &SectorQuery,
    display: &DisplayConfig,
) -> Result<SectorDashboard, DashboardError> {
    let rows = apply_filters(dataset.records(), &query.selection());
    if rows.is_empty() {
        warn!(sector = %query.sector, "Selection matched no rows.");
        return Err(DashboardError::NoData(format!("sector '{}'", query.sector)));
    }

    let value = ValueFormat::fixed(display.decimals);
    let ratio = ValueFormat::fixed(display.ratio_decimals);
    let by_symbol = |measure: Measure| display_series(rows.iter().copied(), GroupKey::Symbol, measure);

    let price = by_symbol(Measure::Price);
    let book_value = by_symbol(Measure::BookValue);
    let pbv = price_to_book_series(&price, &book_value);

    let chart = |series: &Series, spec: ChartSpec| bar_chart(series_points(series), &spec.with_format(value));

    let charts = vec![
        chart(&price, ChartSpec::for_measure(Measure::Price).titled("Last Traded Price")),
        chart(&book_value, ChartSpec::for_measure(Measure::BookValue)),
        bar_chart(
            series_points(&pbv),
            &ChartSpec::new("PBV", "PBV (Price to Book Value)").with_format(ratio),
        ),
        chart(&by_symbol(Measure::PublicShares), ChartSpec::for_measure(Measure::PublicShares)),
        chart(&by_symbol(Measure::PaidUpCapital), ChartSpec::for_measure(Measure::PaidUpCapital)),
        eps_vs_dps(&rows, value),
        chart(&by_symbol(Measure::Pe), ChartSpec::for_measure(Measure::Pe)),
        chart(&by_symbol(Measure::NetProfit), ChartSpec::for_measure(Measure::NetProfit)),
        chart(&by_symbol(Measure::Reserve), ChartSpec::for_measure(Measure::Reserve)),
        chart(&by_symbol(Measure::Npl), ChartSpec::for_measure(Measure::Npl)),
        chart(&by_symbol(Measure::Eps), ChartSpec::for_measure(Measure::Eps)),
        chart(&by_symbol(Measure::Dps), ChartSpec::for_measure(Measure::Dps)),
    ];

    info!(sector = %query.sector, rows = rows.len(), "Built sector dashboard.");
    Ok(SectorDashboard {
        query: query.clone(),
        rows: rows.len(),
        generated_at: Utc::now(),
        charts,
    })
}

/// Mean EPS and DPS side by side, both ordered by symbol so the bars pair up.
fn eps_vs_dps(rows: &[&FundamentalsRecord], format: ValueFormat) -> Chart {
    let series = [Measure::Eps, Measure::Dps]
        .into_iter()
        .map(|measure| {
            let points = display_series(rows.iter().copied(), GroupKey::Symbol, measure).sorted(SortOrder::Key);
            ChartSeries::new(measure.label(), Mark::Bar, series_points(&points), format)
        })
        .collect();
    Chart::multi(ChartKind::Grouped, "EPS vs DPS", "Symbol", series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(symbol: &str, sector: &str) -> FundamentalsRecord {
        FundamentalsRecord::new(symbol, sector, 2023, Quarter::Number(1))
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            row("AAA", "Bank")
                .with(Measure::Price, dec!(100))
                .with(Measure::BookValue, dec!(50))
                .with(Measure::Eps, dec!(12))
                .with(Measure::Dps, dec!(4))
                .with(Measure::PaidUpCapital, dec!(1500)),
            row("BBB", "Bank")
                .with(Measure::Price, dec!(80))
                .with(Measure::BookValue, dec!(40))
                .with(Measure::Eps, dec!(9))
                .with(Measure::PaidUpCapital, dec!(900)),
            row("CCC", "Bank").with(Measure::Price, dec!(300)).with(Measure::BookValue, dec!(0)),
            row("HHH", "Hydro").with(Measure::Price, dec!(400)),
        ])
    }

    fn find<'a>(dashboard: &'a SectorDashboard, title: &str) -> &'a Chart {
        dashboard
            .charts
            .iter()
            .find(|c| c.title == title)
            .unwrap_or_else(|| panic!("missing chart {title}"))
    }

    fn labels(chart: &Chart) -> Vec<(&str, &str)> {
        chart.series[0]
            .points
            .iter()
            .map(|p| (p.label.as_str(), p.text.as_str()))
            .collect()
    }

    #[test]
    fn builds_every_sector_chart() {
        let mut query = SectorQuery::new("Bank");
        query.year = Some(2023);
        query.quarter = Some(Quarter::Number(1));
        let dashboard = sector_dashboard(&dataset(), &query, &DisplayConfig::default()).unwrap();

        assert_eq!(dashboard.rows, 3);
        let titles: Vec<_> = dashboard.charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Last Traded Price",
                "Book Value",
                "PBV (Price to Book Value)",
                "Public Shares",
                "Paid-Up Capital",
                "EPS vs DPS",
                "PE Ratio",
                "Net Profit",
                "Reserve",
                "NPL",
                "EPS",
                "DPS",
            ]
        );
    }

    #[test]
    fn pbv_skips_zero_book_value_and_uses_ratio_decimals() {
        let dashboard = sector_dashboard(&dataset(), &SectorQuery::new("Bank"), &DisplayConfig::default()).unwrap();
        let pbv = find(&dashboard, "PBV (Price to Book Value)");
        assert_eq!(labels(pbv), vec![("AAA", "2.0"), ("BBB", "2.0")]);
    }

    #[test]
    fn paid_up_capital_is_scaled_and_sorted() {
        let dashboard = sector_dashboard(&dataset(), &SectorQuery::new("Bank"), &DisplayConfig::default()).unwrap();
        let paid_up = find(&dashboard, "Paid-Up Capital");
        // CCC has no paid-up figure and sums to zero.
        assert_eq!(
            labels(paid_up),
            vec![("CCC", "0.00"), ("BBB", "900000.00"), ("AAA", "1500000.00")]
        );
    }

    #[test]
    fn eps_and_dps_pair_up_by_symbol() {
        let dashboard = sector_dashboard(&dataset(), &SectorQuery::new("Bank"), &DisplayConfig::default()).unwrap();
        let chart = find(&dashboard, "EPS vs DPS");
        assert_eq!(chart.kind, ChartKind::Grouped);
        let rows = chart.rows();
        assert_eq!(rows[0].label, "AAA");
        assert_eq!(rows[0].cells, vec![Some("12.00".to_string()), Some("4.00".to_string())]);
        assert_eq!(rows[1].cells, vec![Some("9.00".to_string()), None]);
    }

    #[test]
    fn one_symbol_narrows_every_chart() {
        let mut query = SectorQuery::new("Bank");
        query.symbol = Choice::one("BBB");
        let dashboard = sector_dashboard(&dataset(), &query, &DisplayConfig::default()).unwrap();
        assert_eq!(dashboard.rows, 1);
        assert_eq!(labels(find(&dashboard, "Last Traded Price")), vec![("BBB", "80.00")]);
    }

    #[test]
    fn an_empty_selection_is_no_data() {
        let mut query = SectorQuery::new("Bank");
        query.year = Some(1999);
        let err = sector_dashboard(&dataset(), &query, &DisplayConfig::default()).unwrap_err();
        assert!(err.is_no_data());
    }
}
