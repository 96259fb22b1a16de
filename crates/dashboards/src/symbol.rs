use crate::chart::{bar_chart, series_points, Chart, ChartKind, ChartSeries, ChartSpec, Mark};
use crate::error::DashboardError;
use crate::format::ValueFormat;
use analytics::{aggregate, apply_filters, display_series, time_series, Selection, TimeSeries};
use chrono::{DateTime, Utc};
use configuration::DisplayConfig;
use core_types::{AggregationMethod, GroupKey, Measure, Quarter, SortOrder};
use dataset::Dataset;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

const TIMEFRAME: &str = "Timeframe";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolQuery {
    pub symbol: String,
    pub quarter: Quarter,
}

/// The history of one symbol, quarter by quarter over the years.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolDashboard {
    pub query: SymbolQuery,
    /// Price on the first row matching the query, in file order.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub current_price: Option<Decimal>,
    /// The newest year in the dataset, used by the per-quarter charts.
    pub latest_year: Option<i32>,
    pub generated_at: DateTime<Utc>,
    pub charts: Vec<Chart>,
}

pub fn symbol_dashboard(
    dataset: &Dataset,
    query: &SymbolQuery,
    display: &DisplayConfig,
) -> Result<SymbolDashboard, DashboardError> {
    let selection = Selection::builder()
        .symbol(query.symbol.clone())
        .quarter(query.quarter.clone())
        .build();
    let matching = apply_filters(dataset.records(), &selection);
    let Some(first) = matching.first() else {
        warn!(symbol = %query.symbol, quarter = %query.quarter, "Selection matched no rows.");
        return Err(DashboardError::NoData(format!(
            "symbol '{}' in quarter {}",
            query.symbol, query.quarter
        )));
    };
    let current_price = first.price;

    let value = ValueFormat::fixed(display.decimals);
    let history = time_series(dataset.records(), &query.symbol, &query.quarter);
    let symbol = query.symbol.as_str();

    let mut charts: Vec<Chart> = [
        Measure::Eps,
        Measure::Dps,
        Measure::BookValue,
        Measure::Roe,
        Measure::PaidUpCapital,
    ]
    .into_iter()
    .map(|measure| history_chart(&history, measure, symbol, value))
    .collect();

    let latest_year = dataset.latest_period().map(|period| period.year);
    let (net_profit, npl) = latest_year
        .and_then(|year| latest_year_charts(dataset, symbol, year, value))
        .unzip();

    charts.extend(net_profit);
    charts.push(eps_and_capital(&history, symbol, value));
    charts.extend(npl);
    charts.push(bonus_and_cash(dataset, symbol, value));

    info!(symbol, quarter = %query.quarter, points = history.len(), "Built symbol dashboard.");
    Ok(SymbolDashboard {
        query: query.clone(),
        current_price,
        latest_year,
        generated_at: Utc::now(),
        charts,
    })
}

/// Points of one measure over the timeframe axis. Missing values are left out.
fn history_points(history: &TimeSeries<'_>, measure: Measure) -> Vec<(String, Decimal)> {
    history
        .values(measure)
        .filter_map(|(timeframe, value)| value.map(|v| (timeframe, v)))
        .collect()
}

fn history_chart(history: &TimeSeries<'_>, measure: Measure, symbol: &str, format: ValueFormat) -> Chart {
    let spec = ChartSpec::for_measure(measure)
        .titled(format!("{} ({symbol})", measure.label()))
        .with_x_label(TIMEFRAME)
        .with_format(format);
    bar_chart(history_points(history, measure), &spec)
}

/// EPS bars with paid-up capital drawn as a line.
fn eps_and_capital(history: &TimeSeries<'_>, symbol: &str, format: ValueFormat) -> Chart {
    Chart::multi(
        ChartKind::Combo,
        format!("EPS & Capital ({symbol})"),
        TIMEFRAME,
        vec![
            ChartSeries::new("EPS", Mark::Bar, history_points(history, Measure::Eps), format),
            ChartSeries::new(
                "Capital",
                Mark::Line,
                history_points(history, Measure::PaidUpCapital),
                format,
            ),
        ],
    )
}

/// Net profit and NPL for every quarter of `year`, or `None` when the symbol
/// has no rows that year.
fn latest_year_charts(dataset: &Dataset, symbol: &str, year: i32, format: ValueFormat) -> Option<(Chart, Chart)> {
    let selection = Selection::builder().symbol(symbol).year(year).build();
    let rows = apply_filters(dataset.records(), &selection);
    if rows.is_empty() {
        return None;
    }

    let net_profit = display_series(rows.iter().copied(), GroupKey::Quarter, Measure::NetProfit).sorted(SortOrder::Key);
    let npl = display_series(rows.iter().copied(), GroupKey::Quarter, Measure::Npl).sorted(SortOrder::Key);

    let spec = |measure: Measure| {
        ChartSpec::for_measure(measure)
            .titled(format!("{} ({symbol}, {year})", measure.label()))
            .with_x_label("Quarter")
    };
    Some((
        bar_chart(
            series_points(&net_profit),
            &spec(Measure::NetProfit).with_format(ValueFormat::compact(format.decimals)),
        ),
        bar_chart(series_points(&npl), &spec(Measure::Npl).with_format(format)),
    ))
}

/// Yearly mean bonus and cash dividend over every quarter, stacked.
fn bonus_and_cash(dataset: &Dataset, symbol: &str, format: ValueFormat) -> Chart {
    let rows = apply_filters(dataset.records(), &Selection::builder().symbol(symbol).build());
    let series = [Measure::Bonus, Measure::Cash]
        .into_iter()
        .map(|measure| {
            let yearly = aggregate(rows.iter().copied(), GroupKey::Year, measure, AggregationMethod::Mean)
                .sorted(SortOrder::Key);
            ChartSeries::new(measure.label(), Mark::Bar, series_points(&yearly), format)
        })
        .collect();
    Chart::multi(
        ChartKind::Stacked,
        format!("Bonus & Cash Dividend ({symbol})"),
        "Year",
        series,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::FundamentalsRecord;
    use rust_decimal_macros::dec;

    fn row(year: i32, quarter: u32) -> FundamentalsRecord {
        FundamentalsRecord::new("NABIL", "Bank", year, Quarter::Number(quarter))
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            row(2023, 1)
                .with(Measure::Price, dec!(620))
                .with(Measure::Eps, dec!(24))
                .with(Measure::PaidUpCapital, dec!(1500))
                .with(Measure::Bonus, dec!(10))
                .with(Measure::Cash, dec!(5)),
            row(2022, 1)
                .with(Measure::Price, dec!(700))
                .with(Measure::Eps, dec!(30))
                .with(Measure::PaidUpCapital, dec!(1400))
                .with(Measure::Bonus, dec!(8)),
            row(2024, 2)
                .with(Measure::NetProfit, dec!(2500000))
                .with(Measure::Npl, dec!(1.2))
                .with(Measure::Bonus, dec!(4)),
            row(2024, 1)
                .with(Measure::Price, dec!(560))
                .with(Measure::NetProfit, dec!(1200000))
                .with(Measure::Npl, dec!(1.1)),
            FundamentalsRecord::new("ADBL", "Bank", 2024, Quarter::Number(1)).with(Measure::Price, dec!(280)),
        ])
    }

    fn query(quarter: u32) -> SymbolQuery {
        SymbolQuery {
            symbol: "NABIL".to_string(),
            quarter: Quarter::Number(quarter),
        }
    }

    fn find<'a>(dashboard: &'a SymbolDashboard, prefix: &str) -> Option<&'a Chart> {
        dashboard.charts.iter().find(|c| c.title.starts_with(prefix))
    }

    #[test]
    fn current_price_comes_from_the_first_matching_row() {
        let dashboard = symbol_dashboard(&dataset(), &query(1), &DisplayConfig::default()).unwrap();
        assert_eq!(dashboard.current_price, Some(dec!(620)));
        assert_eq!(dashboard.latest_year, Some(2024));
    }

    #[test]
    fn history_charts_run_oldest_first() {
        let dashboard = symbol_dashboard(&dataset(), &query(1), &DisplayConfig::default()).unwrap();
        let eps = find(&dashboard, "EPS (NABIL)").unwrap();
        let labels: Vec<_> = eps.series[0].points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1-2022", "1-2023"]);
        // The 2024 row has no EPS and is left out.
        assert_eq!(eps.series[0].points.len(), 2);
    }

    #[test]
    fn capital_is_shown_in_full_units() {
        let dashboard = symbol_dashboard(&dataset(), &query(1), &DisplayConfig::default()).unwrap();
        let combo = find(&dashboard, "EPS & Capital").unwrap();
        assert_eq!(combo.kind, ChartKind::Combo);
        assert_eq!(combo.series[1].mark, Mark::Line);
        let capital: Vec<_> = combo.series[1].points.iter().map(|p| p.value).collect();
        assert_eq!(capital, vec![dec!(1400000), dec!(1500000)]);
    }

    #[test]
    fn latest_year_charts_cover_every_quarter() {
        let dashboard = symbol_dashboard(&dataset(), &query(1), &DisplayConfig::default()).unwrap();
        let profit = find(&dashboard, "Net Profit (NABIL, 2024)").unwrap();
        let texts: Vec<_> = profit.series[0]
            .points
            .iter()
            .map(|p| (p.label.as_str(), p.text.as_str()))
            .collect();
        assert_eq!(texts, vec![("1", "1.20B"), ("2", "2.50B")]);
        assert!(find(&dashboard, "NPL (NABIL, 2024)").is_some());
    }

    #[test]
    fn latest_year_charts_are_omitted_without_rows() {
        let mut records = dataset().records().to_vec();
        records.push(FundamentalsRecord::new("ADBL", "Bank", 2025, Quarter::Number(1)));
        let dashboard = symbol_dashboard(&Dataset::new(records), &query(1), &DisplayConfig::default()).unwrap();
        assert_eq!(dashboard.latest_year, Some(2025));
        assert!(find(&dashboard, "Net Profit").is_none());
        assert!(find(&dashboard, "NPL").is_none());
        assert_eq!(dashboard.charts.len(), 7);
    }

    #[test]
    fn bonus_and_cash_are_yearly_means() {
        let dashboard = symbol_dashboard(&dataset(), &query(1), &DisplayConfig::default()).unwrap();
        let chart = find(&dashboard, "Bonus & Cash").unwrap();
        assert_eq!(chart.kind, ChartKind::Stacked);
        let rows = chart.rows();
        let years: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(years, vec!["2022", "2023", "2024"]);
        assert_eq!(rows[1].cells, vec![Some("10.00".to_string()), Some("5.00".to_string())]);
    }

    #[test]
    fn unknown_symbol_is_no_data() {
        let mut missing = query(1);
        missing.symbol = "NOPE".to_string();
        let err = symbol_dashboard(&dataset(), &missing, &DisplayConfig::default()).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn capital_too_large_to_scale_is_left_out() {
        let records = vec![
            row(2023, 1)
                .with(Measure::Eps, dec!(24))
                .with(Measure::PaidUpCapital, Decimal::MAX),
            row(2024, 1)
                .with(Measure::Eps, dec!(26))
                .with(Measure::PaidUpCapital, dec!(1500))
                .with(Measure::NetProfit, Decimal::MAX),
        ];
        let dashboard = symbol_dashboard(&Dataset::new(records), &query(1), &DisplayConfig::default()).unwrap();
        let combo = find(&dashboard, "EPS & Capital").unwrap();
        let capital: Vec<_> = combo.series[1].points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(capital, vec!["1-2024"]);
        let profit = find(&dashboard, "Net Profit (NABIL, 2024)").unwrap();
        assert!(profit.is_empty());
    }
}
