use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::{DisplayConfig, OutputFormat};
use dashboards::{
    to_json, Chart, ScreenerDashboard, SectorDashboard, SymbolDashboard, ValueFormat,
};
use dataset::Catalog;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

const MISSING: &str = "-";

/// Prints `value` as JSON, or hands it to `render_table` for the terminal.
pub fn render<T, F>(value: &T, format: OutputFormat, render_table: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => println!("{}", to_json(value)?),
        OutputFormat::Table => render_table(value),
    }
    Ok(())
}

fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(Into::into).collect::<Vec<String>>());
    table
}

fn cell(value: Option<Decimal>, format: ValueFormat) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format.format(v))
}

pub fn catalog_table(catalog: &Catalog) {
    let mut table = new_table(["Option", "Values"]);
    table.add_row(vec!["Rows".to_string(), catalog.rows.to_string()]);
    table.add_row(vec!["Sectors".to_string(), catalog.sectors.join(", ")]);
    table.add_row(vec!["Years".to_string(), catalog.years.iter().join(", ")]);
    table.add_row(vec!["Quarters".to_string(), catalog.quarters.iter().join(", ")]);
    table.add_row(vec!["Symbols".to_string(), catalog.symbols.len().to_string()]);
    table.add_row(vec![
        "Latest period".to_string(),
        catalog
            .latest_period
            .as_ref()
            .map_or_else(|| MISSING.to_string(), ToString::to_string),
    ]);
    println!("{table}");
}

pub fn chart_table(chart: &Chart) {
    println!("\n{}", chart.title);
    if chart.is_empty() {
        println!("  (no values)");
        return;
    }
    let header = std::iter::once(chart.x_label.clone()).chain(chart.series.iter().map(|s| s.name.clone()));
    let mut table = new_table(header);
    for row in chart.rows() {
        let cells = std::iter::once(row.label)
            .chain(row.cells.into_iter().map(|c| c.unwrap_or_else(|| MISSING.to_string())));
        table.add_row(cells.collect::<Vec<_>>());
    }
    println!("{table}");
}

pub fn sector_table(dashboard: &SectorDashboard) {
    let query = &dashboard.query;
    let period = match (query.year, &query.quarter) {
        (Some(year), Some(quarter)) => format!("{quarter}-{year}"),
        (Some(year), None) => year.to_string(),
        (None, Some(quarter)) => format!("quarter {quarter}"),
        (None, None) => "all periods".to_string(),
    };
    println!("Sector {} ({period}), {} rows", query.sector, dashboard.rows);
    dashboard.charts.iter().for_each(chart_table);
}

pub fn symbol_table(dashboard: &SymbolDashboard, display: &DisplayConfig) {
    println!(
        "{} quarter {}: Current Price Rs. {}",
        dashboard.query.symbol,
        dashboard.query.quarter,
        cell(dashboard.current_price, ValueFormat::fixed(display.decimals)),
    );
    dashboard.charts.iter().for_each(chart_table);
}

pub fn screener_table(dashboard: &ScreenerDashboard, display: &DisplayConfig) {
    let value = ValueFormat::fixed(display.decimals);
    let ratio = ValueFormat::fixed(display.ratio_decimals);

    println!("Screen for {} ({} matches)", dashboard.period, dashboard.rows.len());
    let mut table = new_table([
        "Symbol", "Sector", "Price", "Book Value", "PBV", "EPS", "DPS", "PE", "ROE", "NPL", "Public Shares",
    ]);
    for row in &dashboard.rows {
        table.add_row(vec![
            row.symbol.clone(),
            row.sector.clone(),
            cell(row.price, value),
            cell(row.book_value, value),
            cell(row.pbv, ratio),
            cell(row.eps, value),
            cell(row.dps, value),
            cell(row.pe, value),
            cell(row.roe, value),
            cell(row.npl, value),
            cell(row.public_shares, value),
        ]);
    }
    println!("{table}");
    dashboard.charts.iter().for_each(chart_table);
}
