use crate::chart::{bar_chart, series_points, Chart, ChartSpec};
use crate::error::DashboardError;
use crate::format::ValueFormat;
use analytics::{aggregate, apply_filters, scale_for_display, Selection};
use configuration::DisplayConfig;
use core_types::{AggregationMethod, GroupKey, Measure, SortOrder};
use dataset::Dataset;
use serde::Serialize;

/// An ad-hoc aggregation of one measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureQuery {
    pub measure: Measure,
    pub group_by: GroupKey,
    /// Falls back to the measure's own method.
    pub method: Option<AggregationMethod>,
    pub sort: SortOrder,
}

impl MeasureQuery {
    pub fn new(measure: Measure) -> Self {
        Self {
            measure,
            group_by: GroupKey::Symbol,
            method: None,
            sort: SortOrder::Value,
        }
    }
}

pub fn measure_chart(
    dataset: &Dataset,
    selection: &Selection,
    query: &MeasureQuery,
    display: &DisplayConfig,
) -> Result<Chart, DashboardError> {
    let rows = apply_filters(dataset.records(), selection);
    if rows.is_empty() {
        return Err(DashboardError::NoData(format!("{} with this selection", query.measure)));
    }

    let method = query.method.unwrap_or_else(|| query.measure.default_method());
    let series = aggregate(rows, query.group_by, query.measure, method).sorted(query.sort);
    let series = scale_for_display(series, query.measure);

    let x_label = match query.group_by {
        GroupKey::Symbol => "Symbol",
        GroupKey::Year => "Year",
        GroupKey::Quarter => "Quarter",
    };
    let spec = ChartSpec::for_measure(query.measure)
        .with_x_label(x_label)
        .with_format(ValueFormat::fixed(display.decimals));
    Ok(bar_chart(series_points(&series), &spec))
}
