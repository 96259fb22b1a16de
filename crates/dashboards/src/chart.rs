use crate::format::ValueFormat;
use analytics::Series;
use core_types::Measure;
use rust_decimal::Decimal;
use serde::Serialize;

/// How the series of a chart are laid out against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// A single bar series.
    Bar,
    /// Bars side by side per label.
    Grouped,
    /// Bars stacked per label.
    Stacked,
    /// Bars with a line on a secondary axis.
    Combo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// The value as it should be printed on the chart.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub mark: Mark,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new<I, L>(name: impl Into<String>, mark: Mark, points: I, format: ValueFormat) -> Self
    where
        I: IntoIterator<Item = (L, Decimal)>,
        L: ToString,
    {
        let points = points
            .into_iter()
            .map(|(label, value)| ChartPoint {
                label: label.to_string(),
                value,
                text: format.format(value),
            })
            .collect();
        Self {
            name: name.into(),
            mark,
            points,
        }
    }
}

/// Chart data ready for any front end: a title, an x axis and labelled points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub series: Vec<ChartSeries>,
}

/// One label of a chart with the printed value of each series, in series order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub cells: Vec<Option<String>>,
}

impl Chart {
    pub fn multi(kind: ChartKind, title: impl Into<String>, x_label: impl Into<String>, series: Vec<ChartSeries>) -> Self {
        Self {
            title: title.into(),
            kind,
            x_label: x_label.into(),
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// Flattens the chart into rows for tabular output. Labels appear in the
    /// order they are first seen across the series.
    pub fn rows(&self) -> Vec<ChartRow> {
        let mut labels: Vec<&str> = Vec::new();
        for point in self.series.iter().flat_map(|s| &s.points) {
            if !labels.contains(&point.label.as_str()) {
                labels.push(&point.label);
            }
        }
        labels
            .into_iter()
            .map(|label| ChartRow {
                label: label.to_string(),
                cells: self
                    .series
                    .iter()
                    .map(|s| s.points.iter().find(|p| p.label == label).map(|p| p.text.clone()))
                    .collect(),
            })
            .collect()
    }
}

/// What a single-series chart shows and how its values are labelled.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub field: String,
    pub title: String,
    pub x_label: String,
    pub format: ValueFormat,
}

impl ChartSpec {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            x_label: "Symbol".to_string(),
            format: ValueFormat::default(),
        }
    }

    /// A spec named and titled after the measure.
    pub fn for_measure(measure: Measure) -> Self {
        Self::new(measure.label(), measure.label())
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_x_label(mut self, x_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }
}

/// Builds a single-series bar chart. Every dashboard chart with one series
/// goes through here; only the `ChartSpec` changes.
pub fn bar_chart<I, L>(points: I, spec: &ChartSpec) -> Chart
where
    I: IntoIterator<Item = (L, Decimal)>,
    L: ToString,
{
    Chart::multi(
        ChartKind::Bar,
        spec.title.clone(),
        spec.x_label.clone(),
        vec![ChartSeries::new(spec.field.clone(), Mark::Bar, points, spec.format)],
    )
}

/// The `(label, value)` pairs of an aggregated series, in series order.
pub fn series_points(series: &Series) -> impl Iterator<Item = (String, Decimal)> + '_ {
    series.iter().map(|p| (p.key.to_string(), p.value))
}
