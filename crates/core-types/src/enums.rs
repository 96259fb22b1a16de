use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric column of the fundamentals sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Price,
    BookValue,
    Eps,
    Dps,
    Pe,
    Roe,
    Npl,
    PaidUpCapital,
    NetProfit,
    PublicShares,
    Reserve,
    Bonus,
    Cash,
}

impl Measure {
    pub const ALL: [Measure; 13] = [
        Measure::Price,
        Measure::BookValue,
        Measure::Eps,
        Measure::Dps,
        Measure::Pe,
        Measure::Roe,
        Measure::Npl,
        Measure::PaidUpCapital,
        Measure::NetProfit,
        Measure::PublicShares,
        Measure::Reserve,
        Measure::Bonus,
        Measure::Cash,
    ];

    /// The header this measure carries in the source sheet.
    pub fn column(&self) -> &'static str {
        match self {
            Measure::Price => "Price",
            Measure::BookValue => "BOOK VALUE",
            Measure::Eps => "EPS",
            Measure::Dps => "Dps",
            Measure::Pe => "PE",
            Measure::Roe => "ROE",
            Measure::Npl => "NPL",
            Measure::PaidUpCapital => "PAID-UP",
            Measure::NetProfit => "NET PROFIT",
            Measure::PublicShares => "Public Shares",
            Measure::Reserve => "RESERVE",
            Measure::Bonus => "Bonus",
            Measure::Cash => "Cash",
        }
    }

    /// Human-readable name used in chart titles and table headers.
    pub fn label(&self) -> &'static str {
        match self {
            Measure::Price => "Price",
            Measure::BookValue => "Book Value",
            Measure::Eps => "EPS",
            Measure::Dps => "DPS",
            Measure::Pe => "PE Ratio",
            Measure::Roe => "ROE",
            Measure::Npl => "NPL",
            Measure::PaidUpCapital => "Paid-Up Capital",
            Measure::NetProfit => "Net Profit",
            Measure::PublicShares => "Public Shares",
            Measure::Reserve => "Reserve",
            Measure::Bonus => "Bonus",
            Measure::Cash => "Cash",
        }
    }

    /// How rows sharing a group key are combined for this measure.
    ///
    /// Per-period rates are averaged. Balance-style figures are summed, even
    /// when a group holds several periods.
    pub fn default_method(&self) -> AggregationMethod {
        match self {
            Measure::PaidUpCapital
            | Measure::NetProfit
            | Measure::PublicShares
            | Measure::Reserve => AggregationMethod::Sum,
            _ => AggregationMethod::Mean,
        }
    }

    /// Multiplier applied before a value is displayed.
    ///
    /// Paid-up capital and net profit are stored in thousands.
    pub fn display_scale(&self) -> Decimal {
        match self {
            Measure::PaidUpCapital | Measure::NetProfit => dec!(1000),
            _ => Decimal::ONE,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Sum,
    Mean,
}

/// The column a series is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Symbol,
    Year,
    Quarter,
}

/// Ordering applied to an aggregated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending by aggregated value.
    #[default]
    Value,
    /// Ascending by group key, for time-keyed charts.
    Key,
}

/// A threshold predicate over EPS or DPS.
///
/// Every variant other than `All` is a strict comparison, so a missing value
/// never passes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BucketFilter {
    #[default]
    All,
    Positive,
    Negative,
    #[cfg_attr(feature = "clap", value(name = "more-than-0"))]
    MoreThan0,
    #[cfg_attr(feature = "clap", value(name = "more-than-5"))]
    MoreThan5,
    #[cfg_attr(feature = "clap", value(name = "more-than-10"))]
    MoreThan10,
    #[cfg_attr(feature = "clap", value(name = "more-than-20"))]
    MoreThan20,
    #[cfg_attr(feature = "clap", value(name = "more-than-50"))]
    MoreThan50,
}

impl BucketFilter {
    pub const ALL: [BucketFilter; 8] = [
        BucketFilter::All,
        BucketFilter::Positive,
        BucketFilter::Negative,
        BucketFilter::MoreThan0,
        BucketFilter::MoreThan5,
        BucketFilter::MoreThan10,
        BucketFilter::MoreThan20,
        BucketFilter::MoreThan50,
    ];

    pub fn matches(&self, value: Option<Decimal>) -> bool {
        let Some(value) = value else {
            return *self == BucketFilter::All;
        };
        match self {
            BucketFilter::All => true,
            BucketFilter::Negative => value < Decimal::ZERO,
            BucketFilter::Positive | BucketFilter::MoreThan0 => value > Decimal::ZERO,
            BucketFilter::MoreThan5 => value > dec!(5),
            BucketFilter::MoreThan10 => value > dec!(10),
            BucketFilter::MoreThan20 => value > dec!(20),
            BucketFilter::MoreThan50 => value > dec!(50),
        }
    }

    /// The label shown in selection controls.
    pub fn label(&self) -> &'static str {
        match self {
            BucketFilter::All => "All",
            BucketFilter::Positive => "Positive",
            BucketFilter::Negative => "Negative",
            BucketFilter::MoreThan0 => "More than 0",
            BucketFilter::MoreThan5 => "More than 5",
            BucketFilter::MoreThan10 => "More than 10",
            BucketFilter::MoreThan20 => "More than 20",
            BucketFilter::MoreThan50 => "More than 50",
        }
    }
}

impl fmt::Display for BucketFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BucketFilter {
    type Err = CoreError;

    /// Accepts the control labels ("More than 10") as well as compact forms
    /// (`more-than-10`, `MoreThan10`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "all" | "" => Ok(BucketFilter::All),
            "positive" => Ok(BucketFilter::Positive),
            "negative" => Ok(BucketFilter::Negative),
            "morethan0" => Ok(BucketFilter::MoreThan0),
            "morethan5" => Ok(BucketFilter::MoreThan5),
            "morethan10" => Ok(BucketFilter::MoreThan10),
            "morethan20" => Ok(BucketFilter::MoreThan20),
            "morethan50" => Ok(BucketFilter::MoreThan50),
            _ => Err(CoreError::InvalidInput("bucket filter".to_string(), s.to_string())),
        }
    }
}
