use crate::enums::Measure;
use crate::error::CoreError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coerces an untyped cell into a decimal.
///
/// Blank cells and anything that is not a plain or scientific number
/// (`"-"`, `"N/A"`, `"nan"`) become `None`.
pub fn coerce_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// `price / book_value` rounded half-to-even to one decimal place.
///
/// `None` when either side is missing or the book value is zero.
pub fn price_to_book(price: Option<Decimal>, book_value: Option<Decimal>) -> Option<Decimal> {
    price?.checked_div(book_value?).map(|ratio| ratio.round_dp(1))
}

/// A reporting quarter. Sheets carry either a number (`1`) or a label
/// (`"Q1"`, `"First"`), and both are kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quarter {
    Number(u32),
    Label(String),
}

impl FromStr for Quarter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::MissingValue("quarter".to_string()));
        }
        // Spreadsheet exports often write integral cells as `1.0`.
        let number = coerce_decimal(trimmed)
            .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
            .and_then(|d| d.to_u32());
        Ok(match number {
            Some(n) => Quarter::Number(n),
            None => Quarter::Label(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quarter::Number(n) => write!(f, "{n}"),
            Quarter::Label(label) => f.write_str(label),
        }
    }
}

/// Parses a year cell, accepting `2023` as well as `2023.0`.
pub fn parse_year(raw: &str) -> Result<i32, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingValue("year".to_string()));
    }
    coerce_decimal(trimmed)
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_i32())
        .ok_or_else(|| CoreError::InvalidInput("year".to_string(), trimmed.to_string()))
}

/// A (year, quarter) pair. Orders by year first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub quarter: Quarter,
}

impl fmt::Display for Period {
    /// The "Quarter-Year" timeframe label, e.g. `1-2023`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.quarter, self.year)
    }
}

/// One row of the fundamentals sheet: a symbol's figures for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    pub symbol: String,
    pub sector: String,
    pub year: i32,
    pub quarter: Quarter,

    pub price: Option<Decimal>,
    pub book_value: Option<Decimal>,
    pub eps: Option<Decimal>,
    pub dps: Option<Decimal>,
    pub pe: Option<Decimal>,
    pub roe: Option<Decimal>,
    pub npl: Option<Decimal>,
    /// In thousands.
    pub paid_up_capital: Option<Decimal>,
    /// In thousands.
    pub net_profit: Option<Decimal>,
    pub public_shares: Option<Decimal>,
    pub reserve: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub cash: Option<Decimal>,
}

impl FundamentalsRecord {
    /// Creates a record with every measure missing.
    pub fn new(symbol: impl Into<String>, sector: impl Into<String>, year: i32, quarter: Quarter) -> Self {
        Self {
            symbol: symbol.into(),
            sector: sector.into(),
            year,
            quarter,
            price: None,
            book_value: None,
            eps: None,
            dps: None,
            pe: None,
            roe: None,
            npl: None,
            paid_up_capital: None,
            net_profit: None,
            public_shares: None,
            reserve: None,
            bonus: None,
            cash: None,
        }
    }

    /// Builder-style setter, mostly for assembling fixtures.
    pub fn with(mut self, measure: Measure, value: Decimal) -> Self {
        self.set(measure, Some(value));
        self
    }

    pub fn value(&self, measure: Measure) -> Option<Decimal> {
        match measure {
            Measure::Price => self.price,
            Measure::BookValue => self.book_value,
            Measure::Eps => self.eps,
            Measure::Dps => self.dps,
            Measure::Pe => self.pe,
            Measure::Roe => self.roe,
            Measure::Npl => self.npl,
            Measure::PaidUpCapital => self.paid_up_capital,
            Measure::NetProfit => self.net_profit,
            Measure::PublicShares => self.public_shares,
            Measure::Reserve => self.reserve,
            Measure::Bonus => self.bonus,
            Measure::Cash => self.cash,
        }
    }

    pub fn set(&mut self, measure: Measure, value: Option<Decimal>) {
        let slot = match measure {
            Measure::Price => &mut self.price,
            Measure::BookValue => &mut self.book_value,
            Measure::Eps => &mut self.eps,
            Measure::Dps => &mut self.dps,
            Measure::Pe => &mut self.pe,
            Measure::Roe => &mut self.roe,
            Measure::Npl => &mut self.npl,
            Measure::PaidUpCapital => &mut self.paid_up_capital,
            Measure::NetProfit => &mut self.net_profit,
            Measure::PublicShares => &mut self.public_shares,
            Measure::Reserve => &mut self.reserve,
            Measure::Bonus => &mut self.bonus,
            Measure::Cash => &mut self.cash,
        };
        *slot = value;
    }

    /// The value as it should be displayed, with the thousands scale undone.
    /// A value too large to scale is treated as missing.
    pub fn display_value(&self, measure: Measure) -> Option<Decimal> {
        self.value(measure)
            .and_then(|v| v.checked_mul(measure.display_scale()))
    }

    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            quarter: self.quarter.clone(),
        }
    }

    pub fn price_to_book(&self) -> Option<Decimal> {
        price_to_book(self.price, self.book_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn coerce_turns_garbage_into_missing() {
        assert_eq!(coerce_decimal(" 12.5 "), Some(dec!(12.5)));
        assert_eq!(coerce_decimal("-3"), Some(dec!(-3)));
        assert_eq!(coerce_decimal("1.5e3"), Some(dec!(1500)));
        assert_eq!(coerce_decimal(""), None);
        assert_eq!(coerce_decimal("-"), None);
        assert_eq!(coerce_decimal("N/A"), None);
        assert_eq!(coerce_decimal("nan"), None);
    }

    #[test]
    fn price_to_book_rounds_to_one_decimal() {
        assert_eq!(price_to_book(Some(dec!(100)), Some(dec!(50))), Some(dec!(2.0)));
        assert_eq!(price_to_book(Some(dec!(100)), Some(dec!(30))), Some(dec!(3.3)));
        // Half-to-even on the tie.
        assert_eq!(price_to_book(Some(dec!(1.25)), Some(dec!(1))), Some(dec!(1.2)));
        assert_eq!(price_to_book(Some(dec!(1.35)), Some(dec!(1))), Some(dec!(1.4)));
    }

    #[test]
    fn price_to_book_is_undefined_without_a_usable_book_value() {
        assert_eq!(price_to_book(Some(dec!(100)), Some(Decimal::ZERO)), None);
        assert_eq!(price_to_book(Some(dec!(100)), None), None);
        assert_eq!(price_to_book(None, Some(dec!(50))), None);
    }

    #[test]
    fn quarters_keep_numbers_and_labels() {
        assert_eq!("1".parse::<Quarter>().unwrap(), Quarter::Number(1));
        assert_eq!("4.0".parse::<Quarter>().unwrap(), Quarter::Number(4));
        assert_eq!(" Q2 ".parse::<Quarter>().unwrap(), Quarter::Label("Q2".to_string()));
        assert!("".parse::<Quarter>().is_err());
        assert!(Quarter::Number(4) < Quarter::Label("Q1".to_string()));
    }

    #[test]
    fn years_accept_spreadsheet_floats() {
        assert_eq!(parse_year("2023").unwrap(), 2023);
        assert_eq!(parse_year("2023.0").unwrap(), 2023);
        assert!(parse_year("2023.5").is_err());
        assert!(parse_year("FY23").is_err());
        assert!(matches!(parse_year(" "), Err(CoreError::MissingValue(_))));
    }

    #[test]
    fn period_renders_as_quarter_dash_year() {
        let period = Period { year: 2023, quarter: Quarter::Number(1) };
        assert_eq!(period.to_string(), "1-2023");
        let labelled = Period { year: 2022, quarter: Quarter::Label("Q3".to_string()) };
        assert_eq!(labelled.to_string(), "Q3-2022");
    }

    #[test]
    fn periods_order_by_year_then_quarter() {
        let a = Period { year: 2022, quarter: Quarter::Number(4) };
        let b = Period { year: 2023, quarter: Quarter::Number(1) };
        let c = Period { year: 2023, quarter: Quarter::Number(2) };
        assert!(a < b && b < c);
    }

    #[test]
    fn display_value_applies_the_thousands_scale() {
        let record = FundamentalsRecord::new("AAA", "Bank", 2023, Quarter::Number(1))
            .with(Measure::PaidUpCapital, dec!(1500))
            .with(Measure::Eps, dec!(12));
        assert_eq!(record.display_value(Measure::PaidUpCapital), Some(dec!(1500000)));
        assert_eq!(record.display_value(Measure::Eps), Some(dec!(12)));
        assert_eq!(record.display_value(Measure::Reserve), None);
    }

    #[test]
    fn display_value_is_missing_when_scaling_overflows() {
        let record = FundamentalsRecord::new("AAA", "Bank", 2023, Quarter::Number(1))
            .with(Measure::PaidUpCapital, Decimal::MAX)
            .with(Measure::Eps, Decimal::MAX);
        assert_eq!(record.display_value(Measure::PaidUpCapital), None);
        // Measures without a display scale are passed through untouched.
        assert_eq!(record.display_value(Measure::Eps), Some(Decimal::MAX));
    }
}
