use crate::error::DashboardError;
use rust_decimal::Decimal;
use serde::Serialize;

const COMPACT_STEPS: [(i64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

/// How a chart labels its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueFormat {
    pub decimals: u32,
    /// Abbreviate thousands, millions and billions as `K`, `M` and `B`.
    pub compact: bool,
}

impl ValueFormat {
    pub fn fixed(decimals: u32) -> Self {
        Self { decimals, compact: false }
    }

    pub fn compact(decimals: u32) -> Self {
        Self { decimals, compact: true }
    }

    pub fn format(&self, value: Decimal) -> String {
        if self.compact {
            format_compact(value, self.decimals)
        } else {
            format_fixed(value, self.decimals)
        }
    }
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self::fixed(2)
    }
}

/// Rounds half-to-even and pads to exactly `decimals` places.
fn format_fixed(value: Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, value.round_dp(decimals))
}

/// The suffix is picked from the absolute value, so `-2.5e9` is `-2.50B`.
fn format_compact(value: Decimal, decimals: u32) -> String {
    let magnitude = value.abs();
    for (step, suffix) in COMPACT_STEPS {
        let step = Decimal::from(step);
        if magnitude >= step {
            return format!("{}{suffix}", format_fixed(value / step, decimals));
        }
    }
    format_fixed(value, decimals)
}

/// Pretty-printed JSON for any dashboard value.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, DashboardError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_pads_and_rounds_half_to_even() {
        let two = ValueFormat::fixed(2);
        assert_eq!(two.format(dec!(2)), "2.00");
        assert_eq!(two.format(dec!(12.345)), "12.34");
        assert_eq!(ValueFormat::fixed(1).format(dec!(0.25)), "0.2");
        assert_eq!(ValueFormat::fixed(0).format(dec!(1500000)), "1500000");
    }

    #[test]
    fn compact_picks_the_largest_suffix() {
        let compact = ValueFormat::compact(2);
        assert_eq!(compact.format(dec!(1500000)), "1.50M");
        assert_eq!(compact.format(dec!(2500000000)), "2.50B");
        assert_eq!(compact.format(dec!(1000)), "1.00K");
        assert_eq!(compact.format(dec!(999)), "999.00");
    }

    #[test]
    fn formats_serialize_for_json_output() {
        let json = to_json(&ValueFormat::compact(1)).unwrap();
        assert!(json.contains("\"compact\": true"));
    }

    #[test]
    fn compact_uses_the_absolute_value() {
        let compact = ValueFormat::compact(2);
        assert_eq!(compact.format(dec!(-2500000000)), "-2.50B");
        assert_eq!(compact.format(dec!(-42)), "-42.00");
    }
}
