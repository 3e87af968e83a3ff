//! Vehicle price and number formatting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A vehicle price in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The raw amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format as US currency, e.g. `$25,000.00`.
    #[must_use]
    pub fn display_usd(&self) -> String {
        let fixed = format!("{:.2}", self.0.abs().round_dp(2));
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}${}.{cents}", group_thousands(whole))
    }

    /// Format without currency symbol or forced decimals, e.g. `25,000`.
    ///
    /// Used for listing grids where cents are noise.
    #[must_use]
    pub fn display_plain(&self) -> String {
        let normalized = self.0.normalize().to_string();
        match normalized.split_once('.') {
            Some((whole, frac)) => format!("{}.{frac}", group_thousands(whole)),
            None => group_thousands(&normalized),
        }
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_usd())
    }
}

/// Format an integer with thousands separators, e.g. `1234567` -> `1,234,567`.
#[must_use]
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = group_thousands(&digits);
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits), |rest| ("-", rest));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_usd_groups_and_pads() {
        assert_eq!(Price::new(Decimal::new(25_000, 0)).display_usd(), "$25,000.00");
        assert_eq!(Price::new(Decimal::new(99_95, 2)).display_usd(), "$99.95");
        assert_eq!(Price::new(Decimal::new(1_234_567_5, 1)).display_usd(), "$1,234,567.50");
    }

    #[test]
    fn test_display_plain_drops_trailing_zeros() {
        assert_eq!(Price::new(Decimal::new(2_500_000, 2)).display_plain(), "25,000");
        assert_eq!(Price::new(Decimal::new(1_999_950, 2)).display_plain(), "19,999.5");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(74_750), "74,750");
        assert_eq!(format_number(-1_000), "-1,000");
    }
}
