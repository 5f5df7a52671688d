//! Static ETF reference records: the universe list and per-ticker fundamentals.

use serde::Deserialize;

/// A row of the ETF universe file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UniverseEntry {
    pub ticker: String,
    pub category: String,
}

/// A row of the fundamentals file. `distribution_yield` is a fraction
/// (0.045 for 4.5%).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub distribution_yield: f64,
    pub category: String,
}

/// Canonical ticker form used as the join key.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Case- and whitespace-insensitive category comparison.
pub fn same_category(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl UniverseEntry {
    pub fn normalized(self) -> Self {
        Self {
            ticker: normalize_ticker(&self.ticker),
            category: self.category.trim().to_string(),
        }
    }
}

impl Fundamentals {
    pub fn normalized(self) -> Self {
        Self {
            ticker: normalize_ticker(&self.ticker),
            distribution_yield: self.distribution_yield,
            category: self.category.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickers_are_upper_cased_and_trimmed() {
        assert_eq!(normalize_ticker("  xeqt.to "), "XEQT.TO");
    }

    #[test]
    fn categories_compare_loosely() {
        assert!(same_category("Covered Call", " covered call"));
        assert!(!same_category("Dividend", "Growth"));
    }

    #[test]
    fn fundamentals_normalized() {
        let f = Fundamentals {
            ticker: "zwc.to".into(),
            distribution_yield: 0.07,
            category: " Covered Call ".into(),
        }
        .normalized();
        assert_eq!(f.ticker, "ZWC.TO");
        assert_eq!(f.category, "Covered Call");
    }
}
