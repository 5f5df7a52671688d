//! Join, filter, score and rank.
//!
//! income_score = yield × 100, growth_score = CAGR × 100,
//! total_score = growth_weight × growth + income_weight × income.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::error::EtfEngineError;
use crate::domain::etf::{normalize_ticker, Fundamentals};
use crate::domain::metrics::EtfMetrics;
use tracing::debug;

pub const DEFAULT_GROWTH_WEIGHT: f64 = 0.6;
pub const DEFAULT_INCOME_WEIGHT: f64 = 0.4;
pub const DEFAULT_MIN_YIELD: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub min_yield: f64,
    pub growth_weight: f64,
    pub income_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_yield: DEFAULT_MIN_YIELD,
            growth_weight: DEFAULT_GROWTH_WEIGHT,
            income_weight: DEFAULT_INCOME_WEIGHT,
        }
    }
}

/// A metrics record joined with its fundamentals.
#[derive(Debug, Clone, PartialEq)]
pub struct EtfRow {
    pub ticker: String,
    pub category: String,
    pub distribution_yield: f64,
    pub metrics: EtfMetrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEtf {
    pub row: EtfRow,
    pub income_score: f64,
    pub growth_score: f64,
    pub total_score: f64,
}

impl ScoredEtf {
    pub fn ticker(&self) -> &str {
        &self.row.ticker
    }

    pub fn category(&self) -> &str {
        &self.row.category
    }

    pub fn distribution_yield(&self) -> f64 {
        self.row.distribution_yield
    }
}

/// Inner join on ticker. Category and yield come from the fundamentals table.
pub fn join(metrics: &[EtfMetrics], fundamentals: &[Fundamentals]) -> Vec<EtfRow> {
    let by_ticker: HashMap<String, &Fundamentals> = fundamentals
        .iter()
        .map(|f| (normalize_ticker(&f.ticker), f))
        .collect();

    metrics
        .iter()
        .filter_map(|m| {
            let key = normalize_ticker(&m.ticker);
            match by_ticker.get(&key) {
                Some(f) => Some(EtfRow {
                    ticker: key,
                    category: f.category.trim().to_string(),
                    distribution_yield: f.distribution_yield,
                    metrics: m.clone(),
                }),
                None => {
                    debug!("{}: no fundamentals, dropped from scoring", m.ticker);
                    None
                }
            }
        })
        .collect()
}

/// Keep rows whose distribution yield is at least `min_yield`.
pub fn filter_by_yield(rows: Vec<EtfRow>, min_yield: f64) -> Vec<EtfRow> {
    rows.into_iter()
        .filter(|r| r.distribution_yield >= min_yield)
        .collect()
}

/// `None` when the row has no CAGR to score growth with.
pub fn score(row: EtfRow, config: &ScoringConfig) -> Option<ScoredEtf> {
    let cagr = row.metrics.cagr_5y?;
    let income_score = row.distribution_yield * 100.0;
    let growth_score = cagr * 100.0;
    let total_score = config.growth_weight * growth_score + config.income_weight * income_score;

    Some(ScoredEtf {
        row,
        income_score,
        growth_score,
        total_score,
    })
}

/// Descending by total score, ties broken by ticker.
pub fn rank(scored: &mut [ScoredEtf]) {
    scored.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.row.ticker.cmp(&b.row.ticker))
    });
}

pub fn score_universe(
    rows: Vec<EtfRow>,
    config: &ScoringConfig,
) -> Result<Vec<ScoredEtf>, EtfEngineError> {
    let mut scored: Vec<ScoredEtf> = filter_by_yield(rows, config.min_yield)
        .into_iter()
        .filter_map(|r| score(r, config))
        .collect();

    if scored.is_empty() {
        return Err(EtfEngineError::NoCandidates {
            min_yield: config.min_yield,
        });
    }

    rank(&mut scored);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metrics(ticker: &str, cagr: Option<f64>) -> EtfMetrics {
        EtfMetrics {
            ticker: ticker.to_string(),
            last_price: 10.0,
            observations: 100,
            cagr_5y: cagr,
            volatility: Some(0.15),
            max_drawdown: Some(-0.2),
        }
    }

    fn fundamentals(ticker: &str, yld: f64, category: &str) -> Fundamentals {
        Fundamentals {
            ticker: ticker.to_string(),
            distribution_yield: yld,
            category: category.to_string(),
        }
    }

    fn row(ticker: &str, yld: f64, cagr: f64) -> EtfRow {
        EtfRow {
            ticker: ticker.to_string(),
            category: "Dividend".to_string(),
            distribution_yield: yld,
            metrics: metrics(ticker, Some(cagr)),
        }
    }

    #[test]
    fn join_is_inner_and_takes_fundamentals_category() {
        let m = vec![metrics("VFV.TO", Some(0.1)), metrics("XYZ.TO", Some(0.05))];
        let f = vec![fundamentals("vfv.to", 0.01, "Growth")];
        let rows = join(&m, &f);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "VFV.TO");
        assert_eq!(rows[0].category, "Growth");
        assert_relative_eq!(rows[0].distribution_yield, 0.01);
    }

    #[test]
    fn filter_keeps_threshold_and_above() {
        let rows = vec![row("A", 0.02, 0.1), row("B", 0.03, 0.1), row("C", 0.05, 0.1)];
        let kept = filter_by_yield(rows, 0.03);
        let tickers: Vec<_> = kept.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["B", "C"]);
    }

    #[test]
    fn score_formula() {
        let scored = score(row("A", 0.05, 0.08), &ScoringConfig::default()).unwrap();
        assert_relative_eq!(scored.income_score, 5.0, epsilon = 1e-12);
        assert_relative_eq!(scored.growth_score, 8.0, epsilon = 1e-12);
        assert_relative_eq!(scored.total_score, 0.6 * 8.0 + 0.4 * 5.0, epsilon = 1e-12);
    }

    #[test]
    fn score_without_cagr_is_none() {
        let mut r = row("A", 0.05, 0.0);
        r.metrics.cagr_5y = None;
        assert!(score(r, &ScoringConfig::default()).is_none());
    }

    #[test]
    fn rank_descending_with_ticker_tiebreak() {
        let config = ScoringConfig::default();
        let mut scored: Vec<_> = vec![
            row("B", 0.05, 0.05),
            row("A", 0.05, 0.05),
            row("C", 0.10, 0.10),
        ]
        .into_iter()
        .filter_map(|r| score(r, &config))
        .collect();
        rank(&mut scored);
        let tickers: Vec<_> = scored.iter().map(|s| s.ticker()).collect();
        assert_eq!(tickers, vec!["C", "A", "B"]);
    }

    #[test]
    fn score_universe_empty_is_no_candidates() {
        let config = ScoringConfig {
            min_yield: 0.5,
            ..ScoringConfig::default()
        };
        let err = score_universe(vec![row("A", 0.05, 0.1)], &config).unwrap_err();
        assert!(matches!(err, EtfEngineError::NoCandidates { min_yield } if min_yield == 0.5));
    }

    #[test]
    fn custom_weights() {
        let config = ScoringConfig {
            min_yield: 0.0,
            growth_weight: 0.0,
            income_weight: 1.0,
        };
        let scored = score_universe(vec![row("A", 0.07, 0.2), row("B", 0.09, 0.0)], &config)
            .unwrap();
        assert_eq!(scored[0].ticker(), "B");
        assert_relative_eq!(scored[0].total_score, 9.0, epsilon = 1e-12);
    }
}
