//! Equal-weight-with-cap portfolio construction.
//!
//! Rows matching the phase categories get 1/n each, each weight is clipped to
//! the phase cap, then the weights are renormalized to sum to 1. The
//! renormalization can lift weights back above the cap when few rows qualify;
//! the cap is nominal, not a hard limit.

use std::collections::BTreeMap;

use super::error::EtfEngineError;
use super::phase::{Phase, PhaseProfile};
use super::scoring::ScoredEtf;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRow {
    pub ticker: String,
    pub category: String,
    pub distribution_yield: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub phase: Phase,
    pub max_weight: f64,
    pub rows: Vec<PortfolioRow>,
}

impl Portfolio {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&PortfolioRow> {
        self.rows.iter().find(|r| r.ticker == ticker)
    }

    pub fn total_weight(&self) -> f64 {
        self.rows.iter().map(|r| r.weight).sum()
    }

    /// Σ weight × distribution_yield
    pub fn portfolio_yield(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.weight * r.distribution_yield)
            .sum()
    }

    /// Summed weight per category, ordered by category name.
    pub fn category_weights(&self) -> BTreeMap<String, f64> {
        let mut out: BTreeMap<String, f64> = BTreeMap::new();
        for row in &self.rows {
            *out.entry(row.category.clone()).or_default() += row.weight;
        }
        out
    }

    /// Holdings whose final weight sits above the nominal cap.
    pub fn over_cap(&self) -> Vec<&PortfolioRow> {
        const TOLERANCE: f64 = 1e-9;
        self.rows
            .iter()
            .filter(|r| r.weight > self.max_weight + TOLERANCE)
            .collect()
    }
}

pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

pub fn clip_weights(weights: &mut [f64], cap: f64) {
    for w in weights.iter_mut() {
        if *w > cap {
            *w = cap;
        }
    }
}

/// Scale to a sum of 1. All-zero input is left untouched.
pub fn normalize_weights(weights: &mut [f64]) {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
}

/// Select the scored rows in the phase's categories, keeping rank order, and
/// weight them.
pub fn build_portfolio(
    scored: &[ScoredEtf],
    phase: Phase,
    profile: &PhaseProfile,
) -> Result<Portfolio, EtfEngineError> {
    let selected: Vec<&ScoredEtf> = scored
        .iter()
        .filter(|s| profile.includes(s.category()))
        .collect();

    if selected.is_empty() {
        return Err(EtfEngineError::EmptyPortfolio {
            phase: phase.to_string(),
        });
    }

    let mut weights = equal_weights(selected.len());
    clip_weights(&mut weights, profile.max_weight);
    normalize_weights(&mut weights);

    let rows = selected
        .into_iter()
        .zip(weights)
        .map(|(s, weight)| PortfolioRow {
            ticker: s.ticker().to_string(),
            category: s.category().to_string(),
            distribution_yield: s.distribution_yield(),
            weight,
        })
        .collect();

    Ok(Portfolio {
        phase,
        max_weight: profile.max_weight,
        rows,
    })
}
