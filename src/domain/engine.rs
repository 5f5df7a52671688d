//! One-pass engine run: universe → prices → metrics → score → portfolio.
//!
//! EngineConfig carries everything a run needs once config and CLI overrides
//! have been resolved.

use std::cmp::Ordering;

use chrono::{Months, NaiveDate};
use tracing::info;

use crate::domain::error::EtfEngineError;
use crate::domain::etf::{Fundamentals, UniverseEntry};
use crate::domain::metrics::EtfMetrics;
use crate::domain::phase::{Phase, PhaseProfile};
use crate::domain::portfolio::{build_portfolio, Portfolio};
use crate::domain::scoring::{join, score_universe, ScoredEtf, ScoringConfig};
use crate::domain::universe::{load_metrics, restrict_universe, tickers_of, SkippedTicker};
use crate::ports::price_port::PricePort;
use crate::ports::reference_port::ReferencePort;

/// Length of the trailing price window.
pub const LOOKBACK_MONTHS: u32 = 60;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub scoring: ScoringConfig,
    pub phase: Phase,
    pub profile: PhaseProfile,
    /// Restricts the run to these tickers when set.
    pub tickers: Option<Vec<String>>,
}

impl EngineConfig {
    /// Window of `LOOKBACK_MONTHS` ending on `as_of`, with the default profile
    /// for `phase`.
    pub fn trailing(as_of: NaiveDate, phase: Phase, scoring: ScoringConfig) -> Self {
        Self {
            start_date: window_start(as_of),
            end_date: as_of,
            scoring,
            phase,
            profile: phase.default_profile(),
            tickers: None,
        }
    }
}

pub fn window_start(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(LOOKBACK_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone)]
pub struct EngineReport {
    pub as_of: NaiveDate,
    pub universe: Vec<UniverseEntry>,
    pub metrics: Vec<EtfMetrics>,
    pub skipped: Vec<SkippedTicker>,
    pub min_yield: f64,
    pub scored: Vec<ScoredEtf>,
    pub portfolio: Portfolio,
}

impl EngineReport {
    pub fn portfolio_yield(&self) -> f64 {
        self.portfolio.portfolio_yield()
    }
}

/// Metrics ordered for display: CAGR descending, undefined CAGR last.
pub fn sort_by_cagr(metrics: &mut [EtfMetrics]) {
    metrics.sort_by(|a, b| match (a.cagr_5y, b.cagr_5y) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.ticker.cmp(&b.ticker),
    });
}

/// Load the universe and compute metrics only.
pub fn run_metrics(
    price_port: &dyn PricePort,
    reference_port: &dyn ReferencePort,
    start_date: NaiveDate,
    end_date: NaiveDate,
    only: Option<&[String]>,
) -> Result<(Vec<UniverseEntry>, Vec<EtfMetrics>, Vec<SkippedTicker>), EtfEngineError> {
    let mut universe = reference_port.load_universe()?;
    if let Some(only) = only {
        universe = restrict_universe(universe, only);
    }
    let tickers = tickers_of(&universe);
    info!("Universe: {} tickers", tickers.len());

    let load = load_metrics(price_port, &tickers, start_date, end_date)?;
    let mut metrics = load.metrics;
    sort_by_cagr(&mut metrics);

    Ok((universe, metrics, load.skipped))
}

pub fn run_engine(
    price_port: &dyn PricePort,
    reference_port: &dyn ReferencePort,
    config: &EngineConfig,
) -> Result<EngineReport, EtfEngineError> {
    let (universe, metrics, skipped) = run_metrics(
        price_port,
        reference_port,
        config.start_date,
        config.end_date,
        config.tickers.as_deref(),
    )?;

    let fundamentals: Vec<Fundamentals> = reference_port.load_fundamentals()?;
    let rows = join(&metrics, &fundamentals);
    let scored = score_universe(rows, &config.scoring)?;
    info!(
        "{} ETFs meet the minimum yield of {:.2}%",
        scored.len(),
        config.scoring.min_yield * 100.0
    );

    let portfolio = build_portfolio(&scored, config.phase, &config.profile)?;
    info!(
        "{} portfolio: {} holdings, yield {:.2}%",
        config.phase,
        portfolio.len(),
        portfolio.portfolio_yield() * 100.0
    );

    Ok(EngineReport {
        as_of: config.end_date,
        universe,
        metrics,
        skipped,
        min_yield: config.scoring.min_yield,
        scored,
        portfolio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(ticker: &str, cagr: Option<f64>) -> EtfMetrics {
        EtfMetrics {
            ticker: ticker.to_string(),
            last_price: 1.0,
            observations: 2,
            cagr_5y: cagr,
            volatility: None,
            max_drawdown: Some(0.0),
        }
    }

    #[test]
    fn window_is_five_years() {
        let as_of = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            window_start(as_of),
            NaiveDate::from_ymd_opt(2019, 2, 28).unwrap()
        );
    }

    #[test]
    fn trailing_config_uses_default_profile() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let config = EngineConfig::trailing(as_of, Phase::Growth, ScoringConfig::default());
        assert_eq!(config.end_date, as_of);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2020, 6, 30).unwrap());
        assert_eq!(config.profile, Phase::Growth.default_profile());
    }

    #[test]
    fn cagr_sort_puts_undefined_last() {
        let mut metrics = vec![m("A", None), m("B", Some(0.02)), m("C", Some(0.09))];
        sort_by_cagr(&mut metrics);
        let tickers: Vec<_> = metrics.iter().map(|m| m.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["C", "B", "A"]);
    }
}
