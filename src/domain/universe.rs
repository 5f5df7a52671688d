//! ETF universe handling and the bulk metric load.
//!
//! Parses ticker lists, fetches price history for every ticker in one bulk
//! call, and derives metrics. Tickers that fail to fetch or have no usable
//! closes are skipped, never fatal on their own.

use crate::domain::error::EtfEngineError;
use crate::domain::etf::{normalize_ticker, UniverseEntry};
use crate::domain::metrics::EtfMetrics;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = normalize_ticker(trimmed);
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Tickers of the universe in file order, first occurrence wins.
pub fn tickers_of(entries: &[UniverseEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|e| normalize_ticker(&e.ticker))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Keep only the universe entries named in `only`. Names missing from the
/// universe are logged and ignored.
pub fn restrict_universe(entries: Vec<UniverseEntry>, only: &[String]) -> Vec<UniverseEntry> {
    for ticker in only {
        if !entries.iter().any(|e| normalize_ticker(&e.ticker) == *ticker) {
            warn!("{} is not in the universe", ticker);
        }
    }
    entries
        .into_iter()
        .filter(|e| only.contains(&normalize_ticker(&e.ticker)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct MetricsLoad {
    pub metrics: Vec<EtfMetrics>,
    pub skipped: Vec<SkippedTicker>,
}

#[derive(Debug, Clone)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            SkipReason::NoData => write!(f, "no price data"),
        }
    }
}

pub fn load_metrics(
    price_port: &dyn PricePort,
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<MetricsLoad, EtfEngineError> {
    info!(
        "Fetching prices for {} tickers, {} to {}",
        tickers.len(),
        start_date,
        end_date
    );

    let mut metrics = Vec::new();
    let mut skipped = Vec::new();

    for (ticker, fetched) in price_port.fetch_many(tickers, start_date, end_date) {
        let points = match fetched {
            Ok(points) => points,
            Err(e) => {
                warn!("skipping {} ({})", ticker, e);
                skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        match EtfMetrics::compute(&ticker, &points) {
            Some(m) => {
                debug!("{}: {} closes [OK]", ticker, m.observations);
                metrics.push(m);
            }
            None => {
                warn!("skipping {} (no price data)", ticker);
                skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::NoData,
                });
            }
        }
    }

    if metrics.is_empty() {
        return Err(EtfEngineError::NoPriceData);
    }

    if !skipped.is_empty() {
        info!(
            "Computed metrics for {} of {} tickers",
            metrics.len(),
            metrics.len() + skipped.len()
        );
    }

    Ok(MetricsLoad { metrics, skipped })
}
