//! Per-ticker performance metrics derived from a trailing price series.

use super::price::PricePoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// CAGR is annualized over a fixed five-year horizon, whatever the exact span
/// of the fetched window.
pub const CAGR_YEARS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EtfMetrics {
    pub ticker: String,
    pub last_price: f64,
    pub observations: usize,
    pub cagr_5y: Option<f64>,
    pub volatility: Option<f64>,
    pub max_drawdown: Option<f64>,
}

impl EtfMetrics {
    /// Derive metrics for one ticker. Returns `None` when no usable close
    /// remains after cleaning; the caller drops the ticker.
    pub fn compute(ticker: &str, points: &[PricePoint]) -> Option<Self> {
        let closes = clean_closes(points);
        let last_price = *closes.last()?;

        Some(EtfMetrics {
            ticker: ticker.to_string(),
            last_price,
            observations: closes.len(),
            cagr_5y: cagr(&closes, CAGR_YEARS),
            volatility: annualized_volatility(&closes),
            max_drawdown: max_drawdown(&closes),
        })
    }
}

/// Usable closes in date order, with missing and non-finite values dropped.
pub fn clean_closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().filter_map(PricePoint::usable_close).collect()
}

/// Simple returns p[i]/p[i-1] - 1. A return off a zero price is skipped.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// (last / first)^(1 / years) - 1
pub fn cagr(closes: &[f64], years: f64) -> Option<f64> {
    let first = *closes.first()?;
    let last = *closes.last()?;
    if first <= 0.0 || last < 0.0 || years <= 0.0 {
        return None;
    }
    let value = (last / first).powf(1.0 / years) - 1.0;
    value.is_finite().then_some(value)
}

/// Sample standard deviation of daily returns scaled by sqrt(252).
pub fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    let returns = daily_returns(closes);
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}

/// min over t of p[t] / max(p[0..=t]) - 1; zero or negative.
pub fn max_drawdown(closes: &[f64]) -> Option<f64> {
    let mut peak = *closes.first()?;
    let mut worst = 0.0_f64;

    for &price in closes {
        if price > peak {
            peak = price;
        } else if peak > 0.0 {
            let dd = price / peak - 1.0;
            if dd < worst {
                worst = dd;
            }
        }
    }

    Some(worst)
}
