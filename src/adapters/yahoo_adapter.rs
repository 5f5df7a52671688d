//! Yahoo Finance chart API price adapter.
//!
//! `GET {base_url}/v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d`
//! returning daily closes. Adjusted closes are used when the payload carries
//! them, raw closes otherwise. Bulk fetches fan out over the rayon pool.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::domain::error::EtfEngineError;
use crate::domain::price::{normalize_series, PricePoint};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: i64 = 30;
const USER_AGENT: &str = concat!("etf-engine/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: Client,
    base_url: Url,
    parallel: bool,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout: Duration, parallel: bool) -> Result<Self, EtfEngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EtfEngineError::ConfigInvalid {
                section: "fetch".into(),
                key: "base_url".into(),
                reason: format!("cannot build HTTP client: {}", e),
            })?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| EtfEngineError::ConfigInvalid {
                section: "fetch".into(),
                key: "base_url".into(),
                reason: format!("'{}' is not a usable base URL", base_url),
            })?;

        Ok(Self {
            client,
            base_url,
            parallel,
        })
    }

    /// Reads `[fetch] base_url`, `timeout_secs` and `parallel`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EtfEngineError> {
        let base_url = config
            .get_nonempty("fetch", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = config
            .get_int("fetch", "timeout_secs", DEFAULT_TIMEOUT_SECS)
            .max(1) as u64;
        let parallel = config.get_bool("fetch", "parallel", true);

        Self::new(&base_url, Duration::from_secs(timeout_secs), parallel)
    }

    /// The ticker is a single percent-encoded path segment.
    pub fn chart_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> Url {
        let period1 = start_date.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end_date
            .succ_opt()
            .unwrap_or(end_date)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", ticker]);
        }
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "div,splits")
            .append_pair("includeAdjustedClose", "true");
        url
    }
}

fn fetch_error(ticker: &str, reason: impl ToString) -> EtfEngineError {
    EtfEngineError::Fetch {
        ticker: ticker.to_string(),
        reason: reason.to_string(),
    }
}

/// Decode a chart payload into date-ordered closes within the window.
pub fn parse_chart(
    ticker: &str,
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PricePoint>, EtfEngineError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| fetch_error(ticker, format!("bad payload: {}", e)))?;

    if let Some(err) = response.chart.error {
        let reason = match err.description {
            Some(d) => format!("{}: {}", err.code, d),
            None => err.code,
        };
        return Err(fetch_error(ticker, reason));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| fetch_error(ticker, "empty chart result"))?;

    let closes: Vec<Option<f64>> = match result.indicators.adjclose.into_iter().next() {
        Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let offset = result.meta.gmtoffset;
    let mut points = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(moment) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        let date = moment.date_naive();
        if date < start_date || date > end_date {
            continue;
        }
        points.push(PricePoint {
            date,
            close: closes.get(i).copied().flatten(),
        });
    }

    normalize_series(&mut points);
    Ok(points)
}

impl PricePort for YahooAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, EtfEngineError> {
        let url = self.chart_url(ticker, start_date, end_date);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(ticker, e))?;
        let status = response.status();
        let body = response.text().map_err(|e| fetch_error(ticker, e))?;

        match parse_chart(ticker, &body, start_date, end_date) {
            Ok(points) => Ok(points),
            Err(_) if !status.is_success() => Err(fetch_error(ticker, format!("HTTP {}", status))),
            Err(e) => Err(e),
        }
    }

    fn fetch_many(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<(String, Result<Vec<PricePoint>, EtfEngineError>)> {
        let fetch = |t: &String| (t.clone(), self.fetch_closes(t, start_date, end_date));
        if self.parallel {
            tickers.par_iter().map(fetch).collect()
        } else {
            tickers.iter().map(fetch).collect()
        }
    }
}
