//! CSV directory price adapter.
//!
//! Reads `{TICKER}.csv` files with a header row containing `date` and `close`
//! columns (other columns ignored). An empty close cell is a missing value.

use crate::domain::error::EtfEngineError;
use crate::domain::etf::normalize_ticker;
use crate::domain::price::{normalize_series, PricePoint};
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", normalize_ticker(ticker)))
    }

    fn fetch_error(ticker: &str, reason: String) -> EtfEngineError {
        EtfEngineError::Fetch {
            ticker: ticker.to_string(),
            reason,
        }
    }

    /// Tickers that have a price file in the directory, sorted.
    pub fn list_tickers(&self) -> Result<Vec<String>, EtfEngineError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| EtfEngineError::DataFile {
            file: self.base_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, EtfEngineError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| {
            Self::fetch_error(ticker, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| Self::fetch_error(ticker, format!("CSV header error: {}", e)))?
            .clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| Self::fetch_error(ticker, format!("missing {} column", name)))
        };
        let date_col = column("date")?;
        let close_col = column("adj_close").or_else(|_| column("close"))?;

        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| Self::fetch_error(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                Self::fetch_error(ticker, format!("invalid date '{}': {}", date_str, e))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or_default().trim();
            let close = if close_str.is_empty() || close_str.eq_ignore_ascii_case("nan") {
                None
            } else {
                Some(close_str.parse::<f64>().map_err(|e| {
                    Self::fetch_error(ticker, format!("invalid close '{}': {}", close_str, e))
                })?)
            };

            points.push(PricePoint { date, close });
        }

        normalize_series(&mut points);
        Ok(points)
    }
}
