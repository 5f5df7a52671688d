#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use etf_engine::domain::error::EtfEngineError;
use etf_engine::domain::etf::{Fundamentals, UniverseEntry};
use etf_engine::domain::price::PricePoint;
use etf_engine::ports::price_port::PricePort;
use etf_engine::ports::reference_port::ReferencePort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_closes(self, ticker: &str, closes: &[f64]) -> Self {
        let points = daily_points(date(2020, 1, 2), closes);
        self.with_points(ticker, points)
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, EtfEngineError> {
        self.calls.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(EtfEngineError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct MockReferencePort {
    pub universe: Vec<UniverseEntry>,
    pub fundamentals: Vec<Fundamentals>,
}

impl MockReferencePort {
    pub fn new() -> Self {
        Self {
            universe: Vec::new(),
            fundamentals: Vec::new(),
        }
    }

    /// Adds the ticker to both tables.
    pub fn with_etf(mut self, ticker: &str, category: &str, distribution_yield: f64) -> Self {
        self.universe.push(UniverseEntry {
            ticker: ticker.to_string(),
            category: category.to_string(),
        });
        self.fundamentals.push(Fundamentals {
            ticker: ticker.to_string(),
            distribution_yield,
            category: category.to_string(),
        });
        self
    }

    /// Universe row with no fundamentals.
    pub fn with_universe_only(mut self, ticker: &str, category: &str) -> Self {
        self.universe.push(UniverseEntry {
            ticker: ticker.to_string(),
            category: category.to_string(),
        });
        self
    }
}

impl ReferencePort for MockReferencePort {
    fn load_universe(&self) -> Result<Vec<UniverseEntry>, EtfEngineError> {
        Ok(self.universe.clone())
    }

    fn load_fundamentals(&self) -> Result<Vec<Fundamentals>, EtfEngineError> {
        Ok(self.fundamentals.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per calendar day starting at `start`.
pub fn daily_points(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
        .collect()
}

pub fn constant_series(value: f64, n: usize) -> Vec<f64> {
    vec![value; n]
}

/// Geometric series from `first` to `last` inclusive.
pub fn growth_series(first: f64, last: f64, n: usize) -> Vec<f64> {
    let step = (last / first).powf(1.0 / (n - 1) as f64);
    (0..n).map(|i| first * step.powi(i as i32)).collect()
}

pub fn write_prices_csv(dir: &Path, ticker: &str, points: &[PricePoint]) {
    let mut content = String::from("date,close\n");
    for p in points {
        match p.close {
            Some(c) => content.push_str(&format!("{},{}\n", p.date, c)),
            None => content.push_str(&format!("{},\n", p.date)),
        }
    }
    fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}

/// Standard fixture: growth, dividend and covered-call ETFs.
pub fn sample_reference() -> MockReferencePort {
    MockReferencePort::new()
        .with_etf("XEQT.TO", "Growth", 0.018)
        .with_etf("VFV.TO", "Broad Market", 0.011)
        .with_etf("VDY.TO", "Dividend", 0.045)
        .with_etf("XEI.TO", "Dividend", 0.054)
        .with_etf("ZWC.TO", "Covered Call", 0.071)
        .with_etf("ZAG.TO", "Fixed Income", 0.033)
}

pub fn sample_prices() -> MockPricePort {
    MockPricePort::new()
        .with_closes("XEQT.TO", &growth_series(20.0, 32.0, 60))
        .with_closes("VFV.TO", &growth_series(70.0, 140.0, 60))
        .with_closes("VDY.TO", &growth_series(35.0, 45.0, 60))
        .with_closes("XEI.TO", &growth_series(20.0, 24.0, 60))
        .with_closes("ZWC.TO", &growth_series(16.0, 18.0, 60))
        .with_closes("ZAG.TO", &growth_series(15.0, 14.0, 60))
}
