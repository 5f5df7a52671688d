//! CSV adapter for the static reference tables.
//!
//! Universe file: `ticker,category`. Fundamentals file:
//! `ticker,distribution_yield,category`. Extra columns are ignored; headers
//! are matched case-insensitively.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::domain::error::EtfEngineError;
use crate::domain::etf::{Fundamentals, UniverseEntry};
use crate::ports::reference_port::ReferencePort;

pub struct CsvReferenceAdapter {
    universe_path: PathBuf,
    fundamentals_path: PathBuf,
}

impl CsvReferenceAdapter {
    pub fn new(universe_path: PathBuf, fundamentals_path: PathBuf) -> Self {
        Self {
            universe_path,
            fundamentals_path,
        }
    }
}

fn data_error(path: &Path, reason: impl ToString) -> EtfEngineError {
    EtfEngineError::DataFile {
        file: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EtfEngineError> {
    let content = fs::read_to_string(path).map_err(|e| data_error(path, e))?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: csv::StringRecord = rdr
        .headers()
        .map_err(|e| data_error(path, e))?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();
    rdr.set_headers(headers);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<T>().enumerate() {
        // +2: header row, then 1-based numbering
        let row = result.map_err(|e| data_error(path, format!("row {}: {}", line + 2, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

impl ReferencePort for CsvReferenceAdapter {
    fn load_universe(&self) -> Result<Vec<UniverseEntry>, EtfEngineError> {
        let rows: Vec<UniverseEntry> = read_table(&self.universe_path)?;
        Ok(rows.into_iter().map(UniverseEntry::normalized).collect())
    }

    fn load_fundamentals(&self) -> Result<Vec<Fundamentals>, EtfEngineError> {
        let rows: Vec<Fundamentals> = read_table(&self.fundamentals_path)?;
        Ok(rows.into_iter().map(Fundamentals::normalized).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn adapter_with(universe: &str, fundamentals: &str) -> (TempDir, CsvReferenceAdapter) {
        let dir = TempDir::new().unwrap();
        let u = dir.path().join("etf_universe.csv");
        let f = dir.path().join("etf_fundamentals.csv");
        fs::write(&u, universe).unwrap();
        fs::write(&f, fundamentals).unwrap();
        (dir, CsvReferenceAdapter::new(u, f))
    }

    #[test]
    fn loads_universe_with_extra_columns() {
        let (_dir, adapter) = adapter_with(
            "Ticker,Category,Name\nxeqt.to,Growth,All-Equity\nZWC.TO, Covered Call ,BMO\n",
            "ticker,distribution_yield,category\n",
        );
        let universe = adapter.load_universe().unwrap();
        assert_eq!(universe.len(), 2);
        assert_eq!(universe[0].ticker, "XEQT.TO");
        assert_eq!(universe[1].category, "Covered Call");
    }

    #[test]
    fn loads_fundamentals() {
        let (_dir, adapter) = adapter_with(
            "ticker,category\n",
            "ticker,distribution_yield,category\nVDY.TO,0.045,Dividend\nzwc.to,0.071,Covered Call\n",
        );
        let fundamentals = adapter.load_fundamentals().unwrap();
        assert_eq!(fundamentals.len(), 2);
        assert_eq!(fundamentals[1].ticker, "ZWC.TO");
        assert!((fundamentals[0].distribution_yield - 0.045).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_yield_reports_row() {
        let (_dir, adapter) = adapter_with(
            "ticker,category\n",
            "ticker,distribution_yield,category\nVDY.TO,0.045,Dividend\nZWC.TO,high,Covered Call\n",
        );
        let err = adapter.load_fundamentals().unwrap_err();
        match err {
            EtfEngineError::DataFile { reason, .. } => assert!(reason.starts_with("row 3:")),
            other => panic!("expected DataFile, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_data_error() {
        let adapter = CsvReferenceAdapter::new(
            PathBuf::from("/nonexistent/u.csv"),
            PathBuf::from("/nonexistent/f.csv"),
        );
        assert!(matches!(
            adapter.load_universe(),
            Err(EtfEngineError::DataFile { .. })
        ));
    }

    #[test]
    fn missing_category_column_is_data_error() {
        let (_dir, adapter) = adapter_with("ticker\nXEQT.TO\n", "ticker,distribution_yield,category\n");
        assert!(matches!(
            adapter.load_universe(),
            Err(EtfEngineError::DataFile { .. })
        ));
    }
}
