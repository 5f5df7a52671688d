//! Price history access port trait.

use crate::domain::error::EtfEngineError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait PricePort {
    /// Daily adjusted closes for one ticker in `[start_date, end_date]`,
    /// ordered by date.
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, EtfEngineError>;

    /// Bulk fetch. Results come back in the order of `tickers`, one per ticker.
    /// Default implementation: one `fetch_closes` call after another.
    fn fetch_many(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<(String, Result<Vec<PricePoint>, EtfEngineError>)> {
        tickers
            .iter()
            .map(|t| (t.clone(), self.fetch_closes(t, start_date, end_date)))
            .collect()
    }
}
