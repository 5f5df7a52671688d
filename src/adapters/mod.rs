//! Concrete adapter implementations for ports.

pub mod console_report;
pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "html")]
pub mod html_report_adapter;
pub mod reference_csv_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
