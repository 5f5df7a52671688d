//! Report generation port trait.

use crate::domain::engine::EngineReport;
use crate::domain::error::EtfEngineError;

/// Port for writing a rendered engine run to a file.
pub trait ReportPort {
    fn write(&self, report: &EngineReport, output_path: &str) -> Result<(), EtfEngineError>;
}
