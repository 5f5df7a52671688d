//! Port traits implemented by the adapters.

pub mod price_port;
pub mod reference_port;
pub mod config_port;
pub mod report_port;
