//! Static reference data port trait (universe and fundamentals tables).

use crate::domain::error::EtfEngineError;
use crate::domain::etf::{Fundamentals, UniverseEntry};

pub trait ReferencePort {
    fn load_universe(&self) -> Result<Vec<UniverseEntry>, EtfEngineError>;

    fn load_fundamentals(&self) -> Result<Vec<Fundamentals>, EtfEngineError>;
}
