//! Domain error types.

/// Top-level error type for etf-engine.
#[derive(Debug, thiserror::Error)]
pub enum EtfEngineError {
    #[error("failed to load {file}: {reason}")]
    DataFile { file: String, reason: String },

    #[error("price fetch failed for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown phase '{0}' (expected growth, transition or paycheque)")]
    UnknownPhase(String),

    #[error("no ETF price data returned")]
    NoPriceData,

    #[error("no ETFs meet the minimum yield of {:.2}%", .min_yield * 100.0)]
    NoCandidates { min_yield: f64 },

    #[error("no ETFs match the {phase} phase categories")]
    EmptyPortfolio { phase: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtfEngineError {
    /// True for the "nothing to show" states that halt a run without being
    /// caused by bad input.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            EtfEngineError::NoPriceData
                | EtfEngineError::NoCandidates { .. }
                | EtfEngineError::EmptyPortfolio { .. }
        )
    }
}

impl From<&EtfEngineError> for std::process::ExitCode {
    fn from(err: &EtfEngineError) -> Self {
        let code: u8 = match err {
            EtfEngineError::Io(_) | EtfEngineError::Report { .. } => 1,
            EtfEngineError::ConfigParse { .. }
            | EtfEngineError::ConfigMissing { .. }
            | EtfEngineError::ConfigInvalid { .. }
            | EtfEngineError::UnknownPhase(_) => 2,
            EtfEngineError::DataFile { .. } => 3,
            EtfEngineError::Fetch { .. } => 4,
            EtfEngineError::NoPriceData
            | EtfEngineError::NoCandidates { .. }
            | EtfEngineError::EmptyPortfolio { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_candidates_message_shows_percent() {
        let err = EtfEngineError::NoCandidates { min_yield: 0.035 };
        assert_eq!(err.to_string(), "no ETFs meet the minimum yield of 3.50%");
    }

    #[test]
    fn empty_result_states() {
        assert!(EtfEngineError::NoPriceData.is_empty_result());
        assert!(
            EtfEngineError::EmptyPortfolio {
                phase: "Growth".into()
            }
            .is_empty_result()
        );
        assert!(!EtfEngineError::UnknownPhase("x".into()).is_empty_result());
    }

    #[test]
    fn exit_codes_by_family() {
        use std::process::ExitCode;
        assert_eq!(
            ExitCode::from(&EtfEngineError::NoPriceData),
            ExitCode::from(5)
        );
        assert_eq!(
            ExitCode::from(&EtfEngineError::ConfigMissing {
                section: "data".into(),
                key: "universe".into(),
            }),
            ExitCode::from(2)
        );
        assert_eq!(
            ExitCode::from(&EtfEngineError::DataFile {
                file: "x.csv".into(),
                reason: "missing".into(),
            }),
            ExitCode::from(3)
        );
    }
}
