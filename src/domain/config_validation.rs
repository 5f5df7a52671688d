//! Configuration validation.
//!
//! Validates all config fields before any file is read or price fetched.

use crate::domain::error::EtfEngineError;
use crate::domain::phase::Phase;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), EtfEngineError> {
    validate_data_paths(config)?;
    validate_fetch(config)?;
    validate_scoring(config)?;
    validate_default_phase(config)?;
    for phase in Phase::ALL {
        validate_phase_profile(config, phase)?;
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> EtfEngineError {
    EtfEngineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_paths(config: &dyn ConfigPort) -> Result<(), EtfEngineError> {
    for key in ["universe", "fundamentals"] {
        if config.get_nonempty("data", key).is_none() {
            return Err(EtfEngineError::ConfigMissing {
                section: "data".to_string(),
                key: key.to_string(),
            });
        }
    }

    if let Some(list) = config.get_nonempty("data", "tickers") {
        parse_tickers(&list).map_err(|e| invalid("data", "tickers", e.to_string()))?;
    }
    Ok(())
}

fn validate_fetch(config: &dyn ConfigPort) -> Result<(), EtfEngineError> {
    let timeout = config.get_int("fetch", "timeout_secs", 30);
    if timeout <= 0 {
        return Err(invalid("fetch", "timeout_secs", "timeout_secs must be positive"));
    }

    if let Some(as_of) = config.get_nonempty("fetch", "as_of") {
        parse_as_of(&as_of)?;
    }

    if let Some(url) = config.get_nonempty("fetch", "base_url") {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("fetch", "base_url", "base_url must be an http(s) URL"));
        }
    }
    Ok(())
}

pub fn parse_as_of(value: &str) -> Result<NaiveDate, EtfEngineError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid("fetch", "as_of", "invalid as_of format, expected YYYY-MM-DD"))
}

pub fn validate_min_yield(value: f64) -> Result<(), EtfEngineError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "scoring",
            "min_yield",
            "min_yield must be a fraction between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_scoring(config: &dyn ConfigPort) -> Result<(), EtfEngineError> {
    validate_min_yield(config.get_double("scoring", "min_yield", 0.0))?;

    let growth = config.get_double("scoring", "growth_weight", 0.6);
    let income = config.get_double("scoring", "income_weight", 0.4);
    if growth < 0.0 {
        return Err(invalid("scoring", "growth_weight", "growth_weight must be non-negative"));
    }
    if income < 0.0 {
        return Err(invalid("scoring", "income_weight", "income_weight must be non-negative"));
    }
    if growth + income <= 0.0 {
        return Err(invalid(
            "scoring",
            "growth_weight",
            "growth_weight and income_weight cannot both be zero",
        ));
    }
    Ok(())
}

fn validate_default_phase(config: &dyn ConfigPort) -> Result<(), EtfEngineError> {
    match config.get_nonempty("portfolio", "phase") {
        Some(p) => p.parse::<Phase>().map(|_| ()),
        None => Ok(()),
    }
}

fn validate_phase_profile(config: &dyn ConfigPort, phase: Phase) -> Result<(), EtfEngineError> {
    let section = phase.config_section();

    if config.get_string(&section, "categories").is_some()
        && config.get_list(&section, "categories").is_none()
    {
        return Err(invalid(&section, "categories", "categories must not be empty"));
    }

    let cap = config.get_double(&section, "max_weight", phase.default_profile().max_weight);
    if cap <= 0.0 || cap > 1.0 {
        return Err(invalid(&section, "max_weight", "max_weight must be in (0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const BASE: &str = "[data]\nuniverse = u.csv\nfundamentals = f.csv\n";

    fn cfg(extra: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(&format!("{BASE}{extra}")).unwrap()
    }

    fn invalid_key(err: EtfEngineError) -> String {
        match err {
            EtfEngineError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(validate_engine_config(&cfg("")).is_ok());
    }

    #[test]
    fn missing_universe_path() {
        let adapter = FileConfigAdapter::from_string("[data]\nfundamentals = f.csv\n").unwrap();
        let err = validate_engine_config(&adapter).unwrap_err();
        assert!(matches!(err, EtfEngineError::ConfigMissing { key, .. } if key == "universe"));
    }

    #[test]
    fn min_yield_out_of_range() {
        let err = validate_engine_config(&cfg("[scoring]\nmin_yield = 1.5\n")).unwrap_err();
        assert_eq!(invalid_key(err), "min_yield");
        let err = validate_engine_config(&cfg("[scoring]\nmin_yield = -0.01\n")).unwrap_err();
        assert_eq!(invalid_key(err), "min_yield");
    }

    #[test]
    fn zero_score_weights() {
        let err = validate_engine_config(&cfg(
            "[scoring]\ngrowth_weight = 0\nincome_weight = 0\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "growth_weight");
    }

    #[test]
    fn negative_income_weight() {
        let err = validate_engine_config(&cfg("[scoring]\nincome_weight = -1\n")).unwrap_err();
        assert_eq!(invalid_key(err), "income_weight");
    }

    #[test]
    fn unknown_default_phase() {
        let err = validate_engine_config(&cfg("[portfolio]\nphase = retirement\n")).unwrap_err();
        assert!(matches!(err, EtfEngineError::UnknownPhase(_)));
    }

    #[test]
    fn phase_cap_out_of_range() {
        let err =
            validate_engine_config(&cfg("[phase.growth]\nmax_weight = 1.2\n")).unwrap_err();
        assert_eq!(invalid_key(err), "max_weight");
    }

    #[test]
    fn blank_phase_categories() {
        let err =
            validate_engine_config(&cfg("[phase.paycheque]\ncategories = , ,\n")).unwrap_err();
        assert_eq!(invalid_key(err), "categories");
    }

    #[test]
    fn bad_as_of_date() {
        let err = validate_engine_config(&cfg("[fetch]\nas_of = 2024/01/31\n")).unwrap_err();
        assert_eq!(invalid_key(err), "as_of");
    }

    #[test]
    fn non_http_base_url() {
        let err =
            validate_engine_config(&cfg("[fetch]\nbase_url = ftp://example.com\n")).unwrap_err();
        assert_eq!(invalid_key(err), "base_url");
    }

    #[test]
    fn duplicate_ticker_subset() {
        let err = validate_engine_config(&cfg("tickers = VFV.TO, vfv.to\n")).unwrap_err();
        assert_eq!(invalid_key(err), "tickers");
    }

    #[test]
    fn zero_timeout() {
        let err = validate_engine_config(&cfg("[fetch]\ntimeout_secs = 0\n")).unwrap_err();
        assert_eq!(invalid_key(err), "timeout_secs");
    }
}
