//! CLI definition and dispatch.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::{render_metrics, render_report, render_skipped, render_universe};
use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::reference_csv_adapter::CsvReferenceAdapter;
use crate::domain::config_validation::{parse_as_of, validate_engine_config, validate_min_yield};
use crate::domain::engine::{run_engine, run_metrics, window_start, EngineConfig};
use crate::domain::error::EtfEngineError;
use crate::domain::phase::{Phase, PhaseProfile};
use crate::domain::universe::parse_tickers;
use crate::domain::scoring::{
    ScoringConfig, DEFAULT_GROWTH_WEIGHT, DEFAULT_INCOME_WEIGHT, DEFAULT_MIN_YIELD,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::reference_port::ReferencePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "etf-engine",
    about = "ETF metrics, income scoring and phase-based portfolio allocation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute metrics, score the universe and build the phase portfolio
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// growth, transition or paycheque
        #[arg(short, long)]
        phase: Option<String>,
        /// Minimum distribution yield as a fraction (0.03 = 3%)
        #[arg(long)]
        min_yield: Option<f64>,
        /// Read prices from {TICKER}.csv files instead of fetching them
        #[arg(long)]
        prices_dir: Option<PathBuf>,
        /// Comma-separated subset of the universe
        #[arg(long)]
        tickers: Option<String>,
        /// End of the trailing window (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
        /// Also write an HTML report
        #[arg(long)]
        html: Option<PathBuf>,
        /// Also write the text report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the 5-year metrics table only
    Metrics {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        prices_dir: Option<PathBuf>,
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Show the universe joined with its fundamentals
    Universe {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// CLI values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub phase: Option<String>,
    pub min_yield: Option<f64>,
    pub prices_dir: Option<PathBuf>,
    pub tickers: Option<String>,
    pub as_of: Option<String>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            phase,
            min_yield,
            prices_dir,
            tickers,
            as_of,
            html,
            output,
        } => {
            let overrides = Overrides {
                phase,
                min_yield,
                prices_dir,
                tickers,
                as_of,
            };
            run_full(&config, &overrides, html.as_ref(), output.as_ref())
        }
        Command::Metrics {
            config,
            prices_dir,
            tickers,
            as_of,
        } => {
            let overrides = Overrides {
                prices_dir,
                tickers,
                as_of,
                ..Overrides::default()
            };
            run_metrics_only(&config, &overrides)
        }
        Command::Universe { config } => run_universe(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &EtfEngineError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EtfEngineError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

fn load_validated(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    validate_engine_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

pub fn resolve_as_of(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<NaiveDate, EtfEngineError> {
    match overrides
        .as_of
        .clone()
        .or_else(|| config.get_nonempty("fetch", "as_of"))
    {
        Some(s) => parse_as_of(&s),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn resolve_phase(config: &dyn ConfigPort, overrides: &Overrides) -> Result<Phase, EtfEngineError> {
    match overrides
        .phase
        .clone()
        .or_else(|| config.get_nonempty("portfolio", "phase"))
    {
        Some(p) => p.parse(),
        None => Ok(Phase::Growth),
    }
}

/// Ticker subset from `--tickers` or `[data] tickers`, if any.
pub fn resolve_tickers(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<Option<Vec<String>>, EtfEngineError> {
    let Some(list) = overrides
        .tickers
        .clone()
        .or_else(|| config.get_nonempty("data", "tickers"))
    else {
        return Ok(None);
    };
    parse_tickers(&list)
        .map(Some)
        .map_err(|e| EtfEngineError::ConfigInvalid {
            section: "data".into(),
            key: "tickers".into(),
            reason: e.to_string(),
        })
}

/// The phase's default profile with any `[phase.<name>]` overrides applied.
pub fn build_phase_profile(config: &dyn ConfigPort, phase: Phase) -> PhaseProfile {
    let defaults = phase.default_profile();
    let section = phase.config_section();
    PhaseProfile {
        categories: config
            .get_list(&section, "categories")
            .unwrap_or(defaults.categories),
        max_weight: config.get_double(&section, "max_weight", defaults.max_weight),
    }
}

pub fn build_scoring_config(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<ScoringConfig, EtfEngineError> {
    let min_yield = overrides
        .min_yield
        .unwrap_or_else(|| config.get_double("scoring", "min_yield", DEFAULT_MIN_YIELD));
    validate_min_yield(min_yield)?;

    Ok(ScoringConfig {
        min_yield,
        growth_weight: config.get_double("scoring", "growth_weight", DEFAULT_GROWTH_WEIGHT),
        income_weight: config.get_double("scoring", "income_weight", DEFAULT_INCOME_WEIGHT),
    })
}

pub fn build_engine_config(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<EngineConfig, EtfEngineError> {
    let as_of = resolve_as_of(config, overrides)?;
    let phase = resolve_phase(config, overrides)?;

    let mut engine_config =
        EngineConfig::trailing(as_of, phase, build_scoring_config(config, overrides)?);
    engine_config.profile = build_phase_profile(config, phase);
    engine_config.tickers = resolve_tickers(config, overrides)?;
    Ok(engine_config)
}

pub fn build_reference_adapter(config: &dyn ConfigPort) -> Result<CsvReferenceAdapter, EtfEngineError> {
    let path = |key: &str| {
        config
            .get_nonempty("data", key)
            .map(PathBuf::from)
            .ok_or_else(|| EtfEngineError::ConfigMissing {
                section: "data".into(),
                key: key.into(),
            })
    };
    Ok(CsvReferenceAdapter::new(path("universe")?, path("fundamentals")?))
}

/// CSV directory when one is configured, otherwise the live Yahoo source.
pub fn build_price_port(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<Box<dyn PricePort>, EtfEngineError> {
    let prices_dir = overrides
        .prices_dir
        .clone()
        .or_else(|| config.get_nonempty("data", "prices_dir").map(PathBuf::from));

    if let Some(dir) = prices_dir {
        info!("Reading prices from {}", dir.display());
        return Ok(Box::new(CsvPriceAdapter::new(dir)));
    }

    #[cfg(feature = "yahoo")]
    {
        use crate::adapters::yahoo_adapter::YahooAdapter;
        Ok(Box::new(YahooAdapter::from_config(config)?))
    }

    #[cfg(not(feature = "yahoo"))]
    {
        Err(EtfEngineError::ConfigMissing {
            section: "data".into(),
            key: "prices_dir".into(),
        })
    }
}

fn run_full(
    config_path: &Path,
    overrides: &Overrides,
    html_path: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prepared = build_engine_config(&adapter, overrides).and_then(|engine_config| {
        let reference = build_reference_adapter(&adapter)?;
        let prices = build_price_port(&adapter, overrides)?;
        Ok((engine_config, reference, prices))
    });
    let (engine_config, reference, prices) = match prepared {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let html_path = html_path
        .cloned()
        .or_else(|| adapter.get_nonempty("report", "html").map(PathBuf::from));

    run_pipeline(
        prices.as_ref(),
        &reference,
        &engine_config,
        html_path.as_ref(),
        output_path,
    )
}

/// Stages after config resolution: engine run, stdout tables, report files.
pub fn run_pipeline(
    price_port: &dyn PricePort,
    reference_port: &dyn ReferencePort,
    engine_config: &EngineConfig,
    html_path: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let report = match run_engine(price_port, reference_port, engine_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print!("{}", render_report(&report));

    if let Some(path) = output_path {
        let writer = crate::adapters::console_report::ConsoleReport::new();
        if let Err(e) = writer.write(&report, &path.to_string_lossy()) {
            return fail(&e);
        }
        info!("Text report written to: {}", path.display());
    }

    if let Some(path) = html_path {
        #[cfg(feature = "html")]
        {
            let writer = crate::adapters::html_report_adapter::HtmlReportAdapter::new();
            if let Err(e) = writer.write(&report, &path.to_string_lossy()) {
                return fail(&e);
            }
            info!("HTML report written to: {}", path.display());
        }

        #[cfg(not(feature = "html"))]
        {
            eprintln!(
                "warning: html feature is required to write {}",
                path.display()
            );
        }
    }

    ExitCode::SUCCESS
}

fn run_metrics_only(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = resolve_as_of(&adapter, overrides).and_then(|as_of| {
        let tickers = resolve_tickers(&adapter, overrides)?;
        let reference = build_reference_adapter(&adapter)?;
        let prices = build_price_port(&adapter, overrides)?;
        run_metrics(
            prices.as_ref(),
            &reference,
            window_start(as_of),
            as_of,
            tickers.as_deref(),
        )
    });

    match result {
        Ok((_, metrics, skipped)) => {
            print!("{}", render_metrics(&metrics));
            if !skipped.is_empty() {
                println!("\nSkipped:");
                print!("{}", render_skipped(&skipped));
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_universe(config_path: &Path) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let loaded = build_reference_adapter(&adapter).and_then(|reference| {
        Ok((reference.load_universe()?, reference.load_fundamentals()?))
    });
    let (universe, fundamentals) = match loaded {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };

    print!("{}", render_universe(&universe));

    let missing: Vec<&str> = universe
        .iter()
        .filter(|u| !fundamentals.iter().any(|f| f.ticker == u.ticker))
        .map(|u| u.ticker.as_str())
        .collect();
    println!(
        "\n{} tickers, {} with fundamentals",
        universe.len(),
        universe.len() - missing.len()
    );
    if !missing.is_empty() {
        eprintln!("warning: no fundamentals for {}", missing.join(", "));
    }

    if let Some(dir) = adapter.get_nonempty("data", "prices_dir") {
        let available = match CsvPriceAdapter::new(PathBuf::from(dir)).list_tickers() {
            Ok(t) => t,
            Err(e) => return fail(&e),
        };
        let no_prices: Vec<&str> = universe
            .iter()
            .filter(|u| !available.contains(&u.ticker))
            .map(|u| u.ticker.as_str())
            .collect();
        if !no_prices.is_empty() {
            eprintln!("warning: no price file for {}", no_prices.join(", "));
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let scoring = match build_scoring_config(&adapter, &Overrides::default()) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    eprintln!(
        "\nScoring: min_yield {:.2}%, growth weight {}, income weight {}",
        scoring.min_yield * 100.0,
        scoring.growth_weight,
        scoring.income_weight
    );

    for section in adapter.sections() {
        if let Some(name) = section.strip_prefix("phase.") {
            if name.parse::<Phase>().is_err() {
                eprintln!("warning: [{section}] does not name a known phase and is ignored");
            }
        }
    }

    eprintln!("\nPhases:");
    for phase in Phase::ALL {
        let profile = build_phase_profile(&adapter, phase);
        eprintln!(
            "  {}: {} (cap {:.0}%)",
            phase,
            profile.categories.join(", "),
            profile.max_weight * 100.0
        );
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
