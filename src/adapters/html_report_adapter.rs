//! HTML report adapter implementing ReportPort.
//!
//! Generates a self-contained HTML page from an Askama template. All numbers
//! are pre-formatted here so the template only lays out strings.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::adapters::console_report::{pct, pct_opt};
use crate::domain::engine::EngineReport;
use crate::domain::error::EtfEngineError;
use crate::domain::etf::UniverseEntry;
use crate::ports::report_port::ReportPort;

struct MetricsRow {
    ticker: String,
    price: String,
    cagr: String,
    volatility: String,
    drawdown: String,
}

struct SkippedRow {
    ticker: String,
    reason: String,
}

struct ScoredRow {
    ticker: String,
    category: String,
    distribution_yield: String,
    cagr: String,
    income_score: String,
    growth_score: String,
    total_score: String,
}

struct HoldingRow {
    ticker: String,
    category: String,
    distribution_yield: String,
    weight: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    as_of: chrono::NaiveDate,
    universe: &'a [UniverseEntry],
    metrics: Vec<MetricsRow>,
    skipped: Vec<SkippedRow>,
    min_yield: String,
    scored: Vec<ScoredRow>,
    phase: String,
    max_weight: String,
    holdings: Vec<HoldingRow>,
    categories: Vec<(String, String)>,
    over_cap: usize,
    portfolio_yield: String,
}

impl<'a> ReportTemplate<'a> {
    fn from_report(report: &'a EngineReport) -> Self {
        let metrics = report
            .metrics
            .iter()
            .map(|m| MetricsRow {
                ticker: m.ticker.clone(),
                price: format!("{:.2}", m.last_price),
                cagr: pct_opt(m.cagr_5y),
                volatility: pct_opt(m.volatility),
                drawdown: pct_opt(m.max_drawdown),
            })
            .collect();

        let skipped = report
            .skipped
            .iter()
            .map(|s| SkippedRow {
                ticker: s.ticker.clone(),
                reason: s.reason.to_string(),
            })
            .collect();

        let scored = report
            .scored
            .iter()
            .map(|s| ScoredRow {
                ticker: s.ticker().to_string(),
                category: s.category().to_string(),
                distribution_yield: pct(s.distribution_yield()),
                cagr: pct_opt(s.row.metrics.cagr_5y),
                income_score: format!("{:.2}", s.income_score),
                growth_score: format!("{:.2}", s.growth_score),
                total_score: format!("{:.2}", s.total_score),
            })
            .collect();

        let portfolio = &report.portfolio;
        let holdings = portfolio
            .rows
            .iter()
            .map(|r| HoldingRow {
                ticker: r.ticker.clone(),
                category: r.category.clone(),
                distribution_yield: pct(r.distribution_yield),
                weight: pct(r.weight),
            })
            .collect();

        let categories = portfolio
            .category_weights()
            .into_iter()
            .map(|(c, w)| (c, pct(w)))
            .collect();

        ReportTemplate {
            as_of: report.as_of,
            universe: &report.universe,
            metrics,
            skipped,
            min_yield: pct(report.min_yield),
            scored,
            phase: portfolio.phase.to_string(),
            max_weight: pct(portfolio.max_weight),
            holdings,
            categories,
            over_cap: portfolio.over_cap().len(),
            portfolio_yield: pct(report.portfolio_yield()),
        }
    }
}

pub fn render_html(report: &EngineReport) -> Result<String, EtfEngineError> {
    ReportTemplate::from_report(report)
        .render()
        .map_err(|e| EtfEngineError::Report {
            reason: e.to_string(),
        })
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, report: &EngineReport, output_path: &str) -> Result<(), EtfEngineError> {
        let html = render_html(report)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(EtfEngineError::Io)?;
        }
        fs::write(path, html).map_err(EtfEngineError::Io)?;

        Ok(())
    }
}
