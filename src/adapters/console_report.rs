//! Plain-text report rendering.
//!
//! Renders the universe, metrics, scored candidates and portfolio as
//! fixed-width tables. Used for stdout and for `.txt` report files.

use std::fs;
use std::path::Path;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::domain::engine::EngineReport;
use crate::domain::error::EtfEngineError;
use crate::domain::etf::UniverseEntry;
use crate::domain::metrics::EtfMetrics;
use crate::domain::portfolio::Portfolio;
use crate::domain::scoring::ScoredEtf;
use crate::domain::universe::SkippedTicker;
use crate::ports::report_port::ReportPort;

const NOT_AVAILABLE: &str = "n/a";

/// Fraction as a percentage with two decimals: 0.1234 → "12.34%".
pub fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn pct_opt(value: Option<f64>) -> String {
    value.map(pct).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Tabled)]
struct UniverseLine<'a> {
    #[tabled(rename = "Ticker")]
    ticker: &'a str,
    #[tabled(rename = "Category")]
    category: &'a str,
}

#[derive(Tabled)]
struct MetricsLine {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "CAGR 5Y")]
    cagr: String,
    #[tabled(rename = "Volatility")]
    volatility: String,
    #[tabled(rename = "Max Drawdown")]
    drawdown: String,
}

#[derive(Tabled)]
struct ScoredLine {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Yield")]
    distribution_yield: String,
    #[tabled(rename = "CAGR 5Y")]
    cagr: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Growth")]
    growth: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct HoldingLine {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Yield")]
    distribution_yield: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

#[derive(Tabled)]
struct CategoryLine {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

/// Header-ruled table; columns from `numeric_from` onwards are right-aligned.
fn render_table<T: Tabled>(rows: Vec<T>, numeric_from: Option<usize>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    if let Some(first) = numeric_from {
        table.with(Modify::new(Columns::new(first..)).with(Alignment::right()));
    }
    let mut out = table.to_string();
    out.push('\n');
    out
}

pub fn render_universe(universe: &[UniverseEntry]) -> String {
    let rows = universe
        .iter()
        .map(|e| UniverseLine {
            ticker: &e.ticker,
            category: &e.category,
        })
        .collect();
    render_table::<UniverseLine<'_>>(rows, None)
}

pub fn render_metrics(metrics: &[EtfMetrics]) -> String {
    let rows = metrics
        .iter()
        .map(|m| MetricsLine {
            ticker: m.ticker.clone(),
            price: format!("{:.2}", m.last_price),
            cagr: pct_opt(m.cagr_5y),
            volatility: pct_opt(m.volatility),
            drawdown: pct_opt(m.max_drawdown),
        })
        .collect();
    render_table::<MetricsLine>(rows, Some(1))
}

pub fn render_skipped(skipped: &[SkippedTicker]) -> String {
    skipped
        .iter()
        .map(|s| format!("  {}: {}\n", s.ticker, s.reason))
        .collect()
}

pub fn render_scored(scored: &[ScoredEtf]) -> String {
    let rows = scored
        .iter()
        .map(|s| ScoredLine {
            ticker: s.ticker().to_string(),
            category: s.category().to_string(),
            distribution_yield: pct(s.distribution_yield()),
            cagr: pct_opt(s.row.metrics.cagr_5y),
            income: format!("{:.2}", s.income_score),
            growth: format!("{:.2}", s.growth_score),
            total: format!("{:.2}", s.total_score),
        })
        .collect();
    render_table::<ScoredLine>(rows, Some(2))
}

pub fn render_portfolio(portfolio: &Portfolio) -> String {
    let holdings = portfolio
        .rows
        .iter()
        .map(|row| HoldingLine {
            ticker: row.ticker.clone(),
            category: row.category.clone(),
            distribution_yield: pct(row.distribution_yield),
            weight: pct(row.weight),
        })
        .collect();

    let breakdown = portfolio
        .category_weights()
        .into_iter()
        .map(|(category, weight)| CategoryLine {
            category,
            weight: pct(weight),
        })
        .collect();

    let mut out = render_table::<HoldingLine>(holdings, Some(2));
    out.push('\n');
    out.push_str(&render_table::<CategoryLine>(breakdown, Some(1)));
    out
}

pub fn render_report(report: &EngineReport) -> String {
    let portfolio = &report.portfolio;
    let mut out = format!("Canadian ETF Engine (as of {})\n\n", report.as_of);

    out.push_str("== ETF Universe ==\n");
    out.push_str(&render_universe(&report.universe));

    out.push_str("\n== ETF Performance Metrics (5-Year) ==\n");
    out.push_str(&render_metrics(&report.metrics));
    if !report.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        out.push_str(&render_skipped(&report.skipped));
    }

    out.push_str(&format!(
        "\n== Income Candidates (yield >= {}) ==\n",
        pct(report.min_yield)
    ));
    out.push_str(&render_scored(&report.scored));

    out.push_str(&format!(
        "\n== {} Portfolio (cap {} per holding) ==\n",
        portfolio.phase,
        pct(portfolio.max_weight)
    ));
    out.push_str(&render_portfolio(portfolio));

    let over = portfolio.over_cap();
    if !over.is_empty() {
        out.push_str(&format!(
            "\nNote: {} holding(s) above the {} cap after renormalization.\n",
            over.len(),
            pct(portfolio.max_weight)
        ));
    }

    out.push_str(&format!(
        "\nPortfolio Yield: {}\n",
        pct(report.portfolio_yield())
    ));
    out
}

pub struct ConsoleReport;

impl ConsoleReport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for ConsoleReport {
    fn write(&self, report: &EngineReport, output_path: &str) -> Result<(), EtfEngineError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, render_report(report))?;
        Ok(())
    }
}
