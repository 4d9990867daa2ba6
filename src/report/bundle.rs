//! Markdown report bundle for a single scored applicant.
//!
//! Written to `reports/` by the TUI (`d`) and by `risk predict --report`, so a
//! decision can be inspected or shared after the fact.

use std::fmt::Write as _;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{Applicant, ScoredResult};
use crate::error::AppError;
use crate::package::DriverTable;
use crate::report::format::probability_gauge;

pub const REPORT_DIR: &str = "reports";

pub fn write_report_bundle(
    dir: &Path,
    applicant: &Applicant,
    result: &ScoredResult,
    drivers: &DriverTable,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create report dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("risk_report_{}_{ts}.md", result.model.tag()));

    let text = render_report(applicant, result, drivers)
        .map_err(|e| AppError::new(4, format!("Failed to render report: {e}")))?;
    write(&path, text).map_err(|e| AppError::new(4, format!("Failed to write report '{}': {e}", path.display())))?;
    Ok(path)
}

fn render_report(applicant: &Applicant, result: &ScoredResult, drivers: &DriverTable) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# Credit risk report")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- model: {}", result.model.display_name())?;
    writeln!(out, "- threshold: {}", result.threshold)?;

    writeln!(out, "\n## Applicant")?;
    writeln!(out, "| field | value |")?;
    writeln!(out, "| - | - |")?;
    writeln!(out, "| age | {} |", applicant.age)?;
    writeln!(out, "| income | {:.0} |", applicant.income)?;
    writeln!(out, "| home ownership | {} |", applicant.home_ownership.as_str())?;
    writeln!(out, "| employment length | {:.1} |", applicant.emp_length)?;
    writeln!(out, "| loan intent | {} |", applicant.loan_intent.as_str())?;
    writeln!(out, "| loan amount | {:.0} |", applicant.loan_amount)?;
    writeln!(out, "| interest rate | {:.2}% |", applicant.interest_rate)?;
    writeln!(out, "| prior default | {} |", applicant.prior_default_flag())?;
    writeln!(out, "| credit history | {} |", applicant.credit_history_years)?;

    writeln!(out, "\n## Decision")?;
    writeln!(out, "| field | value |")?;
    writeln!(out, "| - | - |")?;
    writeln!(out, "| predicted class | {} ({}) |", result.outcome.label(), result.class())?;
    writeln!(out, "| risk level | {} |", result.tier.label())?;
    writeln!(out, "| default probability | {:.4} |", result.probability)?;
    writeln!(out, "| confidence | {:.2}% |", result.confidence * 100.0)?;
    if let Some(grade) = result.grade {
        writeln!(out, "| estimated loan grade | {grade} |")?;
    }
    if let Some(lpi) = result.loan_percent_income {
        writeln!(out, "| loan % of income | {:.1}% |", lpi * 100.0)?;
    }
    writeln!(out, "\n```text\n{}\n```", probability_gauge(result.probability, 40))?;

    let top = drivers.top(10);
    if !top.is_empty() {
        writeln!(out, "\n## {}", drivers.title())?;
        writeln!(out, "| rank | feature | value |")?;
        writeln!(out, "| - | - | - |")?;
        for (rank, (name, value)) in top.iter().enumerate() {
            writeln!(out, "| {} | {name} | {value:.4} |", rank + 1)?;
        }
    }
    Ok(out)
}
