//! Export scored batches, single results and synthetic applicant tables.
//!
//! The scored CSV is the input table unchanged plus two columns, so it stays
//! easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{columns, Applicant, ScoredResult};
use crate::error::AppError;
use crate::io::ingest::BatchTable;
use crate::scoring::RowScore;

pub const RISK_LABEL_COLUMN: &str = "risk_label";
pub const PROBABILITY_COLUMN: &str = "default_probability";

/// `<dir>/<stem>_scored.csv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("batch");
    input.with_file_name(format!("{stem}_scored.csv"))
}

/// Write the input table plus `risk_label` and `default_probability`.
///
/// Rows without a score (row-scoped errors) get empty cells.
pub fn write_scored_csv<W: Write>(writer: W, table: &BatchTable, scores: &[RowScore]) -> Result<(), AppError> {
    if scores.len() != table.records.len() {
        return Err(AppError::new(
            4,
            format!(
                "Scored {} rows but the table has {}; refusing to write a misaligned file.",
                scores.len(),
                table.records.len()
            ),
        ));
    }

    let mut out = csv::Writer::from_writer(writer);
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write scored CSV: {e}"));

    let mut header: Vec<String> = table.headers.iter().map(str::to_string).collect();
    header.push(RISK_LABEL_COLUMN.to_string());
    header.push(PROBABILITY_COLUMN.to_string());
    out.write_record(&header).map_err(write_err)?;

    let width = table.headers.len();
    for (record, score) in table.records.iter().zip(scores) {
        let mut cells: Vec<String> = (0..width).map(|i| record.get(i).unwrap_or("").to_string()).collect();
        match score {
            Ok(result) => {
                cells.push(result.tier.label().to_string());
                cells.push(format!("{:.6}", result.probability));
            }
            Err(_) => {
                cells.push(String::new());
                cells.push(String::new());
            }
        }
        out.write_record(&cells).map_err(write_err)?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush scored CSV: {e}")))?;
    Ok(())
}

pub fn write_scored_csv_file(path: &Path, table: &BatchTable, scores: &[RowScore]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create scored CSV '{}': {e}", path.display())))?;
    write_scored_csv(file, table, scores)
}

/// Pretty JSON for `predict --json`.
pub fn write_result_json<W: Write>(mut writer: W, result: &ScoredResult) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Write applicants using the raw feature column names (derived columns omitted).
pub fn write_applicants_csv(path: &Path, applicants: &[Applicant]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    let mut out = csv::Writer::from_writer(file);
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write CSV '{}': {e}", path.display()));

    out.write_record([
        columns::AGE,
        columns::INCOME,
        columns::HOME_OWNERSHIP,
        columns::EMP_LENGTH,
        columns::LOAN_INTENT,
        columns::LOAN_AMOUNT,
        columns::INTEREST_RATE,
        columns::PRIOR_DEFAULT,
        columns::CREDIT_HISTORY,
    ])
    .map_err(write_err)?;

    for a in applicants {
        out.write_record([
            a.age.to_string(),
            format!("{:.0}", a.income),
            a.home_ownership.as_str().to_string(),
            format!("{:.1}", a.emp_length),
            a.loan_intent.as_str().to_string(),
            format!("{:.0}", a.loan_amount),
            format!("{:.2}", a.interest_rate),
            a.prior_default_flag().to_string(),
            a.credit_history_years.to_string(),
        ])
        .map_err(write_err)?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}
