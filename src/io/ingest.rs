//! Batch CSV ingest.
//!
//! Turns an applicant table into `RawRow`s keyed by column name, ready for
//! `Scorer::score_batch`. The original records are kept so the export can
//! reproduce the input table unchanged.
//!
//! Rules:
//! - every feature column must be present (under its own name or its alias),
//!   except derived columns that can be computed from the rest of the row
//! - encoded columns are read as text; numeric feature columns must parse as
//!   finite numbers on every row, otherwise the batch is rejected
//! - no filtering: N data rows in means N rows out

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{columns, RawRow, RawValue};
use crate::error::{AppError, ScoreError};
use crate::package::ModelPackage;

/// A parsed batch: original header and records plus the typed rows.
#[derive(Debug, Clone)]
pub struct BatchTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
    pub rows: Vec<RawRow>,
}

impl BatchTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Open and parse a batch CSV from disk.
pub fn load_batch(path: &Path, package: &ModelPackage) -> Result<BatchTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = read_batch(file, package)?;
    info!(path = %path.display(), rows = table.len(), "loaded batch");
    Ok(table)
}

/// Parse a batch CSV from any reader.
pub fn read_batch<R: Read>(reader: R, package: &ModelPackage) -> Result<BatchTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let header_map: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

    ensure_feature_columns_exist(package, &header_map)?;

    let mut records = Vec::new();
    let mut rows = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Line {line}: CSV parse error: {e}")))?;
        let row = parse_row(&record, &names, package).map_err(|e| AppError::new(2, format!("Line {line}: {e}")))?;
        rows.push(row);
        records.push(record);
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No rows to score: the CSV has a header but no data rows."));
    }

    debug!(columns = names.len(), rows = rows.len(), "parsed batch table");
    Ok(BatchTable { headers, records, rows })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn has_column(header_map: &HashMap<&str, usize>, name: &str) -> bool {
    header_map.contains_key(name) || columns::alias_of(name).is_some_and(|alias| header_map.contains_key(alias))
}

/// Whether `name` can be filled per row from other columns of the table.
fn is_derivable(header_map: &HashMap<&str, usize>, name: &str) -> bool {
    let lpi = has_column(header_map, columns::PERCENT_INCOME)
        || (has_column(header_map, columns::LOAN_AMOUNT) && has_column(header_map, columns::INCOME));
    match name {
        columns::PERCENT_INCOME => lpi,
        columns::LOAN_GRADE => {
            lpi && has_column(header_map, columns::INTEREST_RATE) && has_column(header_map, columns::CREDIT_HISTORY)
        }
        _ => false,
    }
}

/// Feature columns the header neither carries (under either spelling) nor
/// lets us derive.
pub fn missing_feature_columns<'p>(package: &'p ModelPackage, headers: &[String]) -> Vec<&'p str> {
    let header_map: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    missing_in(package, &header_map)
}

fn missing_in<'p>(package: &'p ModelPackage, header_map: &HashMap<&str, usize>) -> Vec<&'p str> {
    package
        .feature_columns
        .iter()
        .map(String::as_str)
        .filter(|name| !has_column(header_map, name) && !is_derivable(header_map, name))
        .collect()
}

fn ensure_feature_columns_exist(package: &ModelPackage, header_map: &HashMap<&str, usize>) -> Result<(), AppError> {
    let missing = missing_in(package, header_map);
    if missing.is_empty() {
        return Ok(());
    }
    let list = missing.iter().map(|m| format!("`{m}`")).collect::<Vec<_>>().join(", ");
    Err(ScoreError::SchemaMismatch(format!("missing required column(s): {list}")).into())
}

/// Read only the normalized header row of a CSV file.
pub fn peek_headers(path: &Path) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .ok()?;
    let headers = reader.headers().ok()?;
    Some(headers.iter().map(normalize_header_name).collect())
}

/// Columns whose values must be numeric: features without an encoder, plus
/// their alias spellings.
fn is_numeric_feature(package: &ModelPackage, name: &str) -> bool {
    let is_feature = |n: &str| package.feature_columns.iter().any(|c| c == n) && !package.encoders.contains_key(n);
    is_feature(name) || columns::alias_of(name).is_some_and(is_feature)
}

fn parse_row(record: &StringRecord, names: &[String], package: &ModelPackage) -> Result<RawRow, String> {
    let mut row = RawRow::new();

    for (idx, name) in names.iter().enumerate() {
        let text = record.get(idx).unwrap_or("").trim();

        let value = if package.encoders.contains_key(name) {
            RawValue::Category(text.to_string())
        } else if is_numeric_feature(package, name) {
            match RawValue::parse(text) {
                RawValue::Number(v) => RawValue::Number(v),
                RawValue::Category(_) => {
                    return Err(ScoreError::NonNumeric {
                        column: name.clone(),
                        value: text.to_string(),
                    }
                    .to_string());
                }
            }
        } else {
            RawValue::parse(text)
        };

        row.insert(name.clone(), value);
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures;

    const HEADER: &str = "person_age,person_income,person_home_ownership,person_emp_length,loan_intent,\
loan_amnt,loan_int_rate,cb_person_default_on_file,cb_person_cred_hist_length";

    fn csv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out
    }

    #[test]
    fn reads_rows_and_allows_missing_derived_columns() {
        let pkg = fixtures::package();
        let data = csv(&[
            "30,50000,RENT,3,EDUCATION,5000,11.5,N,4",
            "45,80000,MORTGAGE,12,VENTURE,20000,14.0,Y,15",
        ]);
        let table = read_batch(data.as_bytes(), &pkg).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.rows[1].get("loan_intent"), Some(&RawValue::from("VENTURE")));
        assert_eq!(table.rows[0].get("loan_int_rate"), Some(&RawValue::Number(11.5)));
    }

    #[test]
    fn strips_bom_and_accepts_aliased_headers() {
        let pkg = fixtures::package();
        let data = "\u{feff}person_age,person_income($),person_home_ownership,person_emp_length,loan_intent,\
loan_amnt($),loan_int_rate,cb_person_default_on_file,cb_person_cred_hist_length\n\
30,50000,RENT,3,EDUCATION,5000,11.5,N,4\n";
        let table = read_batch(data.as_bytes(), &pkg).unwrap();
        assert!(table.rows[0].contains_key("person_age"));
        assert_eq!(table.rows[0].get("person_income($)"), Some(&RawValue::Number(50_000.0)));
    }

    #[test]
    fn missing_feature_column_is_schema_mismatch() {
        let pkg = fixtures::package();
        let data = "person_age,person_income\n30,50000\n";
        let err = read_batch(data.as_bytes(), &pkg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Schema mismatch"));
        assert!(err.message().contains("`loan_intent`"));
        // Neither derived column has its inputs here.
        assert!(err.message().contains("`loan_grade`"));
        assert!(err.message().contains("`loan_percent_income`"));
    }

    #[test]
    fn grade_is_not_required_when_its_inputs_are_present() {
        let pkg = fixtures::package();
        let data = "person_age,person_income,loan_amnt,loan_int_rate,cb_person_cred_hist_length\n30,50000,5000,11.5,4\n";
        let err = read_batch(data.as_bytes(), &pkg).unwrap_err();
        assert!(err.message().contains("`loan_intent`"));
        assert!(!err.message().contains("`loan_grade`"));
        assert!(!err.message().contains("`loan_percent_income`"));
    }

    #[test]
    fn derivable_columns_are_not_reported_missing() {
        let pkg = fixtures::package();
        let headers: Vec<String> = HEADER.split(',').map(String::from).collect();
        assert!(missing_feature_columns(&pkg, &headers).is_empty());

        let partial = vec!["person_age".to_string(), "loan_percent_income".to_string()];
        let missing = missing_feature_columns(&pkg, &partial);
        assert!(missing.contains(&"loan_intent"));
        assert!(!missing.contains(&"loan_percent_income"));
    }

    #[test]
    fn non_numeric_cell_rejects_batch_with_line() {
        let pkg = fixtures::package();
        let data = csv(&[
            "30,50000,RENT,3,EDUCATION,5000,11.5,N,4",
            "thirty,50000,RENT,3,EDUCATION,5000,11.5,N,4",
        ]);
        let err = read_batch(data.as_bytes(), &pkg).unwrap_err();
        assert!(err.message().starts_with("Line 3:"));
        assert!(err.message().contains("person_age"));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let pkg = fixtures::package();
        let err = read_batch(csv(&[]).as_bytes(), &pkg).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn extra_columns_are_kept_as_is() {
        let pkg = fixtures::package();
        let data = format!("id,{HEADER}\nA-1,30,50000,RENT,3,EDUCATION,5000,11.5,N,4\n");
        let table = read_batch(data.as_bytes(), &pkg).unwrap();
        assert_eq!(table.rows[0].get("id"), Some(&RawValue::from("A-1")));
        assert_eq!(table.headers.get(0), Some("id"));
    }
}
