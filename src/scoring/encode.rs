//! Categorical encoding and projection onto the package's feature columns.

use tracing::debug;

use crate::domain::{columns, RawRow, RawValue, UnknownCategoryPolicy};
use crate::error::ScoreError;
use crate::package::ModelPackage;

/// Encode one categorical value with the column's fitted encoder.
///
/// Unknown categories follow `policy`: `Zero` substitutes class index 0,
/// `Reject` fails the row.
pub fn encode_category(
    package: &ModelPackage,
    column: &str,
    value: &RawValue,
    policy: UnknownCategoryPolicy,
) -> Result<Option<f64>, ScoreError> {
    let Some(encoder) = package.encoders.get(column) else {
        return Ok(None);
    };
    let text = value.as_text();
    match encoder.encode(&text) {
        Some(idx) => Ok(Some(idx as f64)),
        None => match policy {
            UnknownCategoryPolicy::Zero => {
                debug!(column, value = %text, "unknown category mapped to index 0");
                Ok(Some(0.0))
            }
            UnknownCategoryPolicy::Reject => Err(ScoreError::UnknownCategory {
                column: column.to_string(),
                value: text,
            }),
        },
    }
}

/// Assemble the numeric feature vector in `feature_columns` order.
///
/// Columns absent from the row are filled with 0. An aliased column
/// (`person_income` / `person_income($)`, `loan_amnt` / `loan_amnt($)`) is
/// looked up under its other spelling before falling back to 0.
pub fn project_row(
    package: &ModelPackage,
    row: &RawRow,
    policy: UnknownCategoryPolicy,
) -> Result<Vec<f64>, ScoreError> {
    let mut out = Vec::with_capacity(package.n_features());

    for column in &package.feature_columns {
        let value = row
            .get(column)
            .or_else(|| columns::alias_of(column).and_then(|alias| row.get(alias)));

        let Some(value) = value else {
            out.push(0.0);
            continue;
        };

        if let Some(code) = encode_category(package, column, value, policy)? {
            out.push(code);
            continue;
        }

        match value {
            RawValue::Number(v) if v.is_finite() => out.push(*v),
            other => {
                return Err(ScoreError::NonNumeric {
                    column: column.clone(),
                    value: other.as_text(),
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures;

    fn col(package: &ModelPackage, name: &str) -> usize {
        package.feature_columns.iter().position(|c| c == name).unwrap()
    }

    #[test]
    fn known_category_maps_to_class_index() {
        let pkg = fixtures::package();
        let code = encode_category(
            &pkg,
            "person_home_ownership",
            &RawValue::from("OWN"),
            UnknownCategoryPolicy::Reject,
        )
        .unwrap();
        assert_eq!(code, Some(2.0));
    }

    #[test]
    fn unseen_category_falls_back_to_zero() {
        let pkg = fixtures::package();
        let code = encode_category(
            &pkg,
            "loan_intent",
            &RawValue::from("SPACE_TRAVEL"),
            UnknownCategoryPolicy::Zero,
        )
        .unwrap();
        assert_eq!(code, Some(0.0));
    }

    #[test]
    fn unseen_category_is_rejected_under_reject() {
        let pkg = fixtures::package();
        let err = encode_category(
            &pkg,
            "loan_intent",
            &RawValue::from("SPACE_TRAVEL"),
            UnknownCategoryPolicy::Reject,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ScoreError::UnknownCategory {
                column: "loan_intent".into(),
                value: "SPACE_TRAVEL".into()
            }
        );
    }

    #[test]
    fn missing_columns_are_zero_filled() {
        let mut pkg = fixtures::package();
        pkg.feature_columns = vec!["a".into(), "b".into(), "c".into()];
        let mut row = RawRow::new();
        row.insert("a".into(), RawValue::Number(1.5));
        row.insert("b".into(), RawValue::Number(-2.0));
        row.insert("unused".into(), RawValue::Number(9.0));

        let x = project_row(&pkg, &row, UnknownCategoryPolicy::Reject).unwrap();
        assert_eq!(x, vec![1.5, -2.0, 0.0]);
    }

    #[test]
    fn aliased_income_column_is_found() {
        let mut pkg = fixtures::package();
        let idx = col(&pkg, "person_income");
        pkg.feature_columns[idx] = "person_income($)".into();
        let mut row = RawRow::new();
        row.insert("person_income".into(), RawValue::Number(42_000.0));

        let x = project_row(&pkg, &row, UnknownCategoryPolicy::Reject).unwrap();
        assert_eq!(x[idx], 42_000.0);
    }

    #[test]
    fn text_in_numeric_column_is_non_numeric() {
        let pkg = fixtures::package();
        let mut row = RawRow::new();
        row.insert("person_age".into(), RawValue::from("thirty"));
        let err = project_row(&pkg, &row, UnknownCategoryPolicy::Zero).unwrap_err();
        assert!(matches!(err, ScoreError::NonNumeric { .. }));
    }
}
