//! Derived features: loan-to-income ratio and the heuristic loan grade.
//!
//! The grade is a fixed step function with no learned parameters:
//!
//! ```text
//! risk_score = interest_rate * 2 + loan_percent_income * 100 - credit_history_years
//! ```
//!
//! bucketed by inclusive upper bounds 25/35/45/55/65/75 into A..F, G above.

use crate::domain::{columns, Applicant, LoanGrade, RawRow, RawValue};
use crate::math::round_to;

/// Inclusive upper bounds of grades A..F.
pub const GRADE_BOUNDS: [f64; 6] = [25.0, 35.0, 45.0, 55.0, 65.0, 75.0];

const GRADES: [LoanGrade; 7] = [
    LoanGrade::A,
    LoanGrade::B,
    LoanGrade::C,
    LoanGrade::D,
    LoanGrade::E,
    LoanGrade::F,
    LoanGrade::G,
];

/// Values computed from an applicant's raw inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub loan_percent_income: f64,
    pub risk_score: f64,
    pub grade: LoanGrade,
}

/// `loan_amount / income` to 4 decimals; exactly `0.0` when income is not positive.
pub fn loan_percent_income(loan_amount: f64, income: f64) -> f64 {
    if income > 0.0 {
        round_to(loan_amount / income, 4)
    } else {
        0.0
    }
}

pub fn risk_score(interest_rate: f64, loan_percent_income: f64, credit_history_years: f64) -> f64 {
    interest_rate * 2.0 + loan_percent_income * 100.0 - credit_history_years
}

pub fn grade_for_score(score: f64) -> LoanGrade {
    GRADE_BOUNDS
        .iter()
        .position(|&bound| score <= bound)
        .map(|idx| GRADES[idx])
        .unwrap_or(LoanGrade::G)
}

pub fn derive_features(loan_amount: f64, income: f64, interest_rate: f64, credit_history_years: f64) -> DerivedFeatures {
    let lpi = loan_percent_income(loan_amount, income);
    let score = risk_score(interest_rate, lpi, credit_history_years);
    DerivedFeatures {
        loan_percent_income: lpi,
        risk_score: score,
        grade: grade_for_score(score),
    }
}

/// Build the full raw row for a form applicant, derived features included.
///
/// Income and loan amount are written under both their plain and `($)` names.
pub fn applicant_row(applicant: &Applicant) -> (RawRow, DerivedFeatures) {
    let derived = derive_features(
        applicant.loan_amount,
        applicant.income,
        applicant.interest_rate,
        applicant.credit_history_years as f64,
    );

    let mut row = RawRow::new();
    row.insert(columns::AGE.into(), RawValue::Number(applicant.age as f64));
    row.insert(columns::INCOME.into(), RawValue::Number(applicant.income));
    row.insert(columns::INCOME_USD.into(), RawValue::Number(applicant.income));
    row.insert(columns::HOME_OWNERSHIP.into(), applicant.home_ownership.as_str().into());
    row.insert(columns::EMP_LENGTH.into(), RawValue::Number(applicant.emp_length));
    row.insert(columns::LOAN_INTENT.into(), applicant.loan_intent.as_str().into());
    row.insert(columns::LOAN_GRADE.into(), RawValue::Number(derived.grade.code() as f64));
    row.insert(columns::LOAN_AMOUNT.into(), RawValue::Number(applicant.loan_amount));
    row.insert(columns::LOAN_AMOUNT_USD.into(), RawValue::Number(applicant.loan_amount));
    row.insert(columns::INTEREST_RATE.into(), RawValue::Number(applicant.interest_rate));
    row.insert(columns::PERCENT_INCOME.into(), RawValue::Number(derived.loan_percent_income));
    row.insert(columns::PRIOR_DEFAULT.into(), applicant.prior_default_flag().into());
    row.insert(
        columns::CREDIT_HISTORY.into(),
        RawValue::Number(applicant.credit_history_years as f64),
    );

    (row, derived)
}

/// Fill derived columns a batch row does not carry itself.
///
/// Explicit values always win. Returns the derived features when the grade
/// could be computed from the row.
pub fn fill_derived(row: &mut RawRow) -> Option<DerivedFeatures> {
    let number = |row: &RawRow, name: &str| -> Option<f64> {
        row.get(name)
            .or_else(|| columns::alias_of(name).and_then(|alias| row.get(alias)))
            .and_then(RawValue::as_number)
    };

    if !row.contains_key(columns::PERCENT_INCOME) {
        if let (Some(amount), Some(income)) = (number(row, columns::LOAN_AMOUNT), number(row, columns::INCOME)) {
            row.insert(
                columns::PERCENT_INCOME.into(),
                RawValue::Number(loan_percent_income(amount, income)),
            );
        }
    }

    let lpi = number(row, columns::PERCENT_INCOME)?;
    let rate = number(row, columns::INTEREST_RATE)?;
    let history = number(row, columns::CREDIT_HISTORY)?;
    let score = risk_score(rate, lpi, history);
    let derived = DerivedFeatures {
        loan_percent_income: lpi,
        risk_score: score,
        grade: grade_for_score(score),
    };

    row.entry(columns::LOAN_GRADE.to_string())
        .or_insert(RawValue::Number(derived.grade.code() as f64));
    Some(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_rounds_to_four_places() {
        assert_eq!(loan_percent_income(10_000.0, 30_000.0), 0.3333);
        assert_eq!(loan_percent_income(10_000.0, 50_000.0), 0.2);
    }

    #[test]
    fn ratio_ties_round_to_even() {
        // 1000 / 32000 is exactly 0.03125.
        assert_eq!(loan_percent_income(1_000.0, 32_000.0), 0.0312);
        assert_eq!(loan_percent_income(3_000.0, 32_000.0), 0.0938);
    }

    #[test]
    fn ratio_is_zero_without_positive_income() {
        assert_eq!(loan_percent_income(10_000.0, 0.0), 0.0);
        assert_eq!(loan_percent_income(10_000.0, -5.0), 0.0);
    }

    #[test]
    fn grade_boundaries_are_inclusive() {
        assert_eq!(grade_for_score(25.0), LoanGrade::A);
        assert_eq!(grade_for_score(25.0001), LoanGrade::B);
        assert_eq!(grade_for_score(35.0), LoanGrade::B);
        assert_eq!(grade_for_score(45.0), LoanGrade::C);
        assert_eq!(grade_for_score(55.0), LoanGrade::D);
        assert_eq!(grade_for_score(65.0), LoanGrade::E);
        assert_eq!(grade_for_score(75.0), LoanGrade::F);
        assert_eq!(grade_for_score(75.0001), LoanGrade::G);
        assert_eq!(grade_for_score(-10.0), LoanGrade::A);
    }

    #[test]
    fn grade_codes_run_zero_to_six() {
        assert_eq!(LoanGrade::A.code(), 0);
        assert_eq!(LoanGrade::G.code(), 6);
    }

    #[test]
    fn default_applicant_derives_grade_c() {
        // 11 * 2 + 0.2 * 100 - 5 = 37
        let (row, derived) = applicant_row(&Applicant::default());
        assert_eq!(derived.loan_percent_income, 0.2);
        assert!((derived.risk_score - 37.0).abs() < 1e-9);
        assert_eq!(derived.grade, LoanGrade::C);
        assert_eq!(row.get(columns::LOAN_GRADE), Some(&RawValue::Number(2.0)));
        assert_eq!(row.get(columns::INCOME_USD), Some(&RawValue::Number(50_000.0)));
    }

    #[test]
    fn fill_derived_keeps_explicit_values() {
        let mut row = RawRow::new();
        row.insert(columns::LOAN_AMOUNT_USD.into(), RawValue::Number(5_000.0));
        row.insert(columns::INCOME.into(), RawValue::Number(20_000.0));
        row.insert(columns::INTEREST_RATE.into(), RawValue::Number(10.0));
        row.insert(columns::CREDIT_HISTORY.into(), RawValue::Number(4.0));
        row.insert(columns::LOAN_GRADE.into(), RawValue::Number(5.0));

        // 10 * 2 + 0.25 * 100 - 4 = 41
        let derived = fill_derived(&mut row).unwrap();
        assert_eq!(row.get(columns::PERCENT_INCOME), Some(&RawValue::Number(0.25)));
        assert_eq!(derived.grade, LoanGrade::C);
        assert_eq!(row.get(columns::LOAN_GRADE), Some(&RawValue::Number(5.0)));
    }
}
