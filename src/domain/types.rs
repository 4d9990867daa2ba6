//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - built from CLI flags, the TUI form, or CSV rows
//! - passed through the scoring transform
//! - exported to JSON/CSV

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Feature column names used by the applicant form and derived features.
pub mod columns {
    pub const AGE: &str = "person_age";
    pub const INCOME: &str = "person_income";
    pub const INCOME_USD: &str = "person_income($)";
    pub const HOME_OWNERSHIP: &str = "person_home_ownership";
    pub const EMP_LENGTH: &str = "person_emp_length";
    pub const LOAN_INTENT: &str = "loan_intent";
    pub const LOAN_GRADE: &str = "loan_grade";
    pub const LOAN_AMOUNT: &str = "loan_amnt";
    pub const LOAN_AMOUNT_USD: &str = "loan_amnt($)";
    pub const INTEREST_RATE: &str = "loan_int_rate";
    pub const PERCENT_INCOME: &str = "loan_percent_income";
    pub const PRIOR_DEFAULT: &str = "cb_person_default_on_file";
    pub const CREDIT_HISTORY: &str = "cb_person_cred_hist_length";

    /// Columns that artifacts carry under either a plain or a `($)` name.
    pub const ALIASES: [(&str, &str); 2] = [(INCOME, INCOME_USD), (LOAN_AMOUNT, LOAN_AMOUNT_USD)];

    /// Return the other spelling of an aliased column, if any.
    pub fn alias_of(name: &str) -> Option<&'static str> {
        ALIASES.iter().find_map(|&(plain, usd)| {
            if name == plain {
                Some(usd)
            } else if name == usd {
                Some(plain)
            } else {
                None
            }
        })
    }
}

/// A raw feature value before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Category(String),
}

impl RawValue {
    /// Interpret free text: finite numbers become `Number`, everything else `Category`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => RawValue::Number(v),
            _ => RawValue::Category(text.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v),
            RawValue::Category(_) => None,
        }
    }

    /// Textual form used for encoder lookups.
    pub fn as_text(&self) -> String {
        match self {
            RawValue::Number(v) => format!("{v}"),
            RawValue::Category(s) => s.clone(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Category(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Category(value)
    }
}

/// One row of raw attributes keyed by feature name.
pub type RawRow = BTreeMap<String, RawValue>;

/// Which fitted classifier scores the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    /// Decision tree (the package's primary `model`).
    #[value(name = "dt")]
    DecisionTree,
    /// Logistic regression (the package's `lr_model`).
    #[value(name = "lr")]
    LogisticRegression,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::DecisionTree, ModelChoice::LogisticRegression];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelChoice::DecisionTree => "Decision Tree",
            ModelChoice::LogisticRegression => "Logistic Regression",
        }
    }

    /// Short name used on the command line and in file names.
    pub fn tag(self) -> &'static str {
        match self {
            ModelChoice::DecisionTree => "dt",
            ModelChoice::LogisticRegression => "lr",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ModelChoice::DecisionTree => ModelChoice::LogisticRegression,
            ModelChoice::LogisticRegression => ModelChoice::DecisionTree,
        }
    }
}

/// What to do with a categorical value its encoder has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryPolicy {
    /// Refuse to score the row (`ScoreError::UnknownCategory`).
    Reject,
    /// Substitute class index 0.
    Zero,
}

/// Home-ownership choices offered by the applicant form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Rent,
    Own,
    Mortgage,
    Other,
}

impl HomeOwnership {
    pub const ALL: [HomeOwnership; 4] = [
        HomeOwnership::Rent,
        HomeOwnership::Own,
        HomeOwnership::Mortgage,
        HomeOwnership::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HomeOwnership::Rent => "RENT",
            HomeOwnership::Own => "OWN",
            HomeOwnership::Mortgage => "MORTGAGE",
            HomeOwnership::Other => "OTHER",
        }
    }

    pub fn cycle(self, delta: i32) -> Self {
        cycle(&Self::ALL, self, delta)
    }
}

/// Loan-intent choices offered by the applicant form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanIntent {
    Personal,
    Education,
    Medical,
    Venture,
    #[value(name = "homeimprovement")]
    HomeImprovement,
    #[value(name = "debtconsolidation")]
    DebtConsolidation,
}

impl LoanIntent {
    pub const ALL: [LoanIntent; 6] = [
        LoanIntent::Personal,
        LoanIntent::Education,
        LoanIntent::Medical,
        LoanIntent::Venture,
        LoanIntent::HomeImprovement,
        LoanIntent::DebtConsolidation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoanIntent::Personal => "PERSONAL",
            LoanIntent::Education => "EDUCATION",
            LoanIntent::Medical => "MEDICAL",
            LoanIntent::Venture => "VENTURE",
            LoanIntent::HomeImprovement => "HOMEIMPROVEMENT",
            LoanIntent::DebtConsolidation => "DEBTCONSOLIDATION",
        }
    }

    pub fn cycle(self, delta: i32) -> Self {
        cycle(&Self::ALL, self, delta)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], cur: T, delta: i32) -> T {
    let n = all.len() as i32;
    let idx = all.iter().position(|v| *v == cur).unwrap_or(0) as i32;
    all[(idx + delta).rem_euclid(n) as usize]
}

/// Accepted ranges for applicant fields.
pub mod bounds {
    pub const AGE: (u32, u32) = (18, 100);
    pub const EMP_LENGTH: (f64, f64) = (0.0, 60.0);
    pub const MIN_INCOME: f64 = 0.0;
    pub const MIN_LOAN_AMOUNT: f64 = 500.0;
    pub const INTEREST_RATE: (f64, f64) = (5.0, 25.0);
    pub const CREDIT_HISTORY: (u32, u32) = (2, 30);
}

/// A single applicant as entered in the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub age: u32,
    pub income: f64,
    pub home_ownership: HomeOwnership,
    /// Employment length in years.
    pub emp_length: f64,
    pub loan_intent: LoanIntent,
    pub loan_amount: f64,
    /// Interest rate in percent (e.g. `11.0`).
    pub interest_rate: f64,
    pub prior_default: bool,
    /// Credit-history length in years.
    pub credit_history_years: u32,
}

impl Default for Applicant {
    fn default() -> Self {
        Self {
            age: 30,
            income: 50_000.0,
            home_ownership: HomeOwnership::Rent,
            emp_length: 5.0,
            loan_intent: LoanIntent::Personal,
            loan_amount: 10_000.0,
            interest_rate: 11.0,
            prior_default: false,
            credit_history_years: 5,
        }
    }
}

impl Applicant {
    /// `Y` / `N` as stored by the prior-default encoder.
    pub fn prior_default_flag(&self) -> &'static str {
        if self.prior_default { "Y" } else { "N" }
    }

    /// Check every field against the form's accepted ranges.
    pub fn validate(&self) -> Result<(), String> {
        let (age_lo, age_hi) = bounds::AGE;
        if !(age_lo..=age_hi).contains(&self.age) {
            return Err(format!("age must be within {age_lo}..={age_hi} (got {}).", self.age));
        }
        if !(self.income.is_finite() && self.income >= bounds::MIN_INCOME) {
            return Err(format!("income must be >= 0 (got {}).", self.income));
        }
        let (emp_lo, emp_hi) = bounds::EMP_LENGTH;
        if !(self.emp_length.is_finite() && (emp_lo..=emp_hi).contains(&self.emp_length)) {
            return Err(format!(
                "employment length must be within {emp_lo}..={emp_hi} years (got {}).",
                self.emp_length
            ));
        }
        if !(self.loan_amount.is_finite() && self.loan_amount >= bounds::MIN_LOAN_AMOUNT) {
            return Err(format!(
                "loan amount must be >= {} (got {}).",
                bounds::MIN_LOAN_AMOUNT,
                self.loan_amount
            ));
        }
        let (rate_lo, rate_hi) = bounds::INTEREST_RATE;
        if !(self.interest_rate.is_finite() && (rate_lo..=rate_hi).contains(&self.interest_rate)) {
            return Err(format!(
                "interest rate must be within {rate_lo}..={rate_hi}% (got {}).",
                self.interest_rate
            ));
        }
        let (hist_lo, hist_hi) = bounds::CREDIT_HISTORY;
        if !(hist_lo..=hist_hi).contains(&self.credit_history_years) {
            return Err(format!(
                "credit history must be within {hist_lo}..={hist_hi} years (got {}).",
                self.credit_history_years
            ));
        }
        Ok(())
    }
}

/// Heuristic loan grade derived from interest rate, loan-to-income ratio and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl LoanGrade {
    /// Integer code injected as the `loan_grade` feature (A=0 .. G=6).
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn letter(self) -> char {
        match self {
            LoanGrade::A => 'A',
            LoanGrade::B => 'B',
            LoanGrade::C => 'C',
            LoanGrade::D => 'D',
            LoanGrade::E => 'E',
            LoanGrade::F => 'F',
            LoanGrade::G => 'G',
        }
    }
}

impl fmt::Display for LoanGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Display bucket for the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const LOW_BELOW: f64 = 0.30;
    pub const MEDIUM_BELOW: f64 = 0.60;

    /// Fixed cutoffs, independent of the decision threshold.
    pub fn from_probability(p: f64) -> Self {
        if p < Self::LOW_BELOW {
            RiskTier::Low
        } else if p < Self::MEDIUM_BELOW {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "LOW RISK",
            RiskTier::Medium => "MEDIUM RISK",
            RiskTier::High => "HIGH RISK",
        }
    }
}

/// Binary decision produced by thresholding the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    GoodLoan,
    Default,
}

impl Outcome {
    /// `class = 1` iff `p >= threshold`.
    pub fn from_probability(p: f64, threshold: f64) -> Self {
        if p >= threshold { Outcome::Default } else { Outcome::GoodLoan }
    }

    /// 0 = good loan, 1 = default.
    pub fn class(self) -> u8 {
        match self {
            Outcome::GoodLoan => 0,
            Outcome::Default => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::GoodLoan => "Good Loan",
            Outcome::Default => "Default",
        }
    }
}

/// Per-request scoring settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreConfig {
    pub model: ModelChoice,
    /// Overrides the package threshold for the selected model.
    pub threshold: Option<f64>,
    pub unknown_category: UnknownCategoryPolicy,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            model: ModelChoice::DecisionTree,
            threshold: None,
            unknown_category: UnknownCategoryPolicy::Reject,
        }
    }
}

/// Output of scoring one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub model: ModelChoice,
    pub outcome: Outcome,
    /// Probability mass on the default class.
    pub probability: f64,
    pub threshold: f64,
    pub tier: RiskTier,
    /// `max(p, 1 - p)`.
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<LoanGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_percent_income: Option<f64>,
}

impl ScoredResult {
    pub fn class(&self) -> u8 {
        self.outcome.class()
    }
}
