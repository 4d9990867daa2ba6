//! The scoring transform.
//!
//! For every row:
//! derive features -> encode categories -> project onto `feature_columns`
//! -> scale -> default probability -> threshold -> risk tier.
//!
//! A `Scorer` binds one package, one model variant, one threshold and one
//! unknown-category policy. It holds no other state, so scoring is a pure
//! function of its inputs and the same row always yields the same result.

pub mod derive;
pub mod encode;

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::{Applicant, Outcome, RawRow, RiskTier, ScoreConfig, ScoredResult, UnknownCategoryPolicy};
use crate::error::ScoreError;
use crate::package::{ModelPackage, ModelVariant};

pub use derive::{applicant_row, derive_features, fill_derived, grade_for_score, loan_percent_income, DerivedFeatures};
pub use encode::{encode_category, project_row};

/// Outcome of one batch row: a score, or the row-scoped reason it has none.
pub type RowScore = Result<ScoredResult, ScoreError>;

#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    package: &'a ModelPackage,
    variant: ModelVariant<'a>,
    threshold: f64,
    policy: UnknownCategoryPolicy,
}

impl<'a> Scorer<'a> {
    pub fn new(package: &'a ModelPackage, config: &ScoreConfig) -> Result<Self, ScoreError> {
        let variant = package.variant(config.model)?;
        let threshold = config.threshold.unwrap_or(variant.threshold);
        if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) {
            return Err(ScoreError::InvalidThreshold(threshold));
        }
        Ok(Self {
            package,
            variant,
            threshold,
            policy: config.unknown_category,
        })
    }

    pub fn variant(&self) -> &ModelVariant<'a> {
        &self.variant
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score one form applicant (derived features always recomputed).
    pub fn score_applicant(&self, applicant: &Applicant) -> Result<ScoredResult, ScoreError> {
        applicant.validate().map_err(ScoreError::InvalidInput)?;
        let (row, derived) = applicant_row(applicant);
        let mut result = self.score_row(&row)?;
        result.grade = Some(derived.grade);
        result.loan_percent_income = Some(derived.loan_percent_income);
        Ok(result)
    }

    /// Score one raw row exactly as given (no derivation).
    pub fn score_row(&self, row: &RawRow) -> Result<ScoredResult, ScoreError> {
        let features = project_row(self.package, row, self.policy)?;
        let probs = self.predict(&[features])?;
        Ok(self.finish(probs[0]))
    }

    /// Score batch rows independently, preserving order.
    ///
    /// Missing derived columns are filled per row. Row-scoped failures (unknown
    /// category under `Reject`) are returned in place; any other failure aborts
    /// the whole batch.
    pub fn score_batch(&self, rows: &[RawRow]) -> Result<Vec<RowScore>, ScoreError> {
        let mut projected = Vec::with_capacity(rows.len());
        let mut derived = Vec::with_capacity(rows.len());
        let mut slots: Vec<Option<ScoreError>> = Vec::with_capacity(rows.len());

        for row in rows {
            let mut row = row.clone();
            let d = fill_derived(&mut row);
            match project_row(self.package, &row, self.policy) {
                Ok(features) => {
                    projected.push(features);
                    derived.push(d);
                    slots.push(None);
                }
                Err(err) if err.is_row_scoped() => slots.push(Some(err)),
                Err(err) => return Err(err),
            }
        }

        let probs = if projected.is_empty() { Vec::new() } else { self.predict(&projected)? };
        debug!(rows = rows.len(), scored = probs.len(), "scored batch");

        let mut scored = probs.into_iter().zip(derived);
        let mut out = Vec::with_capacity(rows.len());
        for slot in slots {
            match slot {
                Some(err) => out.push(Err(err)),
                None => {
                    let (p, d) = scored
                        .next()
                        .ok_or(ScoreError::ShapeMismatch { expected: rows.len(), actual: out.len() })?;
                    let mut result = self.finish(p);
                    if let Some(d) = d {
                        result.grade = Some(d.grade);
                        result.loan_percent_income = Some(d.loan_percent_income);
                    }
                    out.push(Ok(result));
                }
            }
        }
        Ok(out)
    }

    /// Scale the projected rows and run the classifier.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScoreError> {
        let n = self.package.n_features();
        if let Some(bad) = rows.iter().find(|r| r.len() != n) {
            return Err(ScoreError::ShapeMismatch { expected: n, actual: bad.len() });
        }
        if self.package.scaler.n_features() != n {
            return Err(ScoreError::ShapeMismatch {
                expected: n,
                actual: self.package.scaler.n_features(),
            });
        }

        let mut x = DMatrix::from_fn(rows.len(), n, |i, j| rows[i][j]);
        self.package.scaler.transform(&mut x);
        Ok(self.variant.classifier.predict_proba(&x))
    }

    fn finish(&self, probability: f64) -> ScoredResult {
        ScoredResult {
            model: self.variant.choice,
            outcome: Outcome::from_probability(probability, self.threshold),
            probability,
            threshold: self.threshold,
            tier: RiskTier::from_probability(probability),
            confidence: probability.max(1.0 - probability),
            grade: None,
            loan_percent_income: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{columns, LoanGrade, LoanIntent, ModelChoice, RawValue};
    use crate::package::fixtures;

    fn config(model: ModelChoice) -> ScoreConfig {
        ScoreConfig {
            model,
            ..ScoreConfig::default()
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(Outcome::from_probability(0.35, 0.35), Outcome::Default);
        assert_eq!(Outcome::from_probability(0.3499, 0.35), Outcome::GoodLoan);
    }

    #[test]
    fn risk_tier_boundaries() {
        assert_eq!(RiskTier::from_probability(0.2999), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.30), RiskTier::Medium);
        assert_eq!(RiskTier::from_probability(0.5999), RiskTier::Medium);
        assert_eq!(RiskTier::from_probability(0.60), RiskTier::High);
    }

    #[test]
    fn default_applicant_scores_through_tree() {
        // lpi 0.2 <= 0.3 -> left leaf: 5 / 50
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::DecisionTree)).unwrap();
        let result = scorer.score_applicant(&Applicant::default()).unwrap();
        assert!((result.probability - 0.1).abs() < 1e-12);
        assert_eq!(result.outcome, Outcome::GoodLoan);
        assert_eq!(result.tier, RiskTier::Low);
        assert!((result.confidence - 0.9).abs() < 1e-12);
        assert_eq!(result.grade, Some(LoanGrade::C));
        assert_eq!(result.loan_percent_income, Some(0.2));
    }

    #[test]
    fn prior_default_with_high_ratio_is_flagged() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::DecisionTree)).unwrap();
        let applicant = Applicant {
            loan_amount: 20_000.0,
            income: 40_000.0,
            prior_default: true,
            ..Applicant::default()
        };
        let result = scorer.score_applicant(&applicant).unwrap();
        assert!((result.probability - 0.9).abs() < 1e-12);
        assert_eq!(result.class(), 1);
        assert_eq!(result.tier, RiskTier::High);
    }

    #[test]
    fn logistic_variant_uses_interest_rate() {
        // z = 0.5 * 12 - 6 = 0 -> p = 0.5, default threshold 0.35
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::LogisticRegression)).unwrap();
        let applicant = Applicant { interest_rate: 12.0, ..Applicant::default() };
        let result = scorer.score_applicant(&applicant).unwrap();
        assert!((result.probability - 0.5).abs() < 1e-12);
        assert_eq!(result.outcome, Outcome::Default);
        assert_eq!(result.tier, RiskTier::Medium);
        assert_eq!(result.model, ModelChoice::LogisticRegression);
    }

    #[test]
    fn threshold_override_changes_class_only() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(
            &pkg,
            &ScoreConfig {
                model: ModelChoice::LogisticRegression,
                threshold: Some(0.6),
                ..ScoreConfig::default()
            },
        )
        .unwrap();
        let applicant = Applicant { interest_rate: 12.0, ..Applicant::default() };
        let result = scorer.score_applicant(&applicant).unwrap();
        assert_eq!(result.outcome, Outcome::GoodLoan);
        assert_eq!(result.tier, RiskTier::Medium);
        assert_eq!(result.threshold, 0.6);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let pkg = fixtures::package();
        let err = Scorer::new(
            &pkg,
            &ScoreConfig {
                threshold: Some(1.2),
                ..ScoreConfig::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, ScoreError::InvalidThreshold(1.2));
    }

    #[test]
    fn invalid_applicant_is_rejected_before_scoring() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &ScoreConfig::default()).unwrap();
        let applicant = Applicant { age: 12, ..Applicant::default() };
        assert!(matches!(
            scorer.score_applicant(&applicant),
            Err(ScoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn scoring_is_idempotent() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::LogisticRegression)).unwrap();
        let applicant = Applicant {
            loan_intent: LoanIntent::Medical,
            interest_rate: 17.25,
            ..Applicant::default()
        };
        let a = scorer.score_applicant(&applicant).unwrap();
        let b = scorer.score_applicant(&applicant).unwrap();
        assert_eq!(a, b);
    }

    fn batch_row(lpi: f64, prior: &str, intent: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert(columns::AGE.into(), RawValue::Number(30.0));
        row.insert(columns::INCOME.into(), RawValue::Number(50_000.0));
        row.insert(columns::HOME_OWNERSHIP.into(), "RENT".into());
        row.insert(columns::EMP_LENGTH.into(), RawValue::Number(3.0));
        row.insert(columns::LOAN_INTENT.into(), intent.into());
        row.insert(columns::LOAN_AMOUNT.into(), RawValue::Number(50_000.0 * lpi));
        row.insert(columns::INTEREST_RATE.into(), RawValue::Number(11.0));
        row.insert(columns::PRIOR_DEFAULT.into(), prior.into());
        row.insert(columns::CREDIT_HISTORY.into(), RawValue::Number(4.0));
        row
    }

    #[test]
    fn batch_preserves_order_and_length() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::DecisionTree)).unwrap();
        let rows = vec![
            batch_row(0.1, "N", "EDUCATION"),
            batch_row(0.5, "Y", "VENTURE"),
            batch_row(0.5, "N", "MEDICAL"),
        ];
        let scores = scorer.score_batch(&rows).unwrap();
        assert_eq!(scores.len(), 3);
        let probs: Vec<f64> = scores.iter().map(|s| s.as_ref().unwrap().probability).collect();
        assert!((probs[0] - 0.1).abs() < 1e-12);
        assert!((probs[1] - 0.9).abs() < 1e-12);
        assert!((probs[2] - 0.4).abs() < 1e-12);
        assert!(scores[0].as_ref().unwrap().grade.is_some());
    }

    #[test]
    fn batch_matches_single_row_scoring() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::LogisticRegression)).unwrap();
        let mut row = batch_row(0.25, "N", "PERSONAL");
        let batch = scorer.score_batch(std::slice::from_ref(&row)).unwrap();
        fill_derived(&mut row);
        let single = scorer.score_row(&row).unwrap();
        assert_eq!(batch[0].as_ref().unwrap().probability, single.probability);
    }

    #[test]
    fn batch_keeps_rejected_rows_in_place() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &config(ModelChoice::DecisionTree)).unwrap();
        let rows = vec![
            batch_row(0.1, "N", "EDUCATION"),
            batch_row(0.1, "N", "SPACE_TRAVEL"),
            batch_row(0.5, "Y", "VENTURE"),
        ];
        let scores = scorer.score_batch(&rows).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0].is_ok());
        assert!(matches!(scores[1], Err(ScoreError::UnknownCategory { .. })));
        assert!((scores[2].as_ref().unwrap().probability - 0.9).abs() < 1e-12);
    }

    #[test]
    fn batch_zero_policy_scores_unknown_category() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(
            &pkg,
            &ScoreConfig {
                unknown_category: UnknownCategoryPolicy::Zero,
                ..ScoreConfig::default()
            },
        )
        .unwrap();
        let rows = vec![batch_row(0.1, "N", "SPACE_TRAVEL")];
        let scores = scorer.score_batch(&rows).unwrap();
        assert!(scores[0].is_ok());
    }

    #[test]
    fn non_numeric_value_aborts_batch() {
        let pkg = fixtures::package();
        let scorer = Scorer::new(&pkg, &ScoreConfig::default()).unwrap();
        let mut bad = batch_row(0.1, "N", "EDUCATION");
        bad.insert(columns::AGE.into(), "n/a".into());
        let rows = vec![batch_row(0.1, "N", "EDUCATION"), bad];
        assert!(matches!(scorer.score_batch(&rows), Err(ScoreError::NonNumeric { .. })));
    }
}
