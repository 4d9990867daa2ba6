//! The model package: everything fitted at training time, bundled in one file.
//!
//! A package is read once at startup (`load::load_package`) and then passed
//! around by shared reference. Nothing mutates it after validation.

pub mod load;
pub mod metrics;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::ModelChoice;
use crate::error::ScoreError;
use crate::models::{Classifier, LabelEncoder, StandardScaler};

pub use load::{load_package, read_package, resolve_model_path};
pub use metrics::{ClassReport, DatasetInfo, ModelMetrics};

/// Threshold used when the package does not record one for a model.
pub const DEFAULT_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPackage {
    /// Primary classifier (decision tree).
    pub model: Classifier,
    /// Secondary classifier (logistic regression).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lr_model: Option<Classifier>,
    pub scaler: StandardScaler,
    #[serde(default)]
    pub encoders: BTreeMap<String, LabelEncoder>,
    pub feature_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lr_threshold: Option<f64>,
    #[serde(default)]
    pub dataset_info: DatasetInfo,
    #[serde(default)]
    pub dt_metrics: ModelMetrics,
    #[serde(default)]
    pub lr_metrics: ModelMetrics,
}

impl ModelPackage {
    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.n_features();
        if n == 0 {
            return Err("`feature_columns` is empty".to_string());
        }
        let mut seen = HashSet::new();
        for col in &self.feature_columns {
            if !seen.insert(col.as_str()) {
                return Err(format!("duplicate feature column `{col}`"));
            }
        }

        self.scaler.validate(n)?;
        self.model.validate(n).map_err(|e| format!("`model`: {e}"))?;
        if let Some(lr) = &self.lr_model {
            lr.validate(n).map_err(|e| format!("`lr_model`: {e}"))?;
        }

        for (col, enc) in &self.encoders {
            if enc.classes.is_empty() {
                return Err(format!("encoder for `{col}` has no classes"));
            }
        }

        for (name, t) in [("dt_threshold", self.dt_threshold), ("lr_threshold", self.lr_threshold)] {
            if let Some(t) = t {
                if !(t.is_finite() && (0.0..=1.0).contains(&t)) {
                    return Err(format!("`{name}` = {t} is outside [0, 1]"));
                }
            }
        }
        Ok(())
    }

    pub fn has_variant(&self, choice: ModelChoice) -> bool {
        match choice {
            ModelChoice::DecisionTree => true,
            ModelChoice::LogisticRegression => self.lr_model.is_some(),
        }
    }

    pub fn threshold_for(&self, choice: ModelChoice) -> f64 {
        match choice {
            ModelChoice::DecisionTree => self.dt_threshold,
            ModelChoice::LogisticRegression => self.lr_threshold,
        }
        .unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn metrics_for(&self, choice: ModelChoice) -> &ModelMetrics {
        match choice {
            ModelChoice::DecisionTree => &self.dt_metrics,
            ModelChoice::LogisticRegression => &self.lr_metrics,
        }
    }

    /// Resolve the classifier, threshold and driver table for one model variant.
    pub fn variant(&self, choice: ModelChoice) -> Result<ModelVariant<'_>, ScoreError> {
        let classifier = match choice {
            ModelChoice::DecisionTree => &self.model,
            ModelChoice::LogisticRegression => self.lr_model.as_ref().ok_or(ScoreError::ModelUnavailable {
                model: "logistic regression (`lr_model`)",
            })?,
        };

        let drivers = match choice {
            ModelChoice::DecisionTree => DriverTable::importance(&self.dt_metrics.feature_importance),
            ModelChoice::LogisticRegression => {
                if !self.lr_metrics.feature_coefficients.is_empty() {
                    DriverTable::coefficients(&self.lr_metrics.feature_coefficients)
                } else if let Classifier::LogisticRegression(lr) = classifier {
                    let named: BTreeMap<String, f64> =
                        self.feature_columns.iter().cloned().zip(lr.coef.iter().copied()).collect();
                    DriverTable::coefficients(&named)
                } else {
                    DriverTable::Coefficients(Vec::new())
                }
            }
        };

        Ok(ModelVariant {
            choice,
            classifier,
            threshold: self.threshold_for(choice),
            drivers,
        })
    }
}

/// One selectable model: its classifier, decision threshold and driver table.
#[derive(Debug, Clone)]
pub struct ModelVariant<'a> {
    pub choice: ModelChoice,
    pub classifier: &'a Classifier,
    pub threshold: f64,
    pub drivers: DriverTable,
}

/// Per-feature explanation attached to a model variant.
///
/// Importances are sorted descending; coefficients by descending magnitude.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverTable {
    Importance(Vec<(String, f64)>),
    Coefficients(Vec<(String, f64)>),
}

impl DriverTable {
    fn importance(map: &BTreeMap<String, f64>) -> Self {
        let mut rows: Vec<(String, f64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        DriverTable::Importance(rows)
    }

    fn coefficients(map: &BTreeMap<String, f64>) -> Self {
        let mut rows: Vec<(String, f64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        rows.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap_or(std::cmp::Ordering::Equal));
        DriverTable::Coefficients(rows)
    }

    pub fn rows(&self) -> &[(String, f64)] {
        match self {
            DriverTable::Importance(rows) | DriverTable::Coefficients(rows) => rows,
        }
    }

    pub fn top(&self, n: usize) -> &[(String, f64)] {
        let rows = self.rows();
        &rows[..n.min(rows.len())]
    }

    pub fn title(&self) -> &'static str {
        match self {
            DriverTable::Importance(_) => "Top Features (Importance)",
            DriverTable::Coefficients(_) => "Top Risk Drivers (Coefficients)",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! A tiny hand-built package over the standard feature set.

    use super::*;
    use crate::models::{DecisionTree, LogisticRegression};

    pub const FEATURES: [&str; 11] = [
        "person_age",
        "person_income",
        "person_home_ownership",
        "person_emp_length",
        "loan_intent",
        "loan_grade",
        "loan_amnt",
        "loan_int_rate",
        "loan_percent_income",
        "cb_person_default_on_file",
        "cb_person_cred_hist_length",
    ];

    fn encoder(classes: &[&str]) -> LabelEncoder {
        LabelEncoder {
            classes: classes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Identity scaler, a tree splitting on `loan_percent_income` then the prior
    /// default flag, and a logistic regression driven by the interest rate.
    pub fn package() -> ModelPackage {
        let n = FEATURES.len();
        let lpi = FEATURES.iter().position(|c| *c == "loan_percent_income").unwrap() as i64;
        let prior = FEATURES.iter().position(|c| *c == "cb_person_default_on_file").unwrap() as i64;
        let rate = FEATURES.iter().position(|c| *c == "loan_int_rate").unwrap();

        let tree = DecisionTree {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![lpi, -2, prior, -2, -2],
            threshold: vec![0.3, -2.0, 0.5, -2.0, -2.0],
            value: vec![
                vec![60.0, 40.0],
                vec![45.0, 5.0],
                vec![15.0, 35.0],
                vec![12.0, 8.0],
                vec![3.0, 27.0],
            ],
        };

        let mut coef = vec![0.0; n];
        coef[rate] = 0.5;
        let lr = LogisticRegression { coef, intercept: -6.0 };

        let mut encoders = BTreeMap::new();
        encoders.insert(
            "person_home_ownership".to_string(),
            encoder(&["MORTGAGE", "OTHER", "OWN", "RENT"]),
        );
        encoders.insert(
            "loan_intent".to_string(),
            encoder(&[
                "DEBTCONSOLIDATION",
                "EDUCATION",
                "HOMEIMPROVEMENT",
                "MEDICAL",
                "PERSONAL",
                "VENTURE",
            ]),
        );
        encoders.insert("cb_person_default_on_file".to_string(), encoder(&["N", "Y"]));

        let mut dt_metrics = ModelMetrics::default();
        dt_metrics.feature_importance.insert("loan_percent_income".into(), 0.6);
        dt_metrics.feature_importance.insert("cb_person_default_on_file".into(), 0.3);
        dt_metrics.feature_importance.insert("person_age".into(), 0.1);
        dt_metrics.test_accuracy = Some(0.9);

        ModelPackage {
            model: Classifier::DecisionTree(tree),
            lr_model: Some(Classifier::LogisticRegression(lr)),
            scaler: StandardScaler {
                mean: vec![0.0; n],
                scale: vec![1.0; n],
            },
            encoders,
            feature_columns: FEATURES.iter().map(|s| s.to_string()).collect(),
            dt_threshold: Some(0.35),
            lr_threshold: None,
            dataset_info: DatasetInfo {
                total_samples: 1000,
                train_samples: 800,
                test_samples: 200,
                n_features: n as u64,
            },
            dt_metrics,
            lr_metrics: ModelMetrics::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_package_is_valid() {
        fixtures::package().validate().unwrap();
    }

    #[test]
    fn validate_rejects_duplicate_columns() {
        let mut pkg = fixtures::package();
        pkg.feature_columns[1] = "person_age".to_string();
        assert!(pkg.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn validate_rejects_scaler_width_mismatch() {
        let mut pkg = fixtures::package();
        pkg.scaler.mean.pop();
        assert!(pkg.validate().is_err());
    }

    #[test]
    fn threshold_defaults_when_absent() {
        let pkg = fixtures::package();
        assert_eq!(pkg.threshold_for(ModelChoice::DecisionTree), 0.35);
        assert_eq!(pkg.threshold_for(ModelChoice::LogisticRegression), DEFAULT_THRESHOLD);
    }

    #[test]
    fn missing_lr_model_is_unavailable() {
        let mut pkg = fixtures::package();
        pkg.lr_model = None;
        let err = pkg.variant(ModelChoice::LogisticRegression).unwrap_err();
        assert!(matches!(err, ScoreError::ModelUnavailable { .. }));
    }

    #[test]
    fn tree_drivers_sorted_by_importance() {
        let pkg = fixtures::package();
        let variant = pkg.variant(ModelChoice::DecisionTree).unwrap();
        let top = variant.drivers.top(2);
        assert_eq!(top[0].0, "loan_percent_income");
        assert_eq!(top[1].0, "cb_person_default_on_file");
    }

    #[test]
    fn lr_drivers_fall_back_to_classifier_coefficients() {
        let pkg = fixtures::package();
        let variant = pkg.variant(ModelChoice::LogisticRegression).unwrap();
        assert!(matches!(variant.drivers, DriverTable::Coefficients(_)));
        assert_eq!(variant.drivers.top(1)[0], ("loan_int_rate".to_string(), 0.5));
    }
}
