//! Display-only training metadata carried by the model package.
//!
//! None of this influences scoring. Every field is optional so partially
//! populated artifacts still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetInfo {
    pub total_samples: u64,
    pub train_samples: u64,
    pub test_samples: u64,
    pub n_features: u64,
}

/// Precision/recall/F1 for one class (or an average row of the report).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassReport {
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    #[serde(alias = "f1-score")]
    pub f1_score: Option<f64>,
    pub support: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetrics {
    pub test_accuracy: Option<f64>,
    pub roc_auc: Option<f64>,
    /// Keyed by class label, e.g. `"Good Loan (0)"` / `"Default (1)"`.
    pub class_metrics: BTreeMap<String, ClassReport>,
    pub weighted_avg: Option<ClassReport>,
    pub macro_avg: Option<ClassReport>,
    /// `[[tn, fp], [fn, tp]]`.
    pub confusion_matrix: Option<Vec<Vec<u64>>>,
    pub feature_importance: BTreeMap<String, f64>,
    pub feature_coefficients: BTreeMap<String, f64>,
}

impl ModelMetrics {
    pub fn is_empty(&self) -> bool {
        *self == ModelMetrics::default()
    }

    /// Report row for the default class (first label mentioning `1`).
    pub fn default_class(&self) -> Option<&ClassReport> {
        self.class_metrics
            .iter()
            .find(|(k, _)| k.contains('1'))
            .map(|(_, v)| v)
    }

    /// Report row for the good-loan class (first label mentioning `0`).
    pub fn good_class(&self) -> Option<&ClassReport> {
        self.class_metrics
            .iter()
            .find(|(k, _)| k.contains('0'))
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_lookup_by_label_digit() {
        let json = r#"{
            "test_accuracy": 0.91,
            "class_metrics": {
                "Good Loan (0)": {"precision": 0.93, "recall": 0.96, "f1-score": 0.94},
                "Default (1)": {"precision": 0.82, "recall": 0.7, "f1_score": 0.75}
            }
        }"#;
        let m: ModelMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.default_class().and_then(|c| c.f1_score), Some(0.75));
        assert_eq!(m.good_class().and_then(|c| c.f1_score), Some(0.94));
        assert!(!m.is_empty());
        assert!(ModelMetrics::default().is_empty());
    }
}
