//! Fitted model components loaded from the model package.
//!
//! Inference only: nothing here is ever refitted. The classifier is a closed
//! set of kinds, each exposing the same "default probability per row" operation.

pub mod logistic;
pub mod preprocess;
pub mod tree;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

pub use logistic::LogisticRegression;
pub use preprocess::{LabelEncoder, StandardScaler};
pub use tree::DecisionTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    DecisionTree(DecisionTree),
    LogisticRegression(LogisticRegression),
}

impl Classifier {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            Classifier::DecisionTree(tree) => tree.validate(n_features),
            Classifier::LogisticRegression(lr) => lr.validate(n_features),
        }
    }

    /// Default-class probability for every row of a scaled matrix.
    pub fn predict_proba(&self, x: &DMatrix<f64>) -> Vec<f64> {
        match self {
            Classifier::DecisionTree(tree) => x
                .row_iter()
                .map(|row| {
                    let features: Vec<f64> = row.iter().copied().collect();
                    tree.predict_proba_row(&features)
                })
                .collect(),
            Classifier::LogisticRegression(lr) => lr.predict_proba(x),
        }
    }
}
