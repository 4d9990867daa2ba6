//! Fitted preprocessing: per-column label encoders and the standard scaler.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// String → integer mapping restricted to the categories seen during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Class index of `value`, or `None` when the category is unknown.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }
}

/// `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(format!(
                "scaler was fitted on {} columns (scale: {}), package lists {n_features} feature columns",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("scaler has non-finite parameters".to_string());
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Scale every row of `x` in place. Zero-variance columns are only centered.
    pub fn transform(&self, x: &mut DMatrix<f64>) {
        for (j, mut col) in x.column_iter_mut().enumerate() {
            let mean = self.mean[j];
            let scale = if self.scale[j] == 0.0 { 1.0 } else { self.scale[j] };
            for v in col.iter_mut() {
                *v = (*v - mean) / scale;
            }
        }
    }
}
