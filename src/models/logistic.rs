//! Fitted binary logistic regression.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::math::sigmoid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One weight per feature column, in `feature_columns` order.
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.coef.len() != n_features {
            return Err(format!(
                "logistic regression has {} coefficients for {n_features} feature columns",
                self.coef.len()
            ));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err("logistic regression has non-finite parameters".to_string());
        }
        Ok(())
    }

    /// Default-class probability for each row of a scaled matrix.
    pub fn predict_proba(&self, x: &DMatrix<f64>) -> Vec<f64> {
        let w = DVector::from_column_slice(&self.coef);
        let z = x * w;
        z.iter().map(|v| sigmoid(v + self.intercept)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_logit_is_even_odds() {
        let lr = LogisticRegression { coef: vec![1.0, -1.0], intercept: 0.0 };
        let x = DMatrix::from_row_slice(2, 2, &[2.0, 2.0, 3.0, 1.0]);
        let p = lr.predict_proba(&x);
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!((p[1] - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn validate_checks_width() {
        let lr = LogisticRegression { coef: vec![1.0], intercept: 0.0 };
        assert!(lr.validate(2).is_err());
        assert!(lr.validate(1).is_ok());
    }
}
