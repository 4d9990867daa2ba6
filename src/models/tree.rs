//! Fitted binary decision tree in flattened (array-per-attribute) layout.
//!
//! Node `i` is a leaf iff `children_left[i] == -1`. Internal nodes route a row
//! left when `x[feature[i]] <= threshold[i]`, right otherwise. A leaf's default
//! probability is `value[i][1] / sum(value[i])`.

use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (`[good, default]`).
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn num_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Check structural consistency against the expected feature count.
    ///
    /// Children must point strictly forward, which rules out cycles and makes
    /// traversal terminate.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.num_nodes();
        if n == 0 {
            return Err("decision tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!(
                "decision tree arrays disagree in length (children_left={n}, children_right={}, feature={}, threshold={}, value={})",
                self.children_right.len(),
                self.feature.len(),
                self.threshold.len(),
                self.value.len()
            ));
        }

        for node in 0..n {
            if self.is_leaf(node) {
                let v = &self.value[node];
                if v.len() != 2 {
                    return Err(format!("leaf {node} must carry exactly 2 class weights (got {})", v.len()));
                }
                let total: f64 = v.iter().sum();
                if !(total.is_finite() && total > 0.0) || v.iter().any(|w| *w < 0.0) {
                    return Err(format!("leaf {node} has invalid class weights {v:?}"));
                }
                continue;
            }

            for (side, child) in [("left", self.children_left[node]), ("right", self.children_right[node])] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {node} has invalid {side} child {child}"));
                }
            }
            let feat = self.feature[node];
            if feat < 0 || feat as usize >= n_features {
                return Err(format!(
                    "node {node} splits on feature {feat}, but only {n_features} feature columns exist"
                ));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {node} has a NaN split threshold"));
            }
        }
        Ok(())
    }

    /// Default-class probability for one (scaled) row.
    pub fn predict_proba_row(&self, features: &[f64]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let x = features.get(self.feature[node] as usize).copied().unwrap_or(0.0);
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let v = &self.value[node];
        v[1] / (v[0] + v[1])
    }
}
