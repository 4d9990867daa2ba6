//! Reporting: batch summaries, formatted terminal output and report bundles.

pub mod bundle;
pub mod format;

use crate::domain::{Outcome, RiskTier};
use crate::scoring::RowScore;

pub use bundle::write_report_bundle;
pub use format::*;

/// A row of a batch that was left unscored.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// 1-based CSV line (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Counts over one scored batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub rows: usize,
    pub scored: usize,
    pub defaults: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub mean_probability: Option<f64>,
    pub issues: Vec<RowIssue>,
}

pub fn summarize_batch(scores: &[RowScore]) -> BatchSummary {
    let mut summary = BatchSummary {
        rows: scores.len(),
        ..BatchSummary::default()
    };
    let mut total = 0.0;

    for (idx, score) in scores.iter().enumerate() {
        match score {
            Ok(result) => {
                summary.scored += 1;
                total += result.probability;
                if result.outcome == Outcome::Default {
                    summary.defaults += 1;
                }
                match result.tier {
                    RiskTier::Low => summary.low += 1,
                    RiskTier::Medium => summary.medium += 1,
                    RiskTier::High => summary.high += 1,
                }
            }
            Err(err) => summary.issues.push(RowIssue {
                line: idx + 2,
                message: err.to_string(),
            }),
        }
    }

    if summary.scored > 0 {
        summary.mean_probability = Some(total / summary.scored as f64);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelChoice, ScoredResult};
    use crate::error::ScoreError;

    fn scored(p: f64) -> RowScore {
        Ok(ScoredResult {
            model: ModelChoice::DecisionTree,
            outcome: Outcome::from_probability(p, 0.35),
            probability: p,
            threshold: 0.35,
            tier: RiskTier::from_probability(p),
            confidence: p.max(1.0 - p),
            grade: None,
            loan_percent_income: None,
        })
    }

    #[test]
    fn counts_tiers_and_issue_lines() {
        let scores = vec![
            scored(0.1),
            Err(ScoreError::UnknownCategory {
                column: "loan_intent".into(),
                value: "X".into(),
            }),
            scored(0.5),
            scored(0.9),
        ];
        let summary = summarize_batch(&scores);
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.scored, 3);
        assert_eq!((summary.low, summary.medium, summary.high), (1, 1, 1));
        assert_eq!(summary.defaults, 2);
        assert_eq!(summary.issues.len(), 1);
        assert_eq!(summary.issues[0].line, 3);
        assert!((summary.mean_probability.unwrap() - 0.5).abs() < 1e-12);
    }
}
