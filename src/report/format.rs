//! Formatted terminal output.
//!
//! Formatting lives here so scoring code stays free of presentation and the
//! CLI and TUI print identical text.

use std::path::Path;

use crate::domain::{Applicant, ModelChoice, Outcome, ScoredResult};
use crate::package::{ClassReport, DriverTable, ModelPackage};
use crate::report::BatchSummary;

pub const GAUGE_WIDTH: usize = 40;
pub const TOP_DRIVERS: usize = 3;

/// Horizontal probability bar, e.g. `[########----------------]  23%`.
///
/// The percentage is truncated, not rounded, so 0.999 never displays as 100%.
pub fn probability_gauge(p: f64, width: usize) -> String {
    let p = p.clamp(0.0, 1.0);
    let filled = ((p * width as f64).floor() as usize).min(width);
    let pct = (p * 100.0).floor() as u32;
    format!("[{}{}] {pct:>3}%", "#".repeat(filled), "-".repeat(width - filled))
}

/// Headline for a decision: `APPROVED` / `FLAGGED`.
pub fn verdict(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::GoodLoan => "APPROVED",
        Outcome::Default => "FLAGGED",
    }
}

/// The full prediction card printed by `risk predict`.
pub fn format_prediction(result: &ScoredResult, drivers: &DriverTable) -> String {
    let mut out = String::new();

    let headline = match result.outcome {
        Outcome::GoodLoan => "Good Loan: low probability of default",
        Outcome::Default => "High Default Risk: applicant likely to default",
    };
    out.push_str(&format!("=== {} ===\n", verdict(result.outcome)));
    out.push_str(&format!("{headline} (via {})\n", result.model.display_name()));
    out.push_str(&format!("Risk level: {}\n\n", result.tier.label()));

    out.push_str("Default probability\n");
    out.push_str(&probability_gauge(result.probability, GAUGE_WIDTH));
    out.push_str("\n\n");

    let mut rows: Vec<(&str, String)> = vec![
        ("Model used", result.model.display_name().to_string()),
        ("Decision threshold", format!("{}", result.threshold)),
    ];
    if let Some(grade) = result.grade {
        rows.push(("Estimated loan grade", format!("Grade {grade}")));
    }
    if let Some(lpi) = result.loan_percent_income {
        rows.push(("Loan % of income", format!("{:.1}%", lpi * 100.0)));
    }
    rows.push(("Predicted class", result.outcome.label().to_string()));
    rows.push(("Confidence", format!("{:.2}%", result.confidence * 100.0)));
    rows.push(("Default probability", format!("{:.2}%", result.probability * 100.0)));
    rows.push(("Risk level", result.tier.label().to_string()));
    out.push_str(&format_key_values(&rows));

    let top = format_drivers(drivers, TOP_DRIVERS);
    if !top.is_empty() {
        out.push('\n');
        out.push_str(&top);
    }
    out
}

/// Ranked driver rows with a relative bar, as shown under a prediction.
pub fn format_drivers(drivers: &DriverTable, n: usize) -> String {
    let top = drivers.top(n);
    if top.is_empty() {
        return String::new();
    }
    let max = top.iter().map(|(_, v)| v.abs()).fold(0.0, f64::max);
    let name_width = top.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let mut out = format!("{}:\n", drivers.title());
    for (rank, (name, value)) in top.iter().enumerate() {
        let bar_len = if max > 0.0 { ((value.abs() / max) * 20.0).round() as usize } else { 0 };
        let score = match drivers {
            DriverTable::Importance(_) => format!("{value:.4}"),
            DriverTable::Coefficients(_) => {
                let toward = if *value > 0.0 { Outcome::Default } else { Outcome::GoodLoan };
                format!("{value:+.4} {}", toward.label())
            }
        };
        out.push_str(&format!(
            "  #{} {name:<name_width$}  {:<20}  {score}\n",
            rank + 1,
            "=".repeat(bar_len)
        ));
    }
    out
}

/// Dataset sizes, feature list and thresholds (`risk info`, first half).
pub fn format_overview(package: &ModelPackage, source: Option<&Path>) -> String {
    let mut out = String::new();
    out.push_str("=== Credit Risk Model Overview ===\n");
    if let Some(path) = source {
        out.push_str(&format!("Package: {}\n", path.display()));
    }

    let info = &package.dataset_info;
    let rows = vec![
        ("Total samples", fmt_count(info.total_samples)),
        ("Train samples", fmt_count(info.train_samples)),
        ("Test samples", fmt_count(info.test_samples)),
        ("Features", package.n_features().to_string()),
    ];
    out.push_str(&format_key_values(&rows));

    out.push_str("\nModels:\n");
    for choice in ModelChoice::ALL {
        let status = if package.has_variant(choice) {
            format!("threshold {}", package.threshold_for(choice))
        } else {
            "not in package".to_string()
        };
        out.push_str(&format!("  {:<20} {status}\n", choice.display_name()));
    }

    out.push_str("\nFeature columns:\n");
    for (idx, col) in package.feature_columns.iter().enumerate() {
        let encoded = package
            .encoders
            .get(col)
            .map(|enc| format!("  [{}]", enc.classes.join(", ")))
            .unwrap_or_default();
        out.push_str(&format!("  {:>2}. {col}{encoded}\n", idx + 1));
    }
    out
}

/// Evaluation metrics for one variant (`risk info`, second half).
pub fn format_performance(package: &ModelPackage, choice: ModelChoice) -> String {
    let metrics = package.metrics_for(choice);
    let mut out = format!("=== {} Performance ===\n", choice.display_name());
    if !package.has_variant(choice) {
        out.push_str("Model not in package.\n");
        return out;
    }
    if metrics.is_empty() {
        out.push_str("No evaluation metrics recorded in the package.\n");
        return out;
    }

    let default_class = metrics.default_class();
    let good_class = metrics.good_class();
    let rows = vec![
        ("Accuracy", fmt_pct(metrics.test_accuracy)),
        ("ROC-AUC", fmt_ratio(metrics.roc_auc)),
        ("Weighted F1", fmt_ratio(metrics.weighted_avg.as_ref().and_then(|w| w.f1_score))),
        ("Default precision", fmt_pct(default_class.and_then(|c| c.precision))),
        ("Default recall", fmt_pct(default_class.and_then(|c| c.recall))),
        ("Default F1", fmt_pct(default_class.and_then(|c| c.f1_score))),
        ("Good-loan precision", fmt_pct(good_class.and_then(|c| c.precision))),
        ("Good-loan recall", fmt_pct(good_class.and_then(|c| c.recall))),
    ];
    out.push_str(&format_key_values(&rows));

    if let Some(cm) = metrics.confusion_matrix.as_deref() {
        out.push('\n');
        out.push_str(&format_confusion_matrix(cm));
    }

    if !metrics.class_metrics.is_empty() {
        out.push_str("\nClassification report:\n");
        let mut table: Vec<(&str, &ClassReport)> = metrics.class_metrics.iter().map(|(k, v)| (k.as_str(), v)).collect();
        if let Some(avg) = &metrics.macro_avg {
            table.push(("Macro avg", avg));
        }
        if let Some(avg) = &metrics.weighted_avg {
            table.push(("Weighted avg", avg));
        }
        out.push_str(&format_class_table(&table));
    }

    if let Some(recall) = default_class.and_then(|c| c.recall) {
        out.push_str(&format!(
            "\nModel catches {:.1}% of actual defaults; low recall means undetected risk.\n",
            recall * 100.0
        ));
    }

    if let Ok(variant) = package.variant(choice) {
        let drivers = format_drivers(&variant.drivers, 10);
        if !drivers.is_empty() {
            out.push('\n');
            out.push_str(&drivers);
        }
    }
    out
}

/// `[[tn, fp], [fn, tp]]` as a labelled 2x2 grid.
pub fn format_confusion_matrix(cm: &[Vec<u64>]) -> String {
    let cell = |r: usize, c: usize| cm.get(r).and_then(|row| row.get(c)).copied().unwrap_or(0);
    let mut out = String::from("Confusion matrix (rows = actual, cols = predicted):\n");
    out.push_str(&format!("{:<14} {:>10} {:>10}\n", "", "Good Loan", "Default"));
    out.push_str(&format!("{:<14} {:>10} {:>10}\n", "Good Loan", cell(0, 0), cell(0, 1)));
    out.push_str(&format!("{:<14} {:>10} {:>10}\n", "Default", cell(1, 0), cell(1, 1)));
    out
}

fn format_class_table(rows: &[(&str, &ClassReport)]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:<16} {:>9} {:>9} {:>9} {:>9}\n",
        "class", "precision", "recall", "f1", "support"
    ));
    out.push_str(&format!("  {:-<16} {:-<9} {:-<9} {:-<9} {:-<9}\n", "", "", "", "", ""));
    for (name, report) in rows {
        out.push_str(&format!(
            "  {:<16} {:>9} {:>9} {:>9} {:>9}\n",
            truncate(name, 16),
            fmt_ratio(report.precision),
            fmt_ratio(report.recall),
            fmt_ratio(report.f1_score),
            report.support.map(|s| format!("{s:.0}")).unwrap_or_else(|| "-".to_string()),
        ));
    }
    out
}

/// Summary printed after `risk batch`.
pub fn format_batch_summary(summary: &BatchSummary, output: &Path, model: ModelChoice, threshold: f64) -> String {
    let mut out = String::new();
    out.push_str("=== Batch Scoring ===\n");
    let mut rows = vec![
        ("Model", model.display_name().to_string()),
        ("Decision threshold", format!("{threshold}")),
        ("Rows", summary.rows.to_string()),
        ("Scored", summary.scored.to_string()),
        ("Flagged as default", summary.defaults.to_string()),
        ("LOW / MEDIUM / HIGH", format!("{} / {} / {}", summary.low, summary.medium, summary.high)),
    ];
    if let Some(mean) = summary.mean_probability {
        rows.push(("Mean default probability", format!("{:.2}%", mean * 100.0)));
    }
    rows.push(("Output", output.display().to_string()));
    out.push_str(&format_key_values(&rows));

    if !summary.issues.is_empty() {
        out.push_str(&format!("\nUnscored rows ({}):\n", summary.issues.len()));
        for issue in summary.issues.iter().take(20) {
            out.push_str(&format!("  line {}: {}\n", issue.line, issue.message));
        }
        if summary.issues.len() > 20 {
            out.push_str(&format!("  ... and {} more\n", summary.issues.len() - 20));
        }
    }
    out
}

/// One-line echo of the applicant fields.
pub fn format_applicant(applicant: &Applicant) -> String {
    format!(
        "age {} | income {:.0} | {} | emp {:.1}y | {} | loan {:.0} @ {:.2}% | prior default {} | history {}y",
        applicant.age,
        applicant.income,
        applicant.home_ownership.as_str(),
        applicant.emp_length,
        applicant.loan_intent.as_str(),
        applicant.loan_amount,
        applicant.interest_rate,
        applicant.prior_default_flag(),
        applicant.credit_history_years,
    )
}

fn format_key_values(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.iter().map(|(k, v)| format!("{k:<width$}  {v}\n")).collect()
}

fn fmt_count(v: u64) -> String {
    if v == 0 { "-".to_string() } else { v.to_string() }
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}%", x * 100.0)).unwrap_or_else(|| "-".to_string())
}

fn fmt_ratio(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanGrade, RiskTier};
    use crate::package::fixtures;

    fn result(p: f64) -> ScoredResult {
        ScoredResult {
            model: ModelChoice::DecisionTree,
            outcome: Outcome::from_probability(p, 0.35),
            probability: p,
            threshold: 0.35,
            tier: RiskTier::from_probability(p),
            confidence: p.max(1.0 - p),
            grade: Some(LoanGrade::B),
            loan_percent_income: Some(0.2),
        }
    }

    #[test]
    fn gauge_truncates_percentage() {
        assert_eq!(probability_gauge(0.0, 10), "[----------]   0%");
        assert_eq!(probability_gauge(0.5, 10), "[#####-----]  50%");
        assert_eq!(probability_gauge(0.999, 10), "[#########-]  99%");
        assert_eq!(probability_gauge(1.0, 10), "[##########] 100%");
    }

    #[test]
    fn prediction_card_lists_decision_fields() {
        let pkg = fixtures::package();
        let variant = pkg.variant(ModelChoice::DecisionTree).unwrap();
        let card = format_prediction(&result(0.9), &variant.drivers);
        assert!(card.starts_with("=== FLAGGED ==="));
        assert!(card.contains("HIGH RISK"));
        assert!(card.contains("Grade B"));
        assert!(card.contains("Loan % of income"));
        assert!(card.contains("20.0%"));
        assert!(card.contains("90.00%"));
        assert!(card.contains("Top Features (Importance):"));
        assert!(card.contains("#1 loan_percent_income"));
    }

    #[test]
    fn coefficient_drivers_show_direction() {
        let pkg = fixtures::package();
        let variant = pkg.variant(ModelChoice::LogisticRegression).unwrap();
        let text = format_drivers(&variant.drivers, 1);
        assert!(text.starts_with("Top Risk Drivers (Coefficients):"));
        assert!(text.contains("+0.5000 Default"));
    }

    #[test]
    fn performance_without_metrics_says_so() {
        let pkg = fixtures::package();
        let text = format_performance(&pkg, ModelChoice::LogisticRegression);
        assert!(text.contains("No evaluation metrics"));
        let text = format_performance(&pkg, ModelChoice::DecisionTree);
        assert!(text.contains("90.00%"));
    }

    #[test]
    fn performance_reports_both_classes() {
        let mut pkg = fixtures::package();
        pkg.dt_metrics.class_metrics = serde_json::from_str(
            r#"{
                "Good Loan (0)": {"precision": 0.93, "recall": 0.96},
                "Default (1)": {"precision": 0.82, "recall": 0.70}
            }"#,
        )
        .unwrap();
        let text = format_performance(&pkg, ModelChoice::DecisionTree);
        let line = |label: &str| text.lines().find(|l| l.contains(label)).unwrap().to_string();
        assert!(line("Good-loan precision").contains("93.00%"));
        assert!(line("Good-loan recall").contains("96.00%"));
        assert!(line("Default recall").contains("70.00%"));
    }

    #[test]
    fn overview_lists_features_and_thresholds() {
        let pkg = fixtures::package();
        let text = format_overview(&pkg, None);
        assert!(text.contains("Total samples"));
        assert!(text.contains("threshold 0.35"));
        assert!(text.contains("cb_person_default_on_file  [N, Y]"));
    }

    #[test]
    fn confusion_matrix_tolerates_short_rows() {
        let text = format_confusion_matrix(&[vec![50, 5], vec![7]]);
        assert!(text.contains("Default"));
        assert!(text.lines().last().unwrap().trim_end().ends_with('0'));
    }
}
