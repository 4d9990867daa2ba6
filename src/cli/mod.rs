//! Command-line parsing for the credit risk scorer.
//!
//! Argument parsing and command dispatch stay separate from the scoring code;
//! `app` turns these structs into a `ScoreConfig` / `Applicant`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Applicant, HomeOwnership, LoanIntent, ModelChoice, ScoreConfig, UnknownCategoryPolicy};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "risk", version, about = "Credit default-risk scoring (decision tree / logistic regression)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score one applicant and print the decision card.
    Predict(PredictArgs),
    /// Score every row of a CSV and write `<input>_scored.csv`.
    Batch(BatchArgs),
    /// Print the model overview and evaluation metrics.
    Info(ModelArgs),
    /// Write a synthetic applicant CSV for trying `risk batch`.
    Sample(SampleArgs),
    /// Launch the interactive applicant form.
    Tui(ModelArgs),
}

/// Options shared by every command that loads the model package.
#[derive(Debug, Parser, Clone)]
pub struct ModelArgs {
    /// Model package JSON (default: $LOAN_RISK_MODEL, then dt_model.json, then model/dt_model.json).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Which classifier scores the request.
    #[arg(long, value_enum, ignore_case = true, default_value_t = ModelChoice::DecisionTree)]
    pub algo: ModelChoice,

    /// Override the package decision threshold (0..=1).
    #[arg(long)]
    pub threshold: Option<f64>,

    /// How to treat categories the encoders never saw.
    #[arg(long, value_enum, ignore_case = true, default_value_t = UnknownCategoryPolicy::Reject)]
    pub unknown_category: UnknownCategoryPolicy,
}

impl ModelArgs {
    pub fn score_config(&self) -> ScoreConfig {
        ScoreConfig {
            model: self.algo,
            threshold: self.threshold,
            unknown_category: self.unknown_category,
        }
    }
}

/// Applicant fields for `risk predict` (defaults match the form).
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Age in years (18-100).
    #[arg(long, default_value_t = 30)]
    pub age: u32,

    /// Annual income ($).
    #[arg(long, default_value_t = 50_000.0)]
    pub income: f64,

    #[arg(long, value_enum, ignore_case = true, default_value_t = HomeOwnership::Rent)]
    pub home: HomeOwnership,

    /// Employment length in years (0-60).
    #[arg(long, default_value_t = 5.0)]
    pub emp_length: f64,

    #[arg(long, value_enum, ignore_case = true, default_value_t = LoanIntent::Personal)]
    pub intent: LoanIntent,

    /// Requested loan amount ($, at least 500).
    #[arg(long, default_value_t = 10_000.0)]
    pub loan_amount: f64,

    /// Interest rate in percent (5-25).
    #[arg(long, default_value_t = 11.0)]
    pub rate: f64,

    /// Applicant has a prior default on file.
    #[arg(long)]
    pub prior_default: bool,

    /// Credit-history length in years (2-30).
    #[arg(long, default_value_t = 5)]
    pub history: u32,

    /// Print the result as JSON instead of the card.
    #[arg(long)]
    pub json: bool,

    /// Also write a Markdown report under `reports/`.
    #[arg(long)]
    pub report: bool,
}

impl PredictArgs {
    pub fn applicant(&self) -> Applicant {
        Applicant {
            age: self.age,
            income: self.income,
            home_ownership: self.home,
            emp_length: self.emp_length,
            loan_intent: self.intent,
            loan_amount: self.loan_amount,
            interest_rate: self.rate,
            prior_default: self.prior_default,
            credit_history_years: self.history,
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Applicant CSV (prompted for when omitted).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Scored CSV (default: `<input-stem>_scored.csv` next to the input).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Number of applicants to generate.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    /// Random seed (same seed, same file).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV.
    #[arg(short = 'o', long, value_name = "CSV", default_value = "applicants.csv")]
    pub output: PathBuf,
}
