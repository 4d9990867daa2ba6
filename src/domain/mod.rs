//! Domain types used throughout the scoring pipeline.
//!
//! This module defines:
//!
//! - raw inputs (`Applicant`, `RawValue`, `RawRow`) and the feature column names
//! - request settings (`ModelChoice`, `UnknownCategoryPolicy`, `ScoreConfig`)
//! - scoring outputs (`ScoredResult`, `Outcome`, `RiskTier`, `LoanGrade`)

pub mod types;

pub use types::*;
