//! `loan-risk` library crate.
//!
//! The binary (`risk`) is a thin wrapper around this library so that:
//!
//! - the scoring transform is testable without spawning processes
//! - the CLI and the TUI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod package;
pub mod report;
pub mod scoring;
pub mod tui;
