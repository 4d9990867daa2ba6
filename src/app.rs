//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real entry point that:
//! - parses CLI arguments
//! - installs logging (except while the TUI owns the terminal)
//! - loads the model package
//! - dispatches to predict / batch / info / sample / tui

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, ModelArgs, PredictArgs, SampleArgs};
use crate::data::{generate_applicants, SampleConfig};
use crate::domain::ModelChoice;
use crate::error::AppError;
use crate::report::bundle::REPORT_DIR;

pub mod pipeline;

/// Entry point for the `risk` binary.
pub fn run() -> Result<(), AppError> {
    // `risk` and `risk --algo lr` behave like `risk tui ...`. Clap needs a
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    if !matches!(cli.command, Command::Tui(_)) {
        init_tracing();
    }

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Batch(args) => handle_batch(args),
        Command::Info(args) => handle_info(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "loan_risk=info".into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let loaded = pipeline::open_package(args.model.model.as_deref())?;
    let config = args.model.score_config();
    let applicant = args.applicant();
    let result = pipeline::predict(&loaded.package, &config, &applicant)?;
    let variant = loaded.package.variant(config.model)?;

    if args.json {
        crate::io::write_result_json(io::stdout().lock(), &result)?;
    } else {
        println!("{}", crate::report::format_applicant(&applicant));
        println!();
        print!("{}", crate::report::format_prediction(&result, &variant.drivers));
    }

    if args.report {
        let path =
            crate::report::write_report_bundle(std::path::Path::new(REPORT_DIR), &applicant, &result, &variant.drivers)?;
        eprintln!("Report written: {}", path.display());
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let loaded = pipeline::open_package(args.model.model.as_deref())?;
    let input = match args.input {
        Some(path) => crate::cli::picker::validate_csv_path(&path)?,
        None => crate::cli::picker::prompt_for_csv_path(&loaded.package)?,
    };

    let out = pipeline::run_batch(&loaded.package, &args.model.score_config(), &input, args.output.as_deref())?;
    print!(
        "{}",
        crate::report::format_batch_summary(&out.summary, &out.output, out.model, out.threshold)
    );
    Ok(())
}

fn handle_info(args: ModelArgs) -> Result<(), AppError> {
    let loaded = pipeline::open_package(args.model.as_deref())?;
    print!("{}", crate::report::format_overview(&loaded.package, Some(&loaded.path)));
    for choice in ModelChoice::ALL {
        println!();
        print!("{}", crate::report::format_performance(&loaded.package, choice));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let applicants = generate_applicants(&SampleConfig {
        count: args.count,
        seed: args.seed,
    })?;
    crate::io::write_applicants_csv(&args.output, &applicants)?;
    println!(
        "Wrote {} synthetic applicants to {} (seed {}).",
        applicants.len(),
        args.output.display(),
        args.seed
    );
    Ok(())
}

/// Rewrite argv so `risk` defaults to `risk tui`.
///
/// - `risk`                          -> `risk tui`
/// - `risk --algo lr ...`            -> `risk tui --algo lr ...`
/// - `risk --help/--version/-h/-V`   -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    if matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help") {
        return argv;
    }

    if matches!(arg1.as_str(), "predict" | "batch" | "info" | "sample" | "tui") {
        return argv;
    }

    // A leading flag is a TUI flag.
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
