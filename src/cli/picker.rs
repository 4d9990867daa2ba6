//! Interactive CSV picker for `risk batch` without `--input`.
//!
//! Candidate tables are looked up under the working directory and checked
//! against the loaded package's feature columns, so the list shows up front
//! which files can be scored. Scored outputs (`*_scored.csv`) and the
//! `reports/` directory are never offered.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::{missing_feature_columns, peek_headers};
use crate::package::ModelPackage;

const SEARCH_DEPTH: usize = 3;

const SKIP_DIRS: [&str; 4] = [".git", "target", "node_modules", "reports"];

/// One CSV found on disk and whether its header fits the package.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub path: PathBuf,
    /// `None` when the header could not be read.
    pub missing: Option<Vec<String>>,
}

impl Candidate {
    fn inspect(path: PathBuf, package: &ModelPackage) -> Self {
        let missing = peek_headers(&path).map(|headers| {
            missing_feature_columns(package, &headers)
                .into_iter()
                .map(String::from)
                .collect()
        });
        Self { path, missing }
    }

    pub fn is_scoreable(&self) -> bool {
        self.missing.as_ref().is_some_and(Vec::is_empty)
    }

    fn status(&self) -> String {
        match &self.missing {
            None => "unreadable header".to_string(),
            Some(m) if m.is_empty() => "ready".to_string(),
            Some(m) if m.len() <= 2 => format!("missing {}", m.join(", ")),
            Some(m) => format!("missing {} columns", m.len()),
        }
    }
}

/// Ask on stdin which applicant table to score.
///
/// Accepts a list number or a path; `q` cancels. Tables that cannot be scored
/// are listed but refused.
pub fn prompt_for_csv_path(package: &ModelPackage) -> Result<PathBuf, AppError> {
    let candidates = discover_candidates(Path::new("."), package);
    if candidates.is_empty() {
        return Err(AppError::new(
            2,
            "No applicant tables (.csv) found here. Pass one with `risk batch --input <file.csv>` \
             or create one with `risk sample`.",
        ));
    }

    let mut out = io::stdout().lock();
    let stdin = io::stdin();
    let write_err = |e: io::Error| AppError::new(4, format!("Failed to write prompt: {e}"));

    writeln!(out, "Applicant tables:").map_err(write_err)?;
    for (idx, c) in candidates.iter().enumerate() {
        writeln!(out, "{:>3}) {:<40} [{}]", idx + 1, display_path(&c.path), c.status()).map_err(write_err)?;
    }

    loop {
        write!(out, "Table to score (1-{}, a path, or q): ", candidates.len()).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| AppError::new(4, format!("Failed to read input: {e}")))?;
        if read == 0 {
            return Err(AppError::new(2, "No table selected (end of input)."));
        }

        match resolve_choice(line.trim(), &candidates) {
            Choice::Quit => return Err(AppError::new(2, "Canceled.")),
            Choice::Picked(path) => return Ok(path),
            Choice::Retry(msg) => writeln!(out, "{msg}").map_err(write_err)?,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Picked(PathBuf),
    Retry(String),
}

fn resolve_choice(input: &str, candidates: &[Candidate]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| candidates.get(i)) {
            Some(c) if c.is_scoreable() => Choice::Picked(c.path.clone()),
            Some(c) => Choice::Retry(format!("{} cannot be scored: {}.", display_path(&c.path), c.status())),
            None => Choice::Retry(format!("No table #{n}; pick 1-{}.", candidates.len())),
        };
    }
    match validate_csv_path(Path::new(input)) {
        Ok(path) => Choice::Picked(path),
        Err(err) => Choice::Retry(err.message().to_string()),
    }
}

/// Check that `path` names an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.is_file() {
        let what = if path.is_dir() { "is a directory" } else { "does not exist" };
        return Err(AppError::new(2, format!("Input table {} {what}.", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Input table must be a .csv file (got {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Applicant tables under `root`, sorted by path.
pub fn discover_candidates(root: &Path, package: &ModelPackage) -> Vec<Candidate> {
    let mut paths = Vec::new();
    walk(root, SEARCH_DEPTH, &mut paths);
    paths.sort();
    paths.into_iter().map(|p| Candidate::inspect(p, package)).collect()
}

fn walk(dir: &Path, depth_left: usize, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(kind) = entry.file_type() else {
            continue;
        };
        if kind.is_dir() {
            let name = entry.file_name();
            let skip = name.to_str().is_some_and(|n| SKIP_DIRS.contains(&n));
            if depth_left > 0 && !skip {
                walk(&path, depth_left - 1, out);
            }
        } else if kind.is_file() && is_input_csv(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn is_input_csv(path: &Path) -> bool {
    let scored = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with("_scored"));
    has_csv_extension(path) && !scored
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
