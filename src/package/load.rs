//! Locate and read the model package file.
//!
//! Resolution order:
//! 1. explicit `--model <path>`
//! 2. `LOAN_RISK_MODEL` (a `.env` file in the working directory is honored)
//! 3. `dt_model.json`, then `model/dt_model.json`
//!
//! Any failure here means the process has no model to serve; callers surface it
//! as a "model unavailable" state rather than scoring with something partial.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ModelPackage;
use crate::error::AppError;

pub const MODEL_PATH_ENV: &str = "LOAN_RISK_MODEL";
pub const DEFAULT_MODEL_PATHS: [&str; 2] = ["dt_model.json", "model/dt_model.json"];

/// Find the package file without reading it.
pub fn resolve_model_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(AppError::new(
            2,
            format!("Model not found: '{}' does not exist.", path.display()),
        ));
    }

    dotenvy::dotenv().ok();
    if let Ok(value) = std::env::var(MODEL_PATH_ENV) {
        let path = PathBuf::from(value.trim());
        if path.is_file() {
            return Ok(path);
        }
        return Err(AppError::new(
            2,
            format!("Model not found: {MODEL_PATH_ENV}='{}' does not exist.", path.display()),
        ));
    }

    for candidate in DEFAULT_MODEL_PATHS {
        let path = PathBuf::from(candidate);
        debug!(path = %path.display(), "probing model location");
        if path.is_file() {
            return Ok(path);
        }
    }

    Err(AppError::new(
        2,
        format!(
            "Model not found. Place {} in the working directory (or {}), pass --model, or set {MODEL_PATH_ENV}.",
            DEFAULT_MODEL_PATHS[0], DEFAULT_MODEL_PATHS[1]
        ),
    ))
}

/// Open, parse and validate a package file.
pub fn load_package(path: &Path) -> Result<ModelPackage, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model package '{}': {e}", path.display())))?;
    let package = read_package(BufReader::new(file))
        .map_err(|e| AppError::new(e.exit_code(), format!("{} ({})", e.message(), path.display())))?;

    info!(
        path = %path.display(),
        features = package.n_features(),
        encoders = package.encoders.len(),
        lr_model = package.lr_model.is_some(),
        "loaded model package"
    );
    Ok(package)
}

/// Parse and validate a package from any reader.
pub fn read_package<R: Read>(reader: R) -> Result<ModelPackage, AppError> {
    let package: ModelPackage = serde_json::from_reader(reader)
        .map_err(|e| AppError::new(2, format!("Invalid model package JSON: {e}")))?;
    package
        .validate()
        .map_err(|e| AppError::new(2, format!("Invalid model package: {e}")))?;
    Ok(package)
}
