//! Input/output helpers.
//!
//! - batch CSV ingest + schema validation (`ingest`)
//! - scored CSV, result JSON and sample table exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
