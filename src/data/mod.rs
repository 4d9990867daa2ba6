//! Synthetic applicant data for exercising the batch path without real records.

pub mod sample;

pub use sample::*;
