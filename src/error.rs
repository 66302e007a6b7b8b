//! Error types for the quoting engine and the table loader

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the rating engine.
///
/// No-match outcomes (no rate row, no coverage step, no bucket) are not errors;
/// only caller contract violations surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    #[error("invalid applicant profile: {0}")]
    InvalidProfile(String),
}

/// Errors raised while reading reference tables from disk
#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot open table `{table}` at {path}: {source}")]
    Io {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in table `{table}`: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// Errors raised while reading a batch of applicant profiles
#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("profile `{id}`: {source}")]
    Invalid {
        id: String,
        #[source]
        source: QuoteError,
    },
}
