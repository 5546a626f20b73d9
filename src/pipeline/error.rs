//! Error types for the analysis pipeline.
//!
//! Fatal conditions (schema violations, empty column intersections, duplicate
//! keys) abort the run. Recoverable conditions such as a degenerate
//! classifier split are surfaced as their own variant so the caller can retry.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source file could not be read or parsed as CSV.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// A required column is absent from a source file.
    #[error("Required column '{column}' not found in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// The trailing four characters of the file stem are not a year.
    #[error("Cannot derive a four-digit year from file name {}", path.display())]
    InvalidYear { path: PathBuf },

    /// No directory entries matched the expected source files.
    #[error("No CSV files found in {}", path.display())]
    NoSourceFiles { path: PathBuf },

    /// The per-year income files share no column at all.
    #[error("Income files have no columns in common")]
    EmptyColumnIntersection,

    /// AGI bracket indicator outside the 1..=6 range.
    #[error("Invalid AGI bracket '{value}' in {}", path.display())]
    InvalidBracket { path: PathBuf, value: String },

    /// The same (state, year[, bracket]) key appeared twice.
    #[error("Duplicate row for {key}")]
    DuplicateKey { key: String },

    /// Renaming or expansion produced two columns with the same name.
    #[error("Duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// A configured predictor is not part of the table.
    #[error("Predictor '{name}' not found in analysis table")]
    UnknownPredictor { name: String },

    /// Too few complete rows to fit a model.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The design matrix is rank deficient.
    #[error("Design matrix is singular (aliased predictor '{predictor}')")]
    SingularDesign { predictor: String },

    /// A random split left one class absent from train or test.
    #[error("Degenerate split: class '{class}' absent from the {side} set")]
    DegenerateSplit { class: String, side: &'static str },

    /// Group comparison requires exactly two labels.
    #[error("Expected exactly two groups, found {0}")]
    GroupCount(usize),

    /// A probability distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
