//! Source file discovery and CSV ingestion
//!
//! Every source table is read with schema inference disabled so that all
//! columns arrive as strings. Zip codes keep their leading zeros and vote
//! counts with thousands separators survive until they are cleansed here.

use std::path::{Path, PathBuf};

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};

/// List the `*.csv` files of a directory in file-name order.
pub fn list_source_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        return Err(PipelineError::NoSourceFiles {
            path: dir.to_path_buf(),
        });
    }

    files.sort();
    Ok(files)
}

/// Derive the table year from the last four characters of the file stem.
///
/// Source files are named like `results_2018_2020.csv`; only the trailing
/// year is meaningful.
pub fn year_from_file_name(path: &Path) -> PipelineResult<i32> {
    let invalid = || PipelineError::InvalidYear {
        path: path.to_path_buf(),
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;
    let chars: Vec<char> = stem.chars().collect();
    if chars.len() < 4 {
        return Err(invalid());
    }

    let tail: String = chars[chars.len() - 4..].iter().collect();
    if !tail.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    tail.parse::<i32>().map_err(|_| invalid())
}

/// Load a CSV file with every column typed as a string.
pub fn load_string_table(path: &Path) -> PipelineResult<DataFrame> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Column names of a frame, in file order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Fail with a schema violation naming the first absent column.
pub fn require_columns(df: &DataFrame, path: &Path, required: &[&str]) -> PipelineResult<()> {
    let present = column_names(df);
    for column in required {
        if !present.iter().any(|c| c == column) {
            return Err(PipelineError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Extract a string column as owned values.
pub fn string_column(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    let ca = column.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Parse a vote count after stripping every character that is not a digit
/// or a decimal point. Anything unparsable becomes a missing value.
pub fn parse_vote_count(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parse a signed income amount, tolerating thousands separators.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when a raw cell is absent, empty or whitespace-only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}
