//! IRS individual income-tax statistics: schema reconciliation and
//! state-level long tables
//!
//! Each yearly file lists returns per zip code and AGI bracket. Column sets
//! drift between years, so only columns present in every file are kept.
//! State totals are the rows carrying the all-zero zip sentinel.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::key::StateYear;
use super::loader::{
    column_names, load_string_table, parse_amount, require_columns, string_column,
    year_from_file_name,
};
use super::reshape::{LongRow, LongTable};

/// Zip value of the state-level aggregate rows.
pub const STATE_ZIP_SENTINEL: &str = "00000";

/// Field names of the minimal view.
pub const HOUSEHOLDS_FIELD: &str = "households";
pub const AGI_FIELD: &str = "agi";

/// One of the six ordered AGI ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgiBracket {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl AgiBracket {
    pub const ALL: [AgiBracket; 6] = [
        AgiBracket::A,
        AgiBracket::B,
        AgiBracket::C,
        AgiBracket::D,
        AgiBracket::E,
        AgiBracket::F,
    ];

    /// Positional recode of the source indicator: 1 is A, 6 is F.
    pub fn from_code(code: i64) -> Option<AgiBracket> {
        if code < 1 {
            return None;
        }
        Self::ALL.get((code - 1) as usize).copied()
    }

    pub fn letter(&self) -> char {
        match self {
            AgiBracket::A => 'A',
            AgiBracket::B => 'B',
            AgiBracket::C => 'C',
            AgiBracket::D => 'D',
            AgiBracket::E => 'E',
            AgiBracket::F => 'F',
        }
    }

    pub fn from_letter(letter: char) -> Option<AgiBracket> {
        Self::ALL.iter().copied().find(|b| b.letter() == letter)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for AgiBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Names of the structural columns of the income files.
#[derive(Debug, Clone)]
pub struct IncomeColumns {
    pub zip: String,
    pub state: String,
    pub state_fips: String,
    pub bracket: String,
    pub households: String,
    pub agi: String,
}

impl Default for IncomeColumns {
    fn default() -> Self {
        Self {
            zip: "zipcode".to_string(),
            state: "STATE".to_string(),
            state_fips: "STATEFIPS".to_string(),
            bracket: "agi_stub".to_string(),
            households: "N1".to_string(),
            agi: "A00100".to_string(),
        }
    }
}

impl IncomeColumns {
    fn identifiers(&self) -> [&str; 4] {
        [
            self.zip.as_str(),
            self.state.as_str(),
            self.state_fips.as_str(),
            self.bracket.as_str(),
        ]
    }

    fn required(&self) -> [&str; 6] {
        [
            self.zip.as_str(),
            self.state.as_str(),
            self.state_fips.as_str(),
            self.bracket.as_str(),
            self.households.as_str(),
            self.agi.as_str(),
        ]
    }
}

/// Field-code to readable-label lookup used to rename the full view.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    labels: HashMap<String, String>,
}

impl FieldMapping {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a two-column CSV (code, label) with a header row.
    pub fn from_csv(path: &Path) -> PipelineResult<Self> {
        let df = load_string_table(path)?;
        let names = column_names(&df);
        if names.len() < 2 {
            return Err(PipelineError::MissingColumn {
                path: path.to_path_buf(),
                column: "label".to_string(),
            });
        }

        let codes = string_column(&df, &names[0])?;
        let labels = string_column(&df, &names[1])?;

        let pairs = codes
            .into_iter()
            .zip(labels)
            .filter_map(|(code, label)| match (code, label) {
                (Some(c), Some(l)) if !c.trim().is_empty() && !l.trim().is_empty() => {
                    Some((c.trim().to_string(), l.trim().to_string()))
                }
                _ => None,
            });

        Ok(Self::from_pairs(pairs))
    }

    /// Readable label for a code, or the code itself when unmapped.
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.labels.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Minimal and full long views of the income data.
#[derive(Debug, Clone)]
pub struct IncomeTables {
    pub minimal: LongTable,
    pub full: LongTable,
}

/// Columns present in every frame, in the order of the first one.
pub fn common_columns(frames: &[(PathBuf, DataFrame)]) -> PipelineResult<Vec<String>> {
    let mut iter = frames.iter();
    let Some((_, first)) = iter.next() else {
        return Err(PipelineError::EmptyColumnIntersection);
    };

    let mut common = column_names(first);
    for (_, df) in iter {
        let names: HashSet<String> = column_names(df).into_iter().collect();
        common.retain(|c| names.contains(c));
    }

    if common.is_empty() {
        return Err(PipelineError::EmptyColumnIntersection);
    }
    Ok(common)
}

/// Left-pad a zip code with zeros to five characters.
pub fn pad_zip(raw: &str) -> String {
    format!("{:0>5}", raw.trim())
}

fn parse_bracket(raw: Option<&str>, path: &Path) -> PipelineResult<AgiBracket> {
    let value = raw.unwrap_or("").trim();
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0)
        .and_then(|v| AgiBracket::from_code(v as i64))
        .ok_or_else(|| PipelineError::InvalidBracket {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
}

/// Rename the value fields, rejecting labels that collide.
fn rename_fields(fields: &[String], mapping: &FieldMapping) -> PipelineResult<Vec<String>> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .map(|code| {
            let label = mapping.label(code).to_string();
            if !seen.insert(label.clone()) {
                return Err(PipelineError::DuplicateColumn { name: label });
            }
            Ok(label)
        })
        .collect()
}

/// State-level rows of one income file, restricted to `value_fields`.
fn state_level_rows(
    path: &Path,
    df: &DataFrame,
    columns: &IncomeColumns,
    value_fields: &[String],
) -> PipelineResult<Vec<LongRow>> {
    let year = year_from_file_name(path)?;

    let zips = string_column(df, &columns.zip)?;
    let states = string_column(df, &columns.state)?;
    let brackets = string_column(df, &columns.bracket)?;
    let values: Vec<Vec<Option<String>>> = value_fields
        .iter()
        .map(|f| string_column(df, f))
        .collect::<PipelineResult<_>>()?;

    let mut rows = Vec::new();
    for i in 0..df.height() {
        let zip = zips[i].as_deref().map(pad_zip);
        if zip.as_deref() != Some(STATE_ZIP_SENTINEL) {
            continue;
        }

        let state = states[i].as_deref().unwrap_or("").trim();
        if state.is_empty() {
            debug!("{}: state-level row {} has no state code", path.display(), i);
            continue;
        }

        let bracket = parse_bracket(brackets[i].as_deref(), path)?;
        rows.push(LongRow {
            key: StateYear::new(year, state),
            bracket,
            values: values
                .iter()
                .map(|col| col[i].as_deref().and_then(parse_amount))
                .collect(),
        });
    }

    debug!(
        "{}: {} rows, {} state-level",
        path.display(),
        df.height(),
        rows.len()
    );
    Ok(rows)
}

/// Build the minimal and full long views from every yearly income file.
pub fn build_income_tables(
    files: &[PathBuf],
    mapping: &FieldMapping,
    columns: &IncomeColumns,
) -> PipelineResult<IncomeTables> {
    let frames: Vec<(PathBuf, DataFrame)> = files
        .iter()
        .map(|path| load_string_table(path).map(|df| (path.clone(), df)))
        .collect::<PipelineResult<_>>()?;

    let common = common_columns(&frames)?;

    // Required columns must survive the intersection; report the first file
    // that lacks one.
    for (path, df) in &frames {
        require_columns(df, path, &columns.required())?;
    }

    let identifiers = columns.identifiers();
    let value_fields: Vec<String> = common
        .iter()
        .filter(|c| !identifiers.contains(&c.as_str()))
        .cloned()
        .collect();

    let households_idx = value_fields
        .iter()
        .position(|f| f == &columns.households)
        .ok_or_else(|| PipelineError::MissingColumn {
            path: files[0].clone(),
            column: columns.households.clone(),
        })?;
    let agi_idx = value_fields
        .iter()
        .position(|f| f == &columns.agi)
        .ok_or_else(|| PipelineError::MissingColumn {
            path: files[0].clone(),
            column: columns.agi.clone(),
        })?;

    let mut full_rows = Vec::new();
    for (path, df) in &frames {
        full_rows.extend(state_level_rows(path, df, columns, &value_fields)?);
    }

    let minimal_rows = full_rows
        .iter()
        .map(|row| LongRow {
            key: row.key.clone(),
            bracket: row.bracket,
            values: vec![row.values[households_idx], row.values[agi_idx]],
        })
        .collect();

    Ok(IncomeTables {
        minimal: LongTable {
            fields: vec![HOUSEHOLDS_FIELD.to_string(), AGI_FIELD.to_string()],
            rows: minimal_rows,
        },
        full: LongTable {
            fields: rename_fields(&value_fields, mapping)?,
            rows: full_rows,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_recode_is_positional() {
        let letters: Vec<char> = (1..=6)
            .map(|c| AgiBracket::from_code(c).unwrap().letter())
            .collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D', 'E', 'F']);
    }

    #[test]
    fn test_bracket_recode_out_of_range() {
        assert_eq!(AgiBracket::from_code(0), None);
        assert_eq!(AgiBracket::from_code(7), None);
        assert_eq!(AgiBracket::from_code(-1), None);
    }

    #[test]
    fn test_brackets_are_ordered() {
        let mut shuffled = vec![AgiBracket::D, AgiBracket::A, AgiBracket::F, AgiBracket::B];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![AgiBracket::A, AgiBracket::B, AgiBracket::D, AgiBracket::F]
        );
    }

    #[test]
    fn test_parse_bracket_accepts_float_codes() {
        let path = Path::new("x_2018.csv");
        assert_eq!(parse_bracket(Some("3"), path).unwrap(), AgiBracket::C);
        assert_eq!(parse_bracket(Some("6.0"), path).unwrap(), AgiBracket::F);
        assert!(parse_bracket(Some("2.5"), path).is_err());
        assert!(parse_bracket(None, path).is_err());
    }

    #[test]
    fn test_pad_zip() {
        assert_eq!(pad_zip("0"), "00000");
        assert_eq!(pad_zip("501"), "00501");
        assert_eq!(pad_zip("35004"), "35004");
    }

    #[test]
    fn test_field_mapping_falls_back_to_code() {
        let mapping = FieldMapping::from_pairs([("A00100", "Adjusted gross income")]);
        assert_eq!(mapping.label("A00100"), "Adjusted gross income");
        assert_eq!(mapping.label("N1"), "N1");
    }

    #[test]
    fn test_rename_rejects_collisions() {
        let mapping = FieldMapping::from_pairs([("N1", "returns"), ("N2", "returns")]);
        let fields = vec!["N1".to_string(), "N2".to_string()];
        assert!(matches!(
            rename_fields(&fields, &mapping),
            Err(PipelineError::DuplicateColumn { .. })
        ));
    }
}
