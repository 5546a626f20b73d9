//! Long-to-wide reshaping keyed by (year, state)
//!
//! A long table has one row per (year, state, bracket) and N value fields.
//! The wide table has one row per (year, state) and N × 6 columns, named by
//! appending the bracket letter to the field name (`agi` → `agiA` … `agiF`).

use std::collections::BTreeMap;

use super::error::{PipelineError, PipelineResult};
use super::income::AgiBracket;
use super::key::StateYear;

/// One (year, state, bracket) row.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub key: StateYear,
    pub bracket: AgiBracket,
    pub values: Vec<Option<f64>>,
}

/// A long table over a declared list of value fields.
#[derive(Debug, Clone, Default)]
pub struct LongTable {
    pub fields: Vec<String>,
    pub rows: Vec<LongRow>,
}

/// One (year, state) row of a wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub key: StateYear,
    pub values: Vec<Option<f64>>,
}

/// A wide table; `values` of every row align with `columns`.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

/// Name of the wide column holding `field` for `bracket`.
pub fn wide_column_name(field: &str, bracket: AgiBracket) -> String {
    format!("{}{}", field, bracket.letter())
}

impl LongTable {
    /// Spread the bracket dimension into columns.
    ///
    /// Columns are ordered field-major, then A through F. Rows come out
    /// sorted by (year, state). A bracket missing for a key leaves its
    /// columns empty; a repeated (year, state, bracket) is rejected.
    pub fn pivot_wider(&self) -> PipelineResult<WideTable> {
        let n_fields = self.fields.len();
        let width = n_fields * AgiBracket::ALL.len();

        let columns: Vec<String> = self
            .fields
            .iter()
            .flat_map(|field| {
                AgiBracket::ALL
                    .iter()
                    .map(move |bracket| wide_column_name(field, *bracket))
            })
            .collect();

        let mut grouped: BTreeMap<StateYear, (Vec<Option<f64>>, [bool; 6])> = BTreeMap::new();

        for row in &self.rows {
            let (values, filled) = grouped
                .entry(row.key.clone())
                .or_insert_with(|| (vec![None; width], [false; 6]));

            let b = row.bracket.index();
            if filled[b] {
                return Err(PipelineError::DuplicateKey {
                    key: format!("{} bracket {}", row.key, row.bracket),
                });
            }
            filled[b] = true;

            for (f, value) in row.values.iter().enumerate().take(n_fields) {
                values[f * AgiBracket::ALL.len() + b] = *value;
            }
        }

        Ok(WideTable {
            columns,
            rows: grouped
                .into_iter()
                .map(|(key, (values, _))| WideRow { key, values })
                .collect(),
        })
    }
}

impl WideTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Gather the bracket columns back into long rows.
    ///
    /// Column names are decomposed by their trailing bracket letter; fields
    /// keep their first-seen order. Brackets with every value missing are
    /// not emitted.
    pub fn to_long(&self) -> PipelineResult<LongTable> {
        let mut fields: Vec<String> = Vec::new();
        let mut layout: Vec<(usize, AgiBracket)> = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let mut chars = column.chars();
            let bracket = chars
                .next_back()
                .and_then(AgiBracket::from_letter)
                .ok_or_else(|| PipelineError::UnknownPredictor {
                    name: column.clone(),
                })?;
            let field = chars.as_str();
            let idx = match fields.iter().position(|f| f == field) {
                Some(idx) => idx,
                None => {
                    fields.push(field.to_string());
                    fields.len() - 1
                }
            };
            layout.push((idx, bracket));
        }

        let mut rows = Vec::new();
        for wide in &self.rows {
            for bracket in AgiBracket::ALL {
                let mut values = vec![None; fields.len()];
                let mut present = false;
                for ((field_idx, b), value) in layout.iter().zip(&wide.values) {
                    if *b == bracket {
                        values[*field_idx] = *value;
                        present |= value.is_some();
                    }
                }
                if present {
                    rows.push(LongRow {
                        key: wide.key.clone(),
                        bracket,
                        values,
                    });
                }
            }
        }

        Ok(LongTable { fields, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_row(year: i32, state: &str, bracket: AgiBracket, values: &[f64]) -> LongRow {
        LongRow {
            key: StateYear::new(year, state),
            bracket,
            values: values.iter().map(|v| Some(*v)).collect(),
        }
    }

    #[test]
    fn test_wide_column_names_are_field_major() {
        let table = LongTable {
            fields: vec!["n".to_string(), "agi".to_string()],
            rows: vec![],
        };
        let wide = table.pivot_wider().unwrap();
        assert_eq!(wide.columns.len(), 12);
        assert_eq!(&wide.columns[..3], &["nA", "nB", "nC"]);
        assert_eq!(wide.columns[6], "agiA");
        assert_eq!(wide.columns[11], "agiF");
    }

    #[test]
    fn test_pivot_places_values() {
        let table = LongTable {
            fields: vec!["n".to_string(), "agi".to_string()],
            rows: vec![
                long_row(2018, "AL", AgiBracket::B, &[10.0, 100.0]),
                long_row(2018, "AL", AgiBracket::A, &[5.0, 20.0]),
            ],
        };
        let wide = table.pivot_wider().unwrap();
        assert_eq!(wide.rows.len(), 1);
        let row = &wide.rows[0];
        assert_eq!(row.values[wide.column_index("nA").unwrap()], Some(5.0));
        assert_eq!(row.values[wide.column_index("nB").unwrap()], Some(10.0));
        assert_eq!(row.values[wide.column_index("agiB").unwrap()], Some(100.0));
        assert_eq!(row.values[wide.column_index("agiF").unwrap()], None);
    }

    #[test]
    fn test_pivot_rejects_duplicates() {
        let table = LongTable {
            fields: vec!["n".to_string()],
            rows: vec![
                long_row(2018, "AL", AgiBracket::A, &[1.0]),
                long_row(2018, "AL", AgiBracket::A, &[2.0]),
            ],
        };
        assert!(matches!(
            table.pivot_wider(),
            Err(PipelineError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_rows_sorted_by_year_then_state() {
        let table = LongTable {
            fields: vec!["n".to_string()],
            rows: vec![
                long_row(2020, "AK", AgiBracket::A, &[1.0]),
                long_row(2018, "WY", AgiBracket::A, &[1.0]),
                long_row(2018, "AK", AgiBracket::A, &[1.0]),
            ],
        };
        let keys: Vec<String> = table
            .pivot_wider()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.key.to_string())
            .collect();
        assert_eq!(keys, vec!["AK/2018", "WY/2018", "AK/2020"]);
    }
}
