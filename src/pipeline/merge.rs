//! Joining income and election tables on (state, year)
//!
//! The join keeps every key from both sides. Rows without a partner, rows
//! from uncontested races and rows with a missing predictor are dropped only
//! when a model frame is cut from the table.

use std::collections::BTreeMap;

use faer::Mat;
use polars::prelude::*;

use super::election::{ElectionSummary, Winner};
use super::error::{PipelineError, PipelineResult};
use super::key::StateYear;
use super::reshape::WideTable;

/// One (state, year) of the analysis table.
#[derive(Debug, Clone)]
pub struct AnalysisRow {
    pub key: StateYear,
    pub election: Option<ElectionSummary>,
    pub income: Option<Vec<Option<f64>>>,
}

/// Outer join of an income-wide table and the election summaries.
#[derive(Debug, Clone, Default)]
pub struct AnalysisTable {
    pub predictors: Vec<String>,
    pub rows: Vec<AnalysisRow>,
}

/// Row counts by join outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub matched: usize,
    pub election_only: usize,
    pub income_only: usize,
}

/// Join `income` and `elections` on (state, year).
pub fn merge_tables(
    income: &WideTable,
    elections: &[ElectionSummary],
) -> PipelineResult<AnalysisTable> {
    let mut rows: BTreeMap<StateYear, AnalysisRow> = BTreeMap::new();

    for wide in &income.rows {
        let row = AnalysisRow {
            key: wide.key.clone(),
            election: None,
            income: Some(wide.values.clone()),
        };
        if rows.insert(wide.key.clone(), row).is_some() {
            return Err(PipelineError::DuplicateKey {
                key: wide.key.to_string(),
            });
        }
    }

    for summary in elections {
        let row = rows
            .entry(summary.key.clone())
            .or_insert_with(|| AnalysisRow {
                key: summary.key.clone(),
                election: None,
                income: None,
            });
        if row.election.is_some() {
            return Err(PipelineError::DuplicateKey {
                key: summary.key.to_string(),
            });
        }
        row.election = Some(summary.clone());
    }

    Ok(AnalysisTable {
        predictors: income.columns.clone(),
        rows: rows.into_values().collect(),
    })
}

/// Complete rows in dense form, ready for model fitting.
#[derive(Debug, Clone)]
pub struct ModelFrame {
    pub keys: Vec<StateYear>,
    pub predictors: Vec<String>,
    /// n × p predictor matrix, columns aligned with `predictors`.
    pub x: Mat<f64>,
    pub net_votes: Vec<f64>,
    pub winners: Vec<Winner>,
}

impl ModelFrame {
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.x.nrows()).map(|i| self.x[(i, j)]).collect()
    }

    pub fn predictor_index(&self, name: &str) -> Option<usize> {
        self.predictors.iter().position(|p| p == name)
    }

    /// Keep only the named predictors, in the given order.
    pub fn select(&self, names: &[String]) -> PipelineResult<ModelFrame> {
        let indices = names
            .iter()
            .map(|name| {
                self.predictor_index(name)
                    .ok_or_else(|| PipelineError::UnknownPredictor { name: name.clone() })
            })
            .collect::<PipelineResult<Vec<usize>>>()?;

        let n = self.nrows();
        let mut x = Mat::<f64>::zeros(n, indices.len());
        for (new_j, &old_j) in indices.iter().enumerate() {
            for i in 0..n {
                x[(i, new_j)] = self.x[(i, old_j)];
            }
        }

        Ok(ModelFrame {
            keys: self.keys.clone(),
            predictors: names.to_vec(),
            x,
            net_votes: self.net_votes.clone(),
            winners: self.winners.clone(),
        })
    }
}

impl AnalysisTable {
    pub fn stats(&self) -> MergeStats {
        let mut stats = MergeStats::default();
        for row in &self.rows {
            match (&row.election, &row.income) {
                (Some(_), Some(_)) => stats.matched += 1,
                (Some(_), None) => stats.election_only += 1,
                (None, Some(_)) => stats.income_only += 1,
                (None, None) => {}
            }
        }
        stats
    }

    fn predictor_indices(&self, names: &[String]) -> PipelineResult<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.predictors
                    .iter()
                    .position(|p| p == name)
                    .ok_or_else(|| PipelineError::UnknownPredictor { name: name.clone() })
            })
            .collect()
    }

    /// Project the income side onto `names`, in the given order.
    pub fn select_predictors(&self, names: &[String]) -> PipelineResult<AnalysisTable> {
        let indices = self.predictor_indices(names)?;
        Ok(AnalysisTable {
            predictors: names.to_vec(),
            rows: self
                .rows
                .iter()
                .map(|row| AnalysisRow {
                    key: row.key.clone(),
                    election: row.election.clone(),
                    income: row
                        .income
                        .as_ref()
                        .map(|values| indices.iter().map(|&j| values[j]).collect()),
                })
                .collect(),
        })
    }

    /// Remove the named predictors. Every name must be present.
    pub fn drop_predictors(&self, names: &[String]) -> PipelineResult<AnalysisTable> {
        self.predictor_indices(names)?;
        let keep: Vec<String> = self
            .predictors
            .iter()
            .filter(|p| !names.contains(p))
            .cloned()
            .collect();
        self.select_predictors(&keep)
    }

    /// Matched, contested rows whose predictors are all present.
    pub fn model_frame(&self, predictors: &[String]) -> PipelineResult<ModelFrame> {
        let indices = self.predictor_indices(predictors)?;

        let complete: Vec<(&AnalysisRow, &ElectionSummary, f64, &Vec<Option<f64>>)> = self
            .rows
            .iter()
            .filter_map(|row| {
                let election = row.election.as_ref()?;
                let net = election.net_votes?;
                let income = row.income.as_ref()?;
                indices
                    .iter()
                    .all(|&j| income[j].is_some())
                    .then_some((row, election, net, income))
            })
            .collect();

        if complete.is_empty() {
            return Err(PipelineError::InsufficientData(
                "no complete rows after joining election and income tables".to_string(),
            ));
        }

        let mut x = Mat::<f64>::zeros(complete.len(), indices.len());
        for (i, (_, _, _, income)) in complete.iter().enumerate() {
            for (new_j, &j) in indices.iter().enumerate() {
                x[(i, new_j)] = income[j].unwrap_or(f64::NAN);
            }
        }

        Ok(ModelFrame {
            keys: complete.iter().map(|(row, ..)| row.key.clone()).collect(),
            predictors: predictors.to_vec(),
            x,
            net_votes: complete.iter().map(|(_, _, net, _)| *net).collect(),
            winners: complete.iter().map(|(_, e, ..)| e.winner).collect(),
        })
    }

    /// Export as a polars frame: keys, election fields, then predictors.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let years: Vec<i32> = self.rows.iter().map(|r| r.key.year).collect();
        let states: Vec<String> = self.rows.iter().map(|r| r.key.state.clone()).collect();
        let net: Vec<Option<f64>> = self
            .rows
            .iter()
            .map(|r| r.election.as_ref().and_then(|e| e.net_votes))
            .collect();
        let total: Vec<Option<f64>> = self
            .rows
            .iter()
            .map(|r| r.election.as_ref().map(|e| e.total_votes))
            .collect();
        let winner: Vec<Option<&str>> = self
            .rows
            .iter()
            .map(|r| r.election.as_ref().map(|e| e.winner.as_str()))
            .collect();

        let mut columns: Vec<Column> = vec![
            Column::new("year".into(), years),
            Column::new("state".into(), states),
            Column::new("net_votes".into(), net),
            Column::new("total_votes".into(), total),
            Column::new("winner".into(), winner),
        ];

        for (j, name) in self.predictors.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|r| r.income.as_ref().and_then(|v| v[j]))
                .collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        DataFrame::new(columns)
    }
}
