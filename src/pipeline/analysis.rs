//! End-to-end analysis: build tables, fit the models, compare groups
//!
//! Each step is a separate function so the binary can report progress
//! between them; `run_analysis` chains them for library callers.

use std::path::PathBuf;

use log::debug;
use serde::Serialize;

use super::classifier::{headline_run, run_trials, ClassifierRun, TrialSummary};
use super::correlation::{correlation_filter, CorrelationFilter};
use super::election::{load_election_summaries, ElectionSummary, Winner};
use super::error::{PipelineError, PipelineResult};
use super::hypothesis::{compare_groups, GroupComparison};
use super::income::{
    build_income_tables, AgiBracket, FieldMapping, IncomeColumns, AGI_FIELD, HOUSEHOLDS_FIELD,
};
use super::loader::list_source_files;
use super::merge::{merge_tables, AnalysisTable, MergeStats, ModelFrame};
use super::regression::{fit_pruned_model, LinearModel};
use super::reshape::wide_column_name;
use super::ModelConfig;

/// Locations of the three inputs.
#[derive(Debug, Clone, Serialize)]
pub struct SourcePaths {
    pub elections_dir: PathBuf,
    pub income_dir: PathBuf,
    pub field_map: PathBuf,
}

/// Joined tables for both model variants.
#[derive(Debug, Clone)]
pub struct PreparedTables {
    pub elections: Vec<ElectionSummary>,
    pub simple: AnalysisTable,
    pub expanded: AnalysisTable,
    pub simple_stats: MergeStats,
}

/// Read every source and join the income views with the election summaries.
pub fn prepare_tables(paths: &SourcePaths, columns: &IncomeColumns) -> PipelineResult<PreparedTables> {
    let election_files = list_source_files(&paths.elections_dir)?;
    let income_files = list_source_files(&paths.income_dir)?;
    debug!(
        "Found {} election files and {} income files",
        election_files.len(),
        income_files.len()
    );

    let elections = load_election_summaries(&election_files)?;
    let mapping = FieldMapping::from_csv(&paths.field_map)?;
    let income = build_income_tables(&income_files, &mapping, columns)?;

    let simple = merge_tables(&income.minimal.pivot_wider()?, &elections)?;
    let expanded = merge_tables(&income.full.pivot_wider()?, &elections)?;
    let simple_stats = simple.stats();

    Ok(PreparedTables {
        elections,
        simple,
        expanded,
        simple_stats,
    })
}

/// Primary model: households and AGI per bracket, pruned by VIF.
pub fn fit_simple_model(table: &AnalysisTable, config: &ModelConfig) -> PipelineResult<LinearModel> {
    let frame = table.model_frame(&table.predictors)?;
    fit_pruned_model(&frame, config.vif_threshold)
}

/// Exploratory model over every income field, with its reduced inputs.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandedModel {
    pub correlation: CorrelationFilter,
    pub manual_exclusions: Vec<String>,
    pub model: LinearModel,
    #[serde(skip)]
    pub reduced: AnalysisTable,
}

/// Correlation filter, configured exclusions, then VIF pruning.
pub fn fit_expanded_model(table: &AnalysisTable, config: &ModelConfig) -> PipelineResult<ExpandedModel> {
    let frame = table.model_frame(&table.predictors)?;
    let correlation = correlation_filter(&frame, config.correlation_threshold);
    debug!(
        "Correlation filter dropped {} of {} predictors",
        correlation.dropped.len(),
        frame.predictors.len()
    );

    let filtered = table.drop_predictors(&correlation.dropped)?;
    let reduced = filtered.drop_predictors(&config.manual_exclusions)?;
    let model = fit_pruned_model(&reduced.model_frame(&reduced.predictors)?, config.vif_threshold)?;

    Ok(ExpandedModel {
        correlation,
        manual_exclusions: config.manual_exclusions.clone(),
        model,
        reduced,
    })
}

/// Seeded headline run plus the unseeded trial distribution.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierReport {
    pub predictors: Vec<String>,
    pub rows: usize,
    pub headline: ClassifierRun,
    pub trials: TrialSummary,
}

/// Frame for the winner classifier: every reduced expanded predictor.
pub fn classifier_frame(reduced: &AnalysisTable) -> PipelineResult<ModelFrame> {
    reduced.model_frame(&reduced.predictors)
}

pub fn run_classifier(frame: &ModelFrame, config: &ModelConfig) -> PipelineResult<ClassifierReport> {
    let headline = headline_run(frame, config.train_fraction, config.seed)?;
    let trials = run_trials(frame, config.train_fraction, config.trials)?;
    Ok(ClassifierReport {
        predictors: frame.predictors.clone(),
        rows: frame.nrows(),
        headline,
        trials,
    })
}

/// Aggregate AGI divided by households, summed over every bracket.
fn agi_per_household(frame: &ModelFrame) -> PipelineResult<Vec<f64>> {
    let columns = |field: &str| -> PipelineResult<Vec<usize>> {
        AgiBracket::ALL
            .iter()
            .map(|b| {
                let name = wide_column_name(field, *b);
                frame
                    .predictor_index(&name)
                    .ok_or(PipelineError::UnknownPredictor { name })
            })
            .collect()
    };
    let agi = columns(AGI_FIELD)?;
    let households = columns(HOUSEHOLDS_FIELD)?;

    Ok((0..frame.nrows())
        .map(|i| {
            let total_agi: f64 = agi.iter().map(|&j| frame.x[(i, j)]).sum();
            let total_households: f64 = households.iter().map(|&j| frame.x[(i, j)]).sum();
            total_agi / total_households
        })
        .collect())
}

/// Compare AGI per household between DEM-won and REP-won state-years.
pub fn compare_income_by_winner(table: &AnalysisTable, config: &ModelConfig) -> PipelineResult<GroupComparison> {
    let frame = table.model_frame(&table.predictors)?;
    let ratio = agi_per_household(&frame)?;

    // DEM rows first so the comparison always reads DEM vs REP.
    let mut values = Vec::with_capacity(ratio.len());
    let mut labels = Vec::with_capacity(ratio.len());
    for wanted in [Winner::Dem, Winner::Rep] {
        for (value, winner) in ratio.iter().zip(&frame.winners) {
            if *winner == wanted && value.is_finite() {
                values.push(*value);
                labels.push(wanted);
            }
        }
    }

    compare_groups(&values, &labels, config.alternative, config.alpha)
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub tables: PreparedTables,
    pub simple_model: LinearModel,
    pub expanded_model: ExpandedModel,
    pub classifier: ClassifierReport,
    pub comparison: GroupComparison,
}

/// Run every step in order.
pub fn run_analysis(
    paths: &SourcePaths,
    columns: &IncomeColumns,
    config: &ModelConfig,
) -> PipelineResult<Analysis> {
    let tables = prepare_tables(paths, columns)?;
    let simple_model = fit_simple_model(&tables.simple, config)?;
    let expanded_model = fit_expanded_model(&tables.expanded, config)?;
    let classifier = run_classifier(&classifier_frame(&expanded_model.reduced)?, config)?;
    let comparison = compare_income_by_winner(&tables.simple, config)?;

    Ok(Analysis {
        tables,
        simple_model,
        expanded_model,
        classifier,
        comparison,
    })
}
