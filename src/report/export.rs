//! Analysis table and model report export

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{
    Analysis, AnalysisTable, ClassifierReport, ExpandedModel, GroupComparison, LinearModel,
    MergeStats, ModelConfig, SourcePaths,
};

pub const SIMPLE_TABLE_FILE: &str = "analysis_simple.csv";
pub const EXPANDED_TABLE_FILE: &str = "analysis_expanded.csv";
pub const MODEL_REPORT_FILE: &str = "model_report.json";

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub senatax_version: String,
    pub inputs: SourcePaths,
    pub config: ModelConfig,
}

/// Row counts of the joined tables
#[derive(Serialize)]
pub struct TableCounts {
    pub election_summaries: usize,
    pub contested_races: usize,
    pub matched: usize,
    pub election_only: usize,
    pub income_only: usize,
    pub simple_predictors: usize,
    pub expanded_predictors: usize,
}

/// Complete model report
#[derive(Serialize)]
pub struct ModelReport<'a> {
    pub metadata: ReportMetadata,
    pub tables: TableCounts,
    pub simple_model: &'a LinearModel,
    pub expanded_model: &'a ExpandedModel,
    pub classifier: &'a ClassifierReport,
    pub income_comparison: &'a GroupComparison,
}

impl<'a> ModelReport<'a> {
    pub fn new(analysis: &'a Analysis, inputs: &SourcePaths, config: &ModelConfig) -> Self {
        let stats: MergeStats = analysis.tables.simple_stats;
        let elections = &analysis.tables.elections;
        ModelReport {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                senatax_version: env!("CARGO_PKG_VERSION").to_string(),
                inputs: inputs.clone(),
                config: config.clone(),
            },
            tables: TableCounts {
                election_summaries: elections.len(),
                contested_races: elections.iter().filter(|e| e.is_contested()).count(),
                matched: stats.matched,
                election_only: stats.election_only,
                income_only: stats.income_only,
                simple_predictors: analysis.tables.simple.predictors.len(),
                expanded_predictors: analysis.tables.expanded.predictors.len(),
            },
            simple_model: &analysis.simple_model,
            expanded_model: &analysis.expanded_model,
            classifier: &analysis.classifier,
            income_comparison: &analysis.comparison,
        }
    }
}

/// Write an analysis table as CSV
pub fn export_analysis_table(table: &AnalysisTable, output_path: &Path) -> Result<()> {
    let mut df = table
        .to_dataframe()
        .context("Failed to assemble analysis table")?;
    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", output_path.display()))?;
    Ok(())
}

/// Export the model report to a JSON file
pub fn export_model_report(report: &ModelReport<'_>, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize model report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write model report to {}", output_path.display()))?;

    Ok(())
}

/// Write both analysis tables and the model report into `output_dir`.
/// Returns the written paths.
pub fn write_outputs(
    analysis: &Analysis,
    inputs: &SourcePaths,
    config: &ModelConfig,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let simple = output_dir.join(SIMPLE_TABLE_FILE);
    export_analysis_table(&analysis.tables.simple, &simple)?;

    let expanded = output_dir.join(EXPANDED_TABLE_FILE);
    export_analysis_table(&analysis.expanded_model.reduced, &expanded)?;

    let report_path = output_dir.join(MODEL_REPORT_FILE);
    export_model_report(&ModelReport::new(analysis, inputs, config), &report_path)?;

    Ok(vec![simple, expanded, report_path])
}
