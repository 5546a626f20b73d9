//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{Alternative, ModelConfig, SourcePaths};

/// Senatax - Relate Senate election margins to IRS income statistics
#[derive(Parser, Debug)]
#[command(name = "senatax")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of per-year election result CSV files
    /// (file names end in the four-digit year, e.g. senate_2018.csv)
    #[arg(short, long)]
    pub elections: PathBuf,

    /// Directory of per-year IRS income CSV files
    #[arg(short, long)]
    pub income: PathBuf,

    /// Two-column CSV mapping IRS field codes to readable labels
    #[arg(short, long)]
    pub field_map: PathBuf,

    /// Output directory for the analysis tables and the model report
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Seed of the headline train/test split
    #[arg(long, default_value = "123")]
    pub seed: u64,

    /// Number of additional unseeded classifier trials
    #[arg(long, default_value = "50")]
    pub trials: usize,

    /// Share of each class placed in the training split (0 to 1, exclusive)
    #[arg(long, default_value = "0.8", value_parser = validate_train_fraction)]
    pub train_fraction: f64,

    /// Predictors are pruned while any variance inflation factor exceeds this value
    #[arg(long, default_value = "10")]
    pub vif_threshold: f64,

    /// Correlation threshold - drop one feature from pairs with correlation above this value
    #[arg(long, default_value = "0.7", value_parser = validate_correlation_threshold)]
    pub correlation_threshold: f64,

    /// Significance level of the group comparison
    #[arg(long, default_value = "0.05", value_parser = validate_alpha)]
    pub alpha: f64,

    /// Alternative hypothesis of the DEM vs REP income comparison.
    /// Options: "two-sided" (default), "less", "greater"
    #[arg(long, default_value = "two-sided", value_parser = parse_alternative)]
    pub alternative: Alternative,

    /// Predictors removed from the expanded model after the correlation
    /// filter (comma-separated). Every name must exist at that point.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

impl Cli {
    pub fn source_paths(&self) -> SourcePaths {
        SourcePaths {
            elections_dir: self.elections.clone(),
            income_dir: self.income.clone(),
            field_map: self.field_map.clone(),
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            seed: self.seed,
            trials: self.trials,
            train_fraction: self.train_fraction,
            vif_threshold: self.vif_threshold,
            correlation_threshold: self.correlation_threshold,
            alpha: self.alpha,
            alternative: self.alternative,
            manual_exclusions: self
                .exclude
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

fn parse_unit(s: &str) -> Result<f64, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for train_fraction parameter
fn validate_train_fraction(s: &str) -> Result<f64, String> {
    let value = parse_unit(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "train_fraction must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for correlation_threshold parameter
fn validate_correlation_threshold(s: &str) -> Result<f64, String> {
    let value = parse_unit(s)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "correlation_threshold must be between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for alpha parameter
fn validate_alpha(s: &str) -> Result<f64, String> {
    let value = parse_unit(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("alpha must be strictly between 0.0 and 1.0, got {}", value))
    }
}

fn parse_alternative(s: &str) -> Result<Alternative, String> {
    match s.to_lowercase().as_str() {
        "two-sided" | "two_sided" | "two.sided" => Ok(Alternative::TwoSided),
        "less" => Ok(Alternative::Less),
        "greater" => Ok(Alternative::Greater),
        other => Err(format!(
            "Unknown alternative '{}'. Options: two-sided, less, greater",
            other
        )),
    }
}
