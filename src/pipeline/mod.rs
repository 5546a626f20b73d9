//! Pipeline module - builds the analysis tables and fits the models

pub mod analysis;
pub mod classifier;
pub mod correlation;
pub mod distribution;
pub mod election;
pub mod error;
pub mod hypothesis;
pub mod income;
pub mod key;
pub mod linalg;
pub mod loader;
pub mod merge;
pub mod regression;
pub mod reshape;

pub use analysis::*;
pub use classifier::{ClassifierRun, ConfusionMatrix, Evaluation, LinearSvm, TrialSummary};
pub use correlation::{CorrelatedPair, CorrelationFilter};
pub use election::{ElectionSummary, Party, Winner};
pub use error::{PipelineError, PipelineResult};
pub use hypothesis::{Alternative, GroupComparison, TestKind};
pub use income::{AgiBracket, FieldMapping, IncomeColumns};
pub use key::StateYear;
pub use merge::{AnalysisTable, MergeStats, ModelFrame};
pub use regression::{LinearModel, OlsFit};
pub use reshape::{LongTable, WideTable};

use serde::Serialize;

/// Tunable settings of the modelling steps.
#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    /// Seed of the headline train/test split.
    pub seed: u64,
    /// Number of unseeded split/fit/evaluate trials.
    pub trials: usize,
    pub train_fraction: f64,
    pub vif_threshold: f64,
    pub correlation_threshold: f64,
    pub alpha: f64,
    pub alternative: Alternative,
    /// Predictors removed from the expanded model after the correlation
    /// filter. Each one must still be present at that point.
    pub manual_exclusions: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: classifier::DEFAULT_SEED,
            trials: classifier::DEFAULT_TRIALS,
            train_fraction: classifier::DEFAULT_TRAIN_FRACTION,
            vif_threshold: regression::DEFAULT_VIF_THRESHOLD,
            correlation_threshold: correlation::DEFAULT_CORRELATION_THRESHOLD,
            alpha: hypothesis::DEFAULT_ALPHA,
            alternative: Alternative::TwoSided,
            manual_exclusions: Vec::new(),
        }
    }
}
