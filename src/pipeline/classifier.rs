//! Linear support-vector classifier for the race winner
//!
//! Features are standardized with training statistics, then a soft-margin
//! linear SVM (hinge loss, C = 1) is trained by dual coordinate descent.
//! Coordinates are visited in index order so a fixed split always yields the
//! same model. The bias is learned as the weight of a constant feature.

use indicatif::ProgressBar;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::distribution::{binomial_at_least, clopper_pearson, t_quantile};
use super::election::Winner;
use super::error::{PipelineError, PipelineResult};
use super::linalg::standardize;
use super::merge::ModelFrame;
use crate::utils::{create_trial_bar, note_skipped_trial};

pub const DEFAULT_SEED: u64 = 123;
pub const DEFAULT_TRIALS: usize = 50;
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Fresh splits tried before a trial is recorded as skipped.
pub const MAX_SPLIT_ATTEMPTS: usize = 10;

const CONFIDENCE_LEVEL: f64 = 0.95;
const SVM_COST: f64 = 1.0;
const SVM_TOLERANCE: f64 = 1e-4;
const SVM_MAX_EPOCHS: usize = 2_000;

/// Row indices of one train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn label(winner: Winner) -> f64 {
    match winner {
        Winner::Rep => 1.0,
        Winner::Dem => -1.0,
    }
}

fn check_side(labels: &[Winner], rows: &[usize], side: &'static str) -> PipelineResult<()> {
    for class in [Winner::Dem, Winner::Rep] {
        if !rows.iter().any(|&i| labels[i] == class) {
            return Err(PipelineError::DegenerateSplit {
                class: class.to_string(),
                side,
            });
        }
    }
    Ok(())
}

/// Stratified random partition: each class contributes
/// `ceil(fraction * class size)` rows to the training set, clamped so that
/// a class with at least two members keeps one row on each side.
///
/// Fails with `DegenerateSplit` when either side misses a class, which only
/// happens for a class with fewer than two members.
pub fn stratified_split<R: Rng + ?Sized>(
    labels: &[Winner],
    train_fraction: f64,
    rng: &mut R,
) -> PipelineResult<Split> {
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [Winner::Dem, Winner::Rep] {
        let mut members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
        members.shuffle(rng);
        let n = members.len();
        let n_train = if n < 2 {
            n
        } else {
            ((train_fraction * n as f64).ceil() as usize).clamp(1, n - 1)
        };
        train.extend_from_slice(&members[..n_train]);
        test.extend_from_slice(&members[n_train..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    check_side(labels, &train, "training")?;
    check_side(labels, &test, "test")?;
    Ok(Split { train, test })
}

/// Trained linear SVM together with its feature scaling.
#[derive(Debug, Clone, Serialize)]
pub struct LinearSvm {
    pub predictors: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub means: Vec<f64>,
    pub sds: Vec<f64>,
    pub epochs: usize,
    pub support_vectors: usize,
}

impl LinearSvm {
    fn scaled(&self, frame: &ModelFrame, row: usize, j: usize) -> f64 {
        if self.sds[j] > 0.0 {
            (frame.x[(row, j)] - self.means[j]) / self.sds[j]
        } else {
            0.0
        }
    }

    /// Signed distance-like score; positive means REP.
    pub fn decision_value(&self, frame: &ModelFrame, row: usize) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(j, w)| w * self.scaled(frame, row, j))
            .sum::<f64>()
            + self.bias
    }

    pub fn predict(&self, frame: &ModelFrame, row: usize) -> Winner {
        if self.decision_value(frame, row) > 0.0 {
            Winner::Rep
        } else {
            Winner::Dem
        }
    }
}

/// Train on the given rows of `frame`.
pub fn train_svm(frame: &ModelFrame, rows: &[usize]) -> PipelineResult<LinearSvm> {
    let p = frame.predictors.len();
    if rows.is_empty() || p == 0 {
        return Err(PipelineError::InsufficientData(
            "classifier needs at least one training row and one predictor".to_string(),
        ));
    }

    let mut subset = faer::Mat::<f64>::zeros(rows.len(), p);
    for (r, &i) in rows.iter().enumerate() {
        for j in 0..p {
            subset[(r, j)] = frame.x[(i, j)];
        }
    }
    let scaled = standardize(&subset);
    let z = &scaled.z;
    let y: Vec<f64> = rows.iter().map(|&i| label(frame.winners[i])).collect();

    // Augmented feature vector (z, 1); w[p] is the bias.
    let n = rows.len();
    let q_diag: Vec<f64> = (0..n)
        .map(|r| (0..p).map(|j| z[(r, j)] * z[(r, j)]).sum::<f64>() + 1.0)
        .collect();
    let mut w = vec![0.0; p + 1];
    let mut alpha = vec![0.0; n];
    let mut epochs = 0;

    while epochs < SVM_MAX_EPOCHS {
        epochs += 1;
        let mut max_pg = f64::NEG_INFINITY;
        let mut min_pg = f64::INFINITY;

        for r in 0..n {
            let margin = (0..p).map(|j| w[j] * z[(r, j)]).sum::<f64>() + w[p];
            let g = y[r] * margin - 1.0;
            let pg = if alpha[r] <= 0.0 {
                g.min(0.0)
            } else if alpha[r] >= SVM_COST {
                g.max(0.0)
            } else {
                g
            };
            max_pg = max_pg.max(pg);
            min_pg = min_pg.min(pg);

            if pg.abs() > 1e-12 {
                let old = alpha[r];
                alpha[r] = (old - g / q_diag[r]).clamp(0.0, SVM_COST);
                let step = (alpha[r] - old) * y[r];
                for j in 0..p {
                    w[j] += step * z[(r, j)];
                }
                w[p] += step;
            }
        }

        if max_pg - min_pg < SVM_TOLERANCE {
            break;
        }
    }

    if epochs == SVM_MAX_EPOCHS {
        warn!("SVM dual coordinate descent stopped after {SVM_MAX_EPOCHS} epochs");
    }
    debug!("SVM converged after {epochs} epochs");

    let bias = w[p];
    w.truncate(p);
    Ok(LinearSvm {
        predictors: frame.predictors.clone(),
        weights: w,
        bias,
        means: scaled.means,
        sds: scaled.sds,
        epochs,
        support_vectors: alpha.iter().filter(|a| **a > 0.0).count(),
    })
}

/// Counts indexed by (predicted, actual).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub dem_predicted_dem: usize,
    pub dem_predicted_rep: usize,
    pub rep_predicted_dem: usize,
    pub rep_predicted_rep: usize,
}

impl ConfusionMatrix {
    fn record(&mut self, actual: Winner, predicted: Winner) {
        match (actual, predicted) {
            (Winner::Dem, Winner::Dem) => self.dem_predicted_dem += 1,
            (Winner::Dem, Winner::Rep) => self.dem_predicted_rep += 1,
            (Winner::Rep, Winner::Dem) => self.rep_predicted_dem += 1,
            (Winner::Rep, Winner::Rep) => self.rep_predicted_rep += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.dem_predicted_dem + self.dem_predicted_rep + self.rep_predicted_dem + self.rep_predicted_rep
    }

    pub fn correct(&self) -> usize {
        self.dem_predicted_dem + self.rep_predicted_rep
    }

    pub fn actual_dem(&self) -> usize {
        self.dem_predicted_dem + self.dem_predicted_rep
    }

    pub fn actual_rep(&self) -> usize {
        self.rep_predicted_dem + self.rep_predicted_rep
    }
}

/// Test-set performance of one fitted classifier.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Share of the majority class in the test set.
    pub no_information_rate: f64,
    /// One-sided binomial p-value of accuracy > no-information rate.
    pub p_value: f64,
}

/// Score `model` on `rows`.
pub fn evaluate(model: &LinearSvm, frame: &ModelFrame, rows: &[usize]) -> PipelineResult<Evaluation> {
    let mut confusion = ConfusionMatrix::default();
    for &i in rows {
        confusion.record(frame.winners[i], model.predict(frame, i));
    }

    let n = confusion.total();
    if n == 0 {
        return Err(PipelineError::InsufficientData("empty test set".to_string()));
    }
    let correct = confusion.correct();
    let (ci_lower, ci_upper) = clopper_pearson(correct as u64, n as u64, CONFIDENCE_LEVEL)?;
    let nir = confusion.actual_dem().max(confusion.actual_rep()) as f64 / n as f64;
    let p_value = binomial_at_least(correct as u64, n as u64, nir)?;

    Ok(Evaluation {
        confusion,
        accuracy: correct as f64 / n as f64,
        ci_lower,
        ci_upper,
        no_information_rate: nir,
        p_value,
    })
}

/// One split, fit and evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierRun {
    pub train_size: usize,
    pub test_size: usize,
    pub model: LinearSvm,
    pub evaluation: Evaluation,
}

/// Split with `rng`, train and evaluate once.
pub fn run_once<R: Rng + ?Sized>(
    frame: &ModelFrame,
    train_fraction: f64,
    rng: &mut R,
) -> PipelineResult<ClassifierRun> {
    let split = stratified_split(&frame.winners, train_fraction, rng)?;
    let model = train_svm(frame, &split.train)?;
    let evaluation = evaluate(&model, frame, &split.test)?;
    Ok(ClassifierRun {
        train_size: split.train.len(),
        test_size: split.test.len(),
        model,
        evaluation,
    })
}

/// Call `attempt` again while it fails with `DegenerateSplit`, at most
/// `MAX_SPLIT_ATTEMPTS` times in total; other errors are final.
fn retry_degenerate<T>(mut attempt: impl FnMut() -> PipelineResult<T>) -> PipelineResult<T> {
    let mut attempt_no = 1;
    loop {
        match attempt() {
            Err(e @ PipelineError::DegenerateSplit { .. }) if attempt_no >= MAX_SPLIT_ATTEMPTS => {
                return Err(e)
            }
            Err(PipelineError::DegenerateSplit { class, side }) => {
                debug!("Attempt {attempt_no}: class {class} absent from {side} set, resplitting");
                attempt_no += 1;
            }
            other => return other,
        }
    }
}

/// Fresh splits from the same generator until one is usable.
fn run_with_retries<R: Rng + ?Sized>(
    frame: &ModelFrame,
    train_fraction: f64,
    rng: &mut R,
) -> PipelineResult<ClassifierRun> {
    retry_degenerate(|| run_once(frame, train_fraction, &mut *rng))
}

/// The reproducible run: the split is drawn from `StdRng` seeded with `seed`.
pub fn headline_run(frame: &ModelFrame, train_fraction: f64, seed: u64) -> PipelineResult<ClassifierRun> {
    let mut rng = StdRng::seed_from_u64(seed);
    run_with_retries(frame, train_fraction, &mut rng)
}

/// Accuracy distribution over repeated unseeded splits.
#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    pub requested: usize,
    pub completed: usize,
    pub skipped: usize,
    pub accuracies: Vec<f64>,
    pub mean: f64,
    pub sd: f64,
    /// One-sample t-interval for the mean accuracy; absent with fewer than
    /// two completed trials.
    pub ci: Option<(f64, f64)>,
}

/// Mean, sample sd and 95% t-interval of `values`.
pub fn summarize_accuracies(requested: usize, accuracies: Vec<f64>) -> PipelineResult<TrialSummary> {
    let k = accuracies.len();
    let mean = if k == 0 {
        f64::NAN
    } else {
        accuracies.iter().sum::<f64>() / k as f64
    };
    let sd = if k > 1 {
        (accuracies.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (k - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    let ci = if k > 1 {
        let half = t_quantile(0.5 + CONFIDENCE_LEVEL / 2.0, (k - 1) as f64)? * sd / (k as f64).sqrt();
        Some((mean - half, mean + half))
    } else {
        None
    };

    Ok(TrialSummary {
        requested,
        completed: k,
        skipped: requested - k,
        accuracies,
        mean,
        sd,
        ci,
    })
}

/// Run `trials` independent split/fit/evaluate cycles, each with a fresh
/// entropy-seeded generator. Degenerate splits are retried, then skipped.
pub fn run_trials(frame: &ModelFrame, train_fraction: f64, trials: usize) -> PipelineResult<TrialSummary> {
    let pb = create_trial_bar(trials as u64);
    collect_trials(trials, &pb, || {
        let mut rng = StdRng::from_entropy();
        retry_degenerate(|| {
            run_once(frame, train_fraction, &mut rng).map(|run| run.evaluation.accuracy)
        })
    })
}

/// Run `trial` `trials` times, recording accuracies and skipping trials
/// that stayed degenerate after every retry.
fn collect_trials(
    trials: usize,
    pb: &ProgressBar,
    mut trial: impl FnMut() -> PipelineResult<f64>,
) -> PipelineResult<TrialSummary> {
    let mut accuracies = Vec::with_capacity(trials);
    for i in 0..trials {
        match trial() {
            Ok(accuracy) => accuracies.push(accuracy),
            Err(PipelineError::DegenerateSplit { class, side }) => {
                warn!("Trial {} skipped: class {class} absent from {side} set", i + 1);
                note_skipped_trial(pb, i + 1 - accuracies.len());
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    summarize_accuracies(trials, accuracies)
}
