//! Correlation-based feature reduction

use faer::Mat;
use serde::Serialize;

use super::linalg::correlation_matrix;
use super::merge::ModelFrame;

/// Default absolute correlation above which one feature of a pair is dropped.
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.7;

/// Represents a correlated pair of features
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// Outcome of the correlation filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationFilter {
    pub threshold: f64,
    pub pairs: Vec<CorrelatedPair>,
    pub dropped: Vec<String>,
}

/// Extract correlated pairs from correlation matrix
fn extract_correlated_pairs_from_matrix(
    corr_matrix: &Mat<f64>,
    col_names: &[String],
    threshold: f64,
) -> Vec<CorrelatedPair> {
    let n = corr_matrix.nrows();
    let mut pairs = Vec::new();

    // Extract upper triangle
    for i in 0..n {
        for j in (i + 1)..n {
            let corr = corr_matrix[(i, j)];
            if corr.abs() > threshold && !corr.is_nan() {
                pairs.push(CorrelatedPair {
                    feature1: col_names[i].clone(),
                    feature2: col_names[j].clone(),
                    correlation: corr,
                });
            }
        }
    }

    // Sort by absolute correlation descending
    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    pairs
}

/// Find predictor pairs whose absolute Pearson correlation exceeds `threshold`
pub fn find_correlated_pairs(frame: &ModelFrame, threshold: f64) -> Vec<CorrelatedPair> {
    if frame.predictors.len() < 2 {
        return Vec::new();
    }
    let corr = correlation_matrix(&frame.x);
    extract_correlated_pairs_from_matrix(&corr, &frame.predictors, threshold)
}

/// Mean absolute correlation of `i` with every other live column
fn mean_abs_correlation(corr: &Mat<f64>, i: usize, live: &[bool]) -> f64 {
    let (sum, count) = (0..corr.ncols())
        .filter(|&k| k != i && live[k])
        .map(|k| corr[(i, k)].abs())
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Determine which features to drop so that no remaining pair exceeds
/// `threshold`.
///
/// Strategy: visit columns from highest to lowest mean absolute correlation;
/// for every pair above the threshold drop the member whose mean absolute
/// correlation with the remaining columns is larger (the second one on ties).
pub fn select_features_to_drop(corr: &Mat<f64>, col_names: &[String], threshold: f64) -> Vec<String> {
    let p = corr.nrows();
    if p < 2 {
        return Vec::new();
    }

    let all = vec![true; p];
    let mut order: Vec<usize> = (0..p).collect();
    let initial_means: Vec<f64> = (0..p).map(|i| mean_abs_correlation(corr, i, &all)).collect();
    order.sort_by(|a, b| {
        initial_means[*b]
            .partial_cmp(&initial_means[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut live = vec![true; p];
    let mut to_drop = Vec::new();

    for (pos, &i) in order.iter().enumerate() {
        for &j in &order[pos + 1..] {
            if !live[i] {
                break;
            }
            if !live[j] {
                continue;
            }
            let r = corr[(i, j)].abs();
            if r.is_nan() || r <= threshold {
                continue;
            }

            let mean_i = mean_abs_correlation(corr, i, &live);
            let mean_j = mean_abs_correlation(corr, j, &live);
            let drop = if mean_i > mean_j { i } else { j };
            live[drop] = false;
            to_drop.push(col_names[drop].clone());
        }
    }

    to_drop
}

/// Run the full correlation filter on a frame's predictors
pub fn correlation_filter(frame: &ModelFrame, threshold: f64) -> CorrelationFilter {
    if frame.predictors.len() < 2 {
        return CorrelationFilter {
            threshold,
            ..Default::default()
        };
    }

    let corr = correlation_matrix(&frame.x);
    CorrelationFilter {
        threshold,
        pairs: extract_correlated_pairs_from_matrix(&corr, &frame.predictors, threshold),
        dropped: select_features_to_drop(&corr, &frame.predictors, threshold),
    }
}
