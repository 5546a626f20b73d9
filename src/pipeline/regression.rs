//! Ordinary least squares with variance-inflation pruning
//!
//! The pruning loop drops the predictor with the highest VIF, one at a time,
//! until every remaining VIF is at or below the threshold. Ties go to the
//! predictor that comes first in column order. The removal sequence depends
//! only on the predictors, so the model itself is fit once at the end.

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use super::distribution::{f_upper, t_two_sided};
use super::error::{PipelineError, PipelineResult};
use super::linalg::{
    column_vector, correlation_matrix, standardize, sweep_all, vif_by_cholesky,
    vif_from_correlation,
};
use super::merge::ModelFrame;

/// Default VIF above which a predictor is removed.
pub const DEFAULT_VIF_THRESHOLD: f64 = 10.0;

/// Name used for the intercept term.
pub const INTERCEPT: &str = "(Intercept)";

/// One estimated coefficient.
#[derive(Debug, Clone, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

/// One removal performed by the pruning loop.
#[derive(Debug, Clone, Serialize)]
pub struct VifStep {
    pub removed: String,
    pub vif: f64,
    pub remaining: usize,
}

/// Terminal state of the pruning loop.
#[derive(Debug, Clone, Serialize)]
pub struct PruneOutcome {
    pub kept: Vec<String>,
    pub history: Vec<VifStep>,
    /// VIF of every kept predictor, aligned with `kept`.
    pub final_vif: Vec<f64>,
}

/// A fitted OLS model with intercept.
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub f_statistic: f64,
    pub df_num: usize,
    pub df_den: usize,
    pub f_p_value: f64,
    pub n_obs: usize,
    #[serde(skip)]
    pub fitted: Vec<f64>,
}

impl OlsFit {
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

/// Pruned linear model of net votes on income predictors.
#[derive(Debug, Clone, Serialize)]
pub struct LinearModel {
    pub response: String,
    pub candidates: Vec<String>,
    pub pruning: PruneOutcome,
    pub fit: OlsFit,
    /// Share of rows where predicted and actual margins have the same sign.
    pub directional_accuracy: f64,
}

/// VIF of every predictor of the frame, in column order.
pub fn variance_inflation_factors(frame: &ModelFrame) -> Vec<f64> {
    let r = correlation_matrix(&frame.x);
    if let Some(vif) = vif_by_cholesky(&r) {
        return vif;
    }
    (0..r.nrows())
        .into_par_iter()
        .map(|j| vif_from_correlation(&r, j))
        .collect()
}

/// Position of the largest value; the first one wins ties.
fn first_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) if *v > values[b] => best = Some(i),
            Some(_) => {}
        }
    }
    best
}

/// Remove the highest-VIF predictor until all VIFs are at most `threshold`.
pub fn prune_collinear(frame: &ModelFrame, threshold: f64) -> PipelineResult<PruneOutcome> {
    if frame.predictors.is_empty() {
        return Err(PipelineError::InsufficientData(
            "no candidate predictors".to_string(),
        ));
    }

    let mut current = frame.clone();
    let mut history = Vec::new();

    loop {
        let vif = variance_inflation_factors(&current);
        let Some(worst) = first_max(&vif) else {
            break;
        };
        if vif[worst] <= threshold || current.predictors.len() < 2 {
            return Ok(PruneOutcome {
                kept: current.predictors.clone(),
                history,
                final_vif: vif,
            });
        }

        let removed = current.predictors[worst].clone();
        debug!("VIF pruning: removing {} (VIF {:.2})", removed, vif[worst]);

        let keep: Vec<String> = current
            .predictors
            .iter()
            .filter(|p| **p != removed)
            .cloned()
            .collect();
        current = current.select(&keep)?;
        history.push(VifStep {
            removed,
            vif: vif[worst],
            remaining: keep.len(),
        });
    }

    Ok(PruneOutcome {
        kept: current.predictors.clone(),
        history,
        final_vif: Vec::new(),
    })
}

/// Fit `net_votes ~ predictors` by least squares.
pub fn fit_ols(frame: &ModelFrame) -> PipelineResult<OlsFit> {
    let n = frame.nrows();
    let p = frame.predictors.len();
    if n < p + 2 {
        return Err(PipelineError::InsufficientData(format!(
            "{} observations for {} predictors",
            n, p
        )));
    }

    let y = &frame.net_votes;
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
    let tss: f64 = y_centered.iter().map(|v| v * v).sum();

    let std = standardize(&frame.x);
    let yc = column_vector(&y_centered);

    // Augmented cross-product matrix [Z'Z Z'y; y'Z y'y]
    let ztz = std.z.transpose() * &std.z;
    let zty = std.z.transpose() * &yc;
    let mut a = faer::Mat::<f64>::zeros(p + 1, p + 1);
    for i in 0..p {
        for j in 0..p {
            a[(i, j)] = ztz[(i, j)];
        }
        a[(i, p)] = zty[(i, 0)];
        a[(p, i)] = zty[(i, 0)];
    }
    a[(p, p)] = tss;

    let pivots: Vec<usize> = (0..p).collect();
    if let Some(&k) = sweep_all(&mut a, &pivots).first() {
        return Err(PipelineError::SingularDesign {
            predictor: frame.predictors[k].clone(),
        });
    }

    let rss = a[(p, p)].max(0.0);
    let df_den = n - p - 1;
    let sigma2 = rss / df_den as f64;

    // Back-transform from the standardized scale: beta_j = gamma_j / sd_j.
    let betas: Vec<f64> = (0..p).map(|j| a[(j, p)] / std.sds[j]).collect();
    let intercept = y_mean
        - betas
            .iter()
            .zip(&std.means)
            .map(|(b, m)| b * m)
            .sum::<f64>();

    // Cov(gamma) = sigma² (Z'Z)^-1 = -sigma² * swept block
    let scaled_mean: Vec<f64> = (0..p).map(|j| std.means[j] / std.sds[j]).collect();
    let mut intercept_var = sigma2 / n as f64;
    for j in 0..p {
        for k in 0..p {
            intercept_var += scaled_mean[j] * (-sigma2 * a[(j, k)]) * scaled_mean[k];
        }
    }

    let mut coefficients = Vec::with_capacity(p + 1);
    coefficients.push(coefficient(
        INTERCEPT,
        intercept,
        intercept_var.max(0.0).sqrt(),
        df_den,
    )?);
    for j in 0..p {
        let se = (-sigma2 * a[(j, j)]).max(0.0).sqrt() / std.sds[j];
        coefficients.push(coefficient(&frame.predictors[j], betas[j], se, df_den)?);
    }

    let fitted: Vec<f64> = (0..n)
        .map(|i| {
            intercept
                + (0..p)
                    .map(|j| betas[j] * frame.x[(i, j)])
                    .sum::<f64>()
        })
        .collect();

    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 0.0 };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_den as f64;
    let f_statistic = if p > 0 && rss > 0.0 {
        ((tss - rss) / p as f64) / sigma2
    } else {
        f64::NAN
    };
    let f_p_value = if f_statistic.is_finite() {
        f_upper(f_statistic, p as f64, df_den as f64)?
    } else {
        f64::NAN
    };

    Ok(OlsFit {
        coefficients,
        r_squared,
        adj_r_squared,
        residual_std_error: sigma2.sqrt(),
        f_statistic,
        df_num: p,
        df_den,
        f_p_value,
        n_obs: n,
        fitted,
    })
}

fn coefficient(name: &str, estimate: f64, std_error: f64, df: usize) -> PipelineResult<Coefficient> {
    let t_value = estimate / std_error;
    let p_value = if t_value.is_finite() {
        t_two_sided(t_value, df as f64)?
    } else {
        f64::NAN
    };
    Ok(Coefficient {
        name: name.to_string(),
        estimate,
        std_error,
        t_value,
        p_value,
    })
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Share of positions where `predicted` and `actual` have the same sign.
pub fn directional_accuracy(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    let hits = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| sign(**p) == sign(**a))
        .count();
    hits as f64 / actual.len() as f64
}

/// Prune by VIF, then fit the reduced model and score it on its own rows.
pub fn fit_pruned_model(frame: &ModelFrame, threshold: f64) -> PipelineResult<LinearModel> {
    let pruning = prune_collinear(frame, threshold)?;
    let reduced = frame.select(&pruning.kept)?;
    let fit = fit_ols(&reduced)?;
    let directional_accuracy = directional_accuracy(&fit.fitted, &reduced.net_votes);

    Ok(LinearModel {
        response: "net_votes".to_string(),
        candidates: frame.predictors.clone(),
        pruning,
        fit,
        directional_accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::election::Winner;
    use crate::pipeline::key::StateYear;
    use faer::Mat;

    fn frame(columns: &[(&str, Vec<f64>)], y: Vec<f64>) -> ModelFrame {
        let n = y.len();
        let mut x = Mat::<f64>::zeros(n, columns.len());
        for (j, (_, values)) in columns.iter().enumerate() {
            for (i, v) in values.iter().enumerate() {
                x[(i, j)] = *v;
            }
        }
        ModelFrame {
            keys: (0..n).map(|i| StateYear::new(2000 + i as i32, "XX")).collect(),
            predictors: columns.iter().map(|(n, _)| n.to_string()).collect(),
            x,
            winners: y
                .iter()
                .map(|v| if *v > 0.0 { Winner::Rep } else { Winner::Dem })
                .collect(),
            net_votes: y,
        }
    }

    #[test]
    fn test_exact_linear_fit() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x2 = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(&x2)
            .map(|(a, b)| 3.0 + 2.0 * a - 0.5 * b)
            .collect();
        let fit = fit_ols(&frame(&[("x1", x1), ("x2", x2)], y)).unwrap();

        assert!((fit.coefficient(INTERCEPT).unwrap().estimate - 3.0).abs() < 1e-8);
        assert!((fit.coefficient("x1").unwrap().estimate - 2.0).abs() < 1e-8);
        assert!((fit.coefficient("x2").unwrap().estimate + 0.5).abs() < 1e-8);
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_simple_regression_matches_textbook() {
        // lm(y ~ x): intercept 2.2, slope 0.6, R² 0.6
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = fit_ols(&frame(&[("x", x)], y)).unwrap();

        assert!((fit.coefficient(INTERCEPT).unwrap().estimate - 2.2).abs() < 1e-10);
        let slope = fit.coefficient("x").unwrap();
        assert!((slope.estimate - 0.6).abs() < 1e-10);
        // se(slope) = sqrt(2.4 / 3 / 10)
        assert!((slope.std_error - (0.08f64).sqrt()).abs() < 1e-10);
        assert!((fit.r_squared - 0.6).abs() < 1e-10);
        assert_eq!(fit.df_num, 1);
        assert_eq!(fit.df_den, 3);
        assert!((fit.f_statistic - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_singular_design_is_reported() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let x2: Vec<f64> = x1.iter().map(|v| v * 3.0).collect();
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        let result = fit_ols(&frame(&[("x1", x1), ("x2", x2)], y));
        assert!(matches!(result, Err(PipelineError::SingularDesign { .. })));
    }

    #[test]
    fn test_prune_removes_collinear_first_in_order() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b: Vec<f64> = a.iter().map(|v| v * 2.0).collect();
        let c = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let y = vec![1.0, -2.0, 3.0, -1.0, 2.0, 4.0, -3.0, 1.0];

        let outcome = prune_collinear(&frame(&[("a", a), ("b", b), ("c", c)], y), 10.0).unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.history[0].removed, "a");
        assert_eq!(outcome.kept, vec!["b".to_string(), "c".to_string()]);
        assert!(outcome.final_vif.iter().all(|v| *v <= 10.0));
    }

    #[test]
    fn test_first_max_prefers_earliest() {
        assert_eq!(first_max(&[1.0, 5.0, 5.0]), Some(1));
        assert_eq!(first_max(&[f64::INFINITY, f64::INFINITY]), Some(0));
        assert_eq!(first_max(&[]), None);
    }

    #[test]
    fn test_directional_accuracy() {
        let predicted = [1.0, -2.0, 3.0, -4.0];
        let actual = [2.0, -1.0, -3.0, -4.0];
        assert!((directional_accuracy(&predicted, &actual) - 0.75).abs() < 1e-12);

        let neg_p: Vec<f64> = predicted.iter().map(|v| -v).collect();
        let neg_a: Vec<f64> = actual.iter().map(|v| -v).collect();
        assert_eq!(
            directional_accuracy(&predicted, &actual),
            directional_accuracy(&neg_p, &neg_a)
        );
    }
}
