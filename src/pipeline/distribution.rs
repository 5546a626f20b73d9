//! Thin wrappers over statrs distributions used for p-values and intervals

use statrs::distribution::{
    Beta, Binomial, ContinuousCDF, DiscreteCDF, FisherSnedecor, Normal, StudentsT,
};

use super::error::{PipelineError, PipelineResult};

fn distribution_error(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Distribution(e.to_string())
}

fn student_t(df: f64) -> PipelineResult<StudentsT> {
    StudentsT::new(0.0, 1.0, df).map_err(distribution_error)
}

fn standard_normal() -> Normal {
    Normal::standard()
}

/// Lower tail probability of Student's t.
pub fn t_cdf(t: f64, df: f64) -> PipelineResult<f64> {
    Ok(student_t(df)?.cdf(t))
}

/// Two-sided p-value of a t statistic.
pub fn t_two_sided(t: f64, df: f64) -> PipelineResult<f64> {
    let lower = t_cdf(-t.abs(), df)?;
    Ok((2.0 * lower).min(1.0))
}

/// Quantile of Student's t.
pub fn t_quantile(p: f64, df: f64) -> PipelineResult<f64> {
    Ok(student_t(df)?.inverse_cdf(p))
}

/// Upper tail probability of the F distribution.
pub fn f_upper(f: f64, df1: f64, df2: f64) -> PipelineResult<f64> {
    let dist = FisherSnedecor::new(df1, df2).map_err(distribution_error)?;
    Ok((1.0 - dist.cdf(f)).clamp(0.0, 1.0))
}

pub fn normal_cdf(z: f64) -> f64 {
    standard_normal().cdf(z)
}

pub fn normal_quantile(p: f64) -> f64 {
    standard_normal().inverse_cdf(p)
}

/// Quantile of Beta(a, b).
pub fn beta_quantile(p: f64, a: f64, b: f64) -> PipelineResult<f64> {
    let dist = Beta::new(a, b).map_err(distribution_error)?;
    Ok(dist.inverse_cdf(p))
}

/// P(X >= k) for X ~ Binomial(n, p).
pub fn binomial_at_least(k: u64, n: u64, p: f64) -> PipelineResult<f64> {
    if k == 0 {
        return Ok(1.0);
    }
    let dist = Binomial::new(p, n).map_err(distribution_error)?;
    Ok((1.0 - dist.cdf(k - 1)).clamp(0.0, 1.0))
}

/// Exact (Clopper–Pearson) confidence interval for a binomial proportion.
pub fn clopper_pearson(successes: u64, trials: u64, level: f64) -> PipelineResult<(f64, f64)> {
    let alpha = 1.0 - level;
    let x = successes as f64;
    let n = trials as f64;

    let lower = if successes == 0 {
        0.0
    } else {
        beta_quantile(alpha / 2.0, x, n - x + 1.0)?
    };
    let upper = if successes >= trials {
        1.0
    } else {
        beta_quantile(1.0 - alpha / 2.0, x + 1.0, n - x)?
    };
    Ok((lower, upper))
}
