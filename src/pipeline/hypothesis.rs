//! Two-group comparison with automatic test selection
//!
//! Both groups are checked for normality with Shapiro-Wilk. If both pass,
//! Levene's test (median centred) picks between the pooled and the Welch
//! t-test; otherwise the Mann-Whitney U test is used.

use std::fmt;

use serde::Serialize;

use super::distribution::{f_upper, normal_cdf, normal_quantile, t_cdf};
use super::error::{PipelineError, PipelineResult};

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Mann-Whitney uses the exact null distribution below this group size
/// when there are no ties.
const EXACT_LIMIT: usize = 50;

/// Direction of the alternative hypothesis, first group relative to second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,
    Greater,
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alternative::TwoSided => write!(f, "two-sided"),
            Alternative::Less => write!(f, "less"),
            Alternative::Greater => write!(f, "greater"),
        }
    }
}

/// Which comparison was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestKind {
    StudentT,
    WelchT,
    MannWhitney,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::StudentT => write!(f, "Two-sample t-test"),
            TestKind::WelchT => write!(f, "Welch two-sample t-test"),
            TestKind::MannWhitney => write!(f, "Mann-Whitney U test"),
        }
    }
}

/// Statistic and p-value of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk W and p-value (Royston 1995, valid for 3 <= n <= 5000).
pub fn shapiro_wilk(sample: &[f64]) -> PipelineResult<TestResult> {
    const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
    const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
    const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
    const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
    const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
    const G: [f64; 2] = [-2.273, 0.459];

    let n = sample.len();
    if !(3..=5000).contains(&n) {
        return Err(PipelineError::InsufficientData(format!(
            "Shapiro-Wilk needs between 3 and 5000 values, got {n}"
        )));
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);
    if x[n - 1] - x[0] <= f64::EPSILON * x[n - 1].abs().max(1.0) {
        return Err(PipelineError::InsufficientData(
            "Shapiro-Wilk is undefined for identical values".to_string(),
        ));
    }

    // Coefficients for the upper half of the order statistics.
    let half = n / 2;
    let an = n as f64;
    let a: Vec<f64> = if n == 3 {
        vec![std::f64::consts::FRAC_1_SQRT_2]
    } else {
        let m: Vec<f64> = (1..=half)
            .map(|i| normal_quantile((i as f64 - 0.375) / (an + 0.25)))
            .collect();
        let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
        let ssumm2 = summ2.sqrt();
        let rsn = 1.0 / an.sqrt();
        let a1 = polynomial(&C1, rsn) - m[0] / ssumm2;

        let mut a: Vec<f64> = m.clone();
        let (first_scaled, fac) = if n > 5 {
            let a2 = -m[1] / ssumm2 + polynomial(&C2, rsn);
            let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
                / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
                .sqrt();
            a[1] = a2;
            (2, fac)
        } else {
            let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
            (1, fac)
        };
        a[0] = a1;
        for value in a.iter_mut().skip(first_scaled) {
            *value = -*value / fac;
        }
        a
    };

    let mut weights = vec![0.0; n];
    for (i, coefficient) in a.iter().enumerate() {
        weights[i] = -coefficient;
        weights[n - 1 - i] = *coefficient;
    }

    // W is the squared correlation of the weights with the ordered sample.
    let mean_w = mean(&weights);
    let mean_x = mean(&x);
    let (mut sax, mut ssa, mut ssx) = (0.0, 0.0, 0.0);
    for (w, v) in weights.iter().zip(&x) {
        let dw = w - mean_w;
        let dx = v - mean_x;
        sax += dw * dx;
        ssa += dw * dw;
        ssx += dx * dx;
    }
    let w = (sax * sax / (ssa * ssx)).min(1.0);

    if n == 3 {
        const SIX_OVER_PI: f64 = 1.90985931710274;
        const PI_OVER_THREE: f64 = 1.04719755119660;
        let p = (SIX_OVER_PI * (w.sqrt().asin() - PI_OVER_THREE)).max(0.0);
        return Ok(TestResult {
            statistic: w,
            p_value: p,
        });
    }

    let mut y = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = polynomial(&G, an);
        if y >= gamma {
            return Ok(TestResult {
                statistic: w,
                p_value: 1e-99,
            });
        }
        y = -(gamma - y).ln();
        (polynomial(&C3, an), polynomial(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (polynomial(&C5, ln_n), polynomial(&C6, ln_n).exp())
    };

    Ok(TestResult {
        statistic: w,
        p_value: 1.0 - normal_cdf((y - m) / s),
    })
}

/// Levene's test for equal variances, centred on the group medians.
pub fn levene(groups: &[&[f64]]) -> PipelineResult<TestResult> {
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || total <= k || groups.iter().any(|g| g.is_empty()) {
        return Err(PipelineError::InsufficientData(
            "Levene's test needs two non-empty groups and more values than groups".to_string(),
        ));
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let centre = median(g);
            g.iter().map(|v| (v - centre).abs()).collect()
        })
        .collect();
    let grand = deviations.iter().flatten().sum::<f64>() / total as f64;

    let mut between = 0.0;
    let mut within = 0.0;
    for d in &deviations {
        let group_mean = mean(d);
        between += d.len() as f64 * (group_mean - grand).powi(2);
        within += d.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df1 = (k - 1) as f64;
    let df2 = (total - k) as f64;
    if within == 0.0 {
        let p_value = if between == 0.0 { 1.0 } else { 0.0 };
        return Ok(TestResult {
            statistic: if between == 0.0 { 0.0 } else { f64::INFINITY },
            p_value,
        });
    }
    let f = (between / df1) / (within / df2);
    Ok(TestResult {
        statistic: f,
        p_value: f_upper(f, df1, df2)?,
    })
}

fn t_p_value(t: f64, df: f64, alternative: Alternative) -> PipelineResult<f64> {
    Ok(match alternative {
        Alternative::TwoSided => (2.0 * t_cdf(-t.abs(), df)?).min(1.0),
        Alternative::Less => t_cdf(t, df)?,
        Alternative::Greater => 1.0 - t_cdf(t, df)?,
    })
}

/// t statistic, degrees of freedom and p-value of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Two-sample t-test; pooled variance when `equal_variance`, Welch otherwise.
pub fn t_test(x: &[f64], y: &[f64], equal_variance: bool, alternative: Alternative) -> PipelineResult<TTest> {
    if x.len() < 2 || y.len() < 2 {
        return Err(PipelineError::InsufficientData(
            "t-test needs at least two values per group".to_string(),
        ));
    }
    let (nx, ny) = (x.len() as f64, y.len() as f64);
    let (vx, vy) = (sample_variance(x), sample_variance(y));
    let diff = mean(x) - mean(y);

    let (t, df) = if equal_variance {
        let df = nx + ny - 2.0;
        let pooled = ((nx - 1.0) * vx + (ny - 1.0) * vy) / df;
        (diff / (pooled * (1.0 / nx + 1.0 / ny)).sqrt(), df)
    } else {
        let (sx, sy) = (vx / nx, vy / ny);
        let se2 = sx + sy;
        let df = se2 * se2 / (sx * sx / (nx - 1.0) + sy * sy / (ny - 1.0));
        (diff / se2.sqrt(), df)
    };

    Ok(TTest {
        t,
        df,
        p_value: t_p_value(t, df, alternative)?,
    })
}

/// Average ranks (1-based) of `values`, ties sharing the mean rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            ranks[i] = rank;
        }
        start = end + 1;
    }
    ranks
}

/// Sizes of every tie group.
fn tie_sizes(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut sizes = Vec::new();
    let mut run = 1;
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
        } else {
            sizes.push(run);
            run = 1;
        }
    }
    sizes.push(run);
    sizes
}

/// Exact null distribution of U for group sizes `m` and `n`, as P(U <= q).
struct ExactU {
    cumulative: Vec<f64>,
}

impl ExactU {
    fn new(m: usize, n: usize) -> Self {
        let total = m + n;
        let max_sum: usize = (n + 1..=total).sum();
        // ways[j][s]: subsets of size j from the ranks seen so far summing to s.
        let mut ways = vec![vec![0.0f64; max_sum + 1]; m + 1];
        ways[0][0] = 1.0;
        for rank in 1..=total {
            for j in (1..=m.min(rank)).rev() {
                for s in (rank..=max_sum).rev() {
                    ways[j][s] += ways[j - 1][s - rank];
                }
            }
        }

        let offset = m * (m + 1) / 2;
        let counts = &ways[m][offset..];
        let all: f64 = counts.iter().sum();
        let mut running = 0.0;
        let cumulative = counts
            .iter()
            .map(|c| {
                running += c;
                running / all
            })
            .collect();
        ExactU { cumulative }
    }

    fn at_most(&self, q: f64) -> f64 {
        if q < 0.0 {
            return 0.0;
        }
        let idx = q.floor() as usize;
        self.cumulative.get(idx).copied().unwrap_or(1.0)
    }

    fn at_least(&self, q: f64) -> f64 {
        1.0 - self.at_most(q - 1.0)
    }
}

/// Mann-Whitney U (Wilcoxon rank-sum) test. The statistic is the U of `x`.
pub fn mann_whitney(x: &[f64], y: &[f64], alternative: Alternative) -> PipelineResult<TestResult> {
    if x.is_empty() || y.is_empty() {
        return Err(PipelineError::InsufficientData(
            "Mann-Whitney test needs values in both groups".to_string(),
        ));
    }
    let (m, n) = (x.len(), y.len());
    let combined: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranks = average_ranks(&combined);
    let u = ranks[..m].iter().sum::<f64>() - (m * (m + 1)) as f64 / 2.0;

    let ties = tie_sizes(&combined);
    let has_ties = ties.iter().any(|&t| t > 1);
    let (mf, nf) = (m as f64, n as f64);

    if m < EXACT_LIMIT && n < EXACT_LIMIT && !has_ties {
        let dist = ExactU::new(m, n);
        let p_value = match alternative {
            Alternative::TwoSided => {
                let one_tail = if u > mf * nf / 2.0 {
                    dist.at_least(u)
                } else {
                    dist.at_most(u)
                };
                (2.0 * one_tail).min(1.0)
            }
            Alternative::Less => dist.at_most(u),
            Alternative::Greater => dist.at_least(u),
        };
        return Ok(TestResult {
            statistic: u,
            p_value,
        });
    }

    let centred = u - mf * nf / 2.0;
    let tie_term: f64 = ties
        .iter()
        .map(|&t| (t * t * t - t) as f64)
        .sum::<f64>()
        / ((mf + nf) * (mf + nf - 1.0));
    let sigma = (mf * nf / 12.0 * ((mf + nf + 1.0) - tie_term)).sqrt();
    if sigma == 0.0 {
        return Ok(TestResult {
            statistic: u,
            p_value: 1.0,
        });
    }

    let correction = match alternative {
        Alternative::TwoSided if centred > 0.0 => 0.5,
        Alternative::TwoSided if centred < 0.0 => -0.5,
        Alternative::TwoSided => 0.0,
        Alternative::Greater => 0.5,
        Alternative::Less => -0.5,
    };
    let z = (centred - correction) / sigma;
    let p_value = match alternative {
        Alternative::TwoSided => (2.0 * normal_cdf(z).min(1.0 - normal_cdf(z))).min(1.0),
        Alternative::Greater => 1.0 - normal_cdf(z),
        Alternative::Less => normal_cdf(z),
    };

    Ok(TestResult {
        statistic: u,
        p_value,
    })
}

/// Normality p-value, or `None` when the group cannot be tested.
fn normality(sample: &[f64]) -> Option<f64> {
    shapiro_wilk(sample).ok().map(|r| r.p_value)
}

/// Outcome of `compare_groups`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupComparison {
    pub groups: (String, String),
    pub sizes: (usize, usize),
    pub normality_p: (Option<f64>, Option<f64>),
    pub levene_p: Option<f64>,
    pub test: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    pub alternative: Alternative,
    pub alpha: f64,
    pub significant: bool,
    pub verdict: String,
}

fn verdict(
    test: TestKind,
    first: &str,
    second: &str,
    alternative: Alternative,
    significant: bool,
    p_value: f64,
) -> String {
    let finding = match (alternative, significant) {
        (Alternative::TwoSided, true) => format!("{first} and {second} differ significantly"),
        (Alternative::TwoSided, false) => {
            format!("{first} and {second} do not differ significantly")
        }
        (Alternative::Less, true) => format!("{first} is significantly less than {second}"),
        (Alternative::Less, false) => {
            format!("{first} is not significantly less than {second}")
        }
        (Alternative::Greater, true) => {
            format!("{first} is significantly greater than {second}")
        }
        (Alternative::Greater, false) => {
            format!("{first} is not significantly greater than {second}")
        }
    };
    format!("{test}: {finding} ({alternative}, p = {p_value:.4})")
}

/// Compare `values` split by `labels` (exactly two distinct labels, the
/// first one encountered is the first group).
pub fn compare_groups<L>(
    values: &[f64],
    labels: &[L],
    alternative: Alternative,
    alpha: f64,
) -> PipelineResult<GroupComparison>
where
    L: PartialEq + fmt::Display,
{
    let mut distinct: Vec<&L> = Vec::new();
    for label in labels {
        if !distinct.contains(&label) {
            distinct.push(label);
        }
    }
    if distinct.len() != 2 {
        return Err(PipelineError::GroupCount(distinct.len()));
    }

    let split = |wanted: &L| -> Vec<f64> {
        values
            .iter()
            .zip(labels)
            .filter(|(_, l)| *l == wanted)
            .map(|(v, _)| *v)
            .collect()
    };
    let x = split(distinct[0]);
    let y = split(distinct[1]);

    let normality_p = (normality(&x), normality(&y));
    let both_normal = matches!(normality_p, (Some(px), Some(py)) if px >= alpha && py >= alpha);

    let (test, statistic, p_value, levene_p) = if both_normal {
        let equal = levene(&[&x[..], &y[..]])?;
        let equal_variance = equal.p_value >= alpha;
        let result = t_test(&x, &y, equal_variance, alternative)?;
        let kind = if equal_variance {
            TestKind::StudentT
        } else {
            TestKind::WelchT
        };
        (kind, result.t, result.p_value, Some(equal.p_value))
    } else {
        let result = mann_whitney(&x, &y, alternative)?;
        (TestKind::MannWhitney, result.statistic, result.p_value, None)
    };

    let first = distinct[0].to_string();
    let second = distinct[1].to_string();
    let significant = p_value < alpha;

    Ok(GroupComparison {
        verdict: verdict(test, &first, &second, alternative, significant, p_value),
        groups: (first, second),
        sizes: (x.len(), y.len()),
        normality_p,
        levene_p,
        test,
        statistic,
        p_value,
        alternative,
        alpha,
        significant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_shapiro_wilk_reference_values() {
        // shapiro.test(1:10): W = 0.97016, p-value = 0.8924
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let r = shapiro_wilk(&x).unwrap();
        assert!(close(r.statistic, 0.970165, 1e-5));
        assert!(close(r.p_value, 0.892367, 1e-4));

        // shapiro.test(c(1, 2, 4)): W = 0.96429, p-value = 0.6369
        let r = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
        assert!(close(r.statistic, 0.964286, 1e-5));
        assert!(close(r.p_value, 0.636887, 1e-4));
    }

    #[test]
    fn test_shapiro_wilk_detects_skew() {
        let x = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 10.0, 20.0, 50.0];
        let r = shapiro_wilk(&x).unwrap();
        assert!(close(r.statistic, 0.536619, 1e-4));
        assert!(r.p_value < 1e-3);
    }

    #[test]
    fn test_shapiro_wilk_rejects_bad_input() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_err());
        assert!(shapiro_wilk(&[3.0, 3.0, 3.0, 3.0]).is_err());
    }

    #[test]
    fn test_pooled_and_welch_t() {
        let x = [5.1, 4.9, 5.6, 5.8, 6.0, 5.3];
        let y = [6.2, 6.8, 5.9, 7.1, 6.5, 6.6];
        let pooled = t_test(&x, &y, true, Alternative::TwoSided).unwrap();
        assert!(close(pooled.t, -4.350622, 1e-5));
        assert_eq!(pooled.df, 10.0);
        let less = t_test(&x, &y, true, Alternative::Less).unwrap();
        assert!(close(less.p_value, pooled.p_value / 2.0, 1e-12));
        let greater = t_test(&x, &y, true, Alternative::Greater).unwrap();
        assert!(close(greater.p_value, 1.0 - less.p_value, 1e-12));

        let y = [6.2, 6.8, 5.9, 7.1, 6.5, 6.6, 9.0, 3.0];
        let welch = t_test(&x, &y, false, Alternative::TwoSided).unwrap();
        assert!(close(welch.t, -1.531682, 1e-5));
        assert!(close(welch.df, 8.178025, 1e-5));
    }

    #[test]
    fn test_levene_statistic() {
        let x = [5.1, 4.9, 5.6, 5.8, 6.0, 5.3];
        let y = [6.2, 6.8, 5.9, 7.1, 6.5, 6.6, 9.0, 3.0];
        let r = levene(&[&x[..], &y[..]]).unwrap();
        assert!(close(r.statistic, 1.407616, 1e-5));
        assert!(r.p_value > 0.05);
    }

    #[test]
    fn test_mann_whitney_exact() {
        let x = [1.1, 2.2, 3.3, 4.4];
        let y = [5.5, 6.6, 7.7];
        let r = mann_whitney(&x, &y, Alternative::TwoSided).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!(close(r.p_value, 2.0 / 35.0, 1e-12));
        let less = mann_whitney(&x, &y, Alternative::Less).unwrap();
        assert!(close(less.p_value, 1.0 / 35.0, 1e-12));
        let greater = mann_whitney(&x, &y, Alternative::Greater).unwrap();
        assert!(close(greater.p_value, 1.0, 1e-12));
    }

    #[test]
    fn test_mann_whitney_with_ties_uses_normal_approximation() {
        let x = [1.0, 2.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 4.0, 5.0, 5.0, 6.0, 7.0, 8.0];
        let r = mann_whitney(&x, &y, Alternative::TwoSided).unwrap();
        assert_eq!(r.statistic, 5.0);
        assert!(close(r.p_value, 0.025359, 1e-5));
        let less = mann_whitney(&x, &y, Alternative::Less).unwrap();
        assert!(close(less.p_value, 0.012680, 1e-5));
    }

    #[test]
    fn test_compare_groups_requires_two_labels() {
        let result = compare_groups(&[1.0, 2.0, 3.0], &["a", "b", "c"], Alternative::TwoSided, 0.05);
        assert!(matches!(result, Err(PipelineError::GroupCount(3))));
        let result = compare_groups(&[1.0, 2.0], &["a", "a"], Alternative::TwoSided, 0.05);
        assert!(matches!(result, Err(PipelineError::GroupCount(1))));
    }

    #[test]
    fn test_compare_groups_normal_data_uses_t_test() {
        let values = [5.1, 4.9, 5.6, 5.8, 6.0, 5.3, 6.2, 6.8, 5.9, 7.1, 6.5, 6.6];
        let labels = ["DEM", "DEM", "DEM", "DEM", "DEM", "DEM", "REP", "REP", "REP", "REP", "REP", "REP"];
        let result = compare_groups(&values, &labels, Alternative::Less, 0.05).unwrap();
        assert_eq!(result.test, TestKind::StudentT);
        assert!(result.significant);
        assert_eq!(result.groups, ("DEM".to_string(), "REP".to_string()));
        assert!(result
            .verdict
            .starts_with("Two-sample t-test: DEM is significantly less than REP"));
    }

    #[test]
    fn test_compare_groups_skewed_data_uses_mann_whitney() {
        let values = [
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 10.0, 20.0, 50.0, 3.0, 4.0, 5.0, 6.0,
        ];
        let labels: Vec<&str> = (0..16).map(|i| if i < 12 { "x" } else { "y" }).collect();
        let result = compare_groups(&values, &labels, Alternative::TwoSided, 0.05).unwrap();
        assert_eq!(result.test, TestKind::MannWhitney);
        assert!(result.levene_p.is_none());
        assert!(result.verdict.contains("two-sided"));
    }
}
