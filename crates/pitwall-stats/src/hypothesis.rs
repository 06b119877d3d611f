//! Two-sided hypothesis tests.
//!
//! Every test returns `None` when a sample is too small to compute the
//! statistic. A `NaN` in the input propagates to a `NaN` statistic and
//! p-value instead of being silently dropped; callers filter beforehand when
//! that is what they want.
//!
//! The rank tests use the normal approximation with tie correction for every
//! sample size. Tail probabilities come from `statrs`.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Outcome of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    const NAN: Self = Self {
        statistic: f64::NAN,
        p_value: f64::NAN,
    };

    /// Whether the null hypothesis is rejected at `alpha`.
    ///
    /// A `NaN` p-value is never significant.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Variance assumption of [`ttest_ind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqualVariance {
    /// Student's t-test with pooled variance.
    #[default]
    Assumed,
    /// Welch's t-test.
    NotAssumed,
}

/// Independent two-sample t-test.
///
/// Returns `None` if either sample has fewer than two observations.
///
/// # Examples
///
/// ```
/// use pitwall_stats::hypothesis::{EqualVariance, ttest_ind};
///
/// let result = ttest_ind(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0], EqualVariance::Assumed)
///     .unwrap();
/// assert!((result.statistic + 1.897_366_596).abs() < 1e-9);
/// assert!((result.p_value - 0.094_349_772).abs() < 1e-9);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn ttest_ind(a: &[f64], b: &[f64], equal_variance: EqualVariance) -> Option<TestResult> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, v1) = mean_variance(a);
    let (m2, v2) = mean_variance(b);

    let (se, df) = match equal_variance {
        EqualVariance::Assumed => {
            let df = n1 + n2 - 2.0;
            let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        EqualVariance::NotAssumed => {
            let q1 = v1 / n1;
            let q2 = v2 / n2;
            let df = (q1 + q2).powi(2) / (q1 * q1 / (n1 - 1.0) + q2 * q2 / (n2 - 1.0));
            ((q1 + q2).sqrt(), df)
        }
    };
    let statistic = (m1 - m2) / se;
    let p_value = two_sided_t(statistic, df);
    Some(TestResult { statistic, p_value })
}

/// Mann-Whitney U test (two-sided, continuity corrected).
///
/// The statistic is `U` of the first sample. Returns `None` if either sample
/// is empty.
///
/// # Examples
///
/// ```
/// use pitwall_stats::hypothesis::mann_whitney_u;
///
/// let result = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert!((result.p_value - 0.080_855_598).abs() < 1e-9);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Option<TestResult> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a.iter().chain(b).any(|v| v.is_nan()) {
        return Some(TestResult::NAN);
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let n = n1 + n2;
    let pooled = a.iter().chain(b).copied().collect::<Vec<_>>();
    let (ranks, tie_term) = average_ranks(&pooled);

    let r1 = ranks[..a.len()].iter().sum::<f64>();
    let u1 = r1 - n1 * (n1 + 1.0) / 2.0;
    let u = u1.max(n1 * n2 - u1);

    let mu = n1 * n2 / 2.0;
    let sigma = (n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
    let p_value = if sigma > 0.0 {
        two_sided_normal((u - mu - 0.5) / sigma)
    } else {
        // every observation tied
        1.0
    };
    Some(TestResult {
        statistic: u1,
        p_value,
    })
}

/// One-sample Wilcoxon signed-rank test of `diffs` against zero.
///
/// Zero differences are dropped. The statistic is the smaller of the positive
/// and negative rank sums. Returns `None` if no non-zero difference remains.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn wilcoxon_signed_rank(diffs: &[f64]) -> Option<TestResult> {
    if diffs.iter().any(|d| d.is_nan()) {
        return Some(TestResult::NAN);
    }
    let diffs = diffs.iter().copied().filter(|&d| d != 0.0).collect::<Vec<_>>();
    if diffs.is_empty() {
        return None;
    }
    let n = diffs.len() as f64;
    let magnitudes = diffs.iter().map(|d| d.abs()).collect::<Vec<_>>();
    let (ranks, tie_term) = average_ranks(&magnitudes);

    let (r_plus, r_minus) = diffs
        .iter()
        .zip(&ranks)
        .fold((0.0, 0.0), |(plus, minus), (d, r)| {
            if *d > 0.0 {
                (plus + r, minus)
            } else {
                (plus, minus + r)
            }
        });
    let statistic = f64::min(r_plus, r_minus);

    let mean = n * (n + 1.0) / 4.0;
    let se = (n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0).sqrt();
    let p_value = two_sided_normal(((statistic - mean) / se).abs());
    Some(TestResult { statistic, p_value })
}

/// Two-sided p-value of `t` under Student's t with `df` degrees of freedom.
fn two_sided_t(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

/// `2 P(Z > z)` for a standard normal `Z`, capped at 1.
fn two_sided_normal(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    match Normal::new(0.0, 1.0) {
        Ok(dist) => (2.0 * dist.sf(z)).min(1.0),
        Err(_) => f64::NAN,
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance)
}

/// 1-based average ranks and the tie term `Σ (t³ − t)` over tie groups.
#[expect(clippy::cast_precision_loss)]
fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_term = 0.0;
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
        let t = (end - start + 1) as f64;
        tie_term += t.powi(3) - t;
        start = end + 1;
    }
    (ranks, tie_term)
}
