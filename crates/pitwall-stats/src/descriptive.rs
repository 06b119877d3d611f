use serde::Serialize;

/// Descriptive statistics summarizing a sample.
///
/// Variance and standard deviation use the sample (n − 1) denominator, so a
/// single observation yields `NaN` for both instead of a misleading zero.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    /// Number of observations.
    pub count: usize,
    /// The minimum value in the sample.
    pub min: f64,
    /// The maximum value in the sample.
    pub max: f64,
    /// The arithmetic mean of the sample.
    pub mean: f64,
    /// The median (mean of the two middle values for even counts).
    pub median: f64,
    /// The sample variance.
    pub variance: f64,
    /// The sample standard deviation.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// `NaN` values are dropped before computing.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if at least one non-`NaN` value remains
    /// * `None` - if the sample is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use pitwall_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([0.1, 0.25, 0.4]).unwrap();
    /// assert_eq!(stats.min, 0.1);
    /// assert_eq!(stats.median, 0.25);
    /// assert!((stats.mean - 0.25).abs() < 1e-12);
    /// assert!((stats.std_dev - 0.15).abs() < 1e-12);
    ///
    /// let single = DescriptiveStats::new([3.0]).unwrap();
    /// assert!(single.std_dev.is_nan());
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted, `NaN`-free values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = if count % 2 == 1 {
            sorted_values[count / 2]
        } else {
            f64::midpoint(sorted_values[count / 2 - 1], sorted_values[count / 2])
        };
        let variance = if count < 2 {
            f64::NAN
        } else {
            sorted_values
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        };
        let std_dev = variance.sqrt();

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
        })
    }

    /// Share of `values` within `mean ± k * std_dev`, in `[0, 1]`.
    ///
    /// Returns `NaN` when the spread is undefined or `values` is empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fraction_within(&self, values: &[f64], k: f64) -> f64 {
        if values.is_empty() || self.std_dev.is_nan() {
            return f64::NAN;
        }
        let lower = self.mean - k * self.std_dev;
        let upper = self.mean + k * self.std_dev;
        let inside = values.iter().filter(|&&v| lower <= v && v <= upper).count();
        inside as f64 / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(DescriptiveStats::new(Vec::new()).is_none());
        assert!(DescriptiveStats::new([f64::NAN]).is_none());
    }

    #[test]
    fn test_even_median() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_sample_variance() {
        // mean 5, squared deviations 9 + 1 + 1 + 9 = 20, / (4 - 1)
        let stats = DescriptiveStats::new([2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((stats.variance - 20.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_is_dropped() {
        let stats = DescriptiveStats::new([1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_fraction_within() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let stats = DescriptiveStats::new(values).unwrap();
        assert_eq!(stats.fraction_within(&values, 1.0), 0.8);
        assert_eq!(stats.fraction_within(&values, 3.0), 1.0);

        let single = DescriptiveStats::new([1.0]).unwrap();
        assert!(single.fraction_within(&[1.0], 1.0).is_nan());
    }
}
