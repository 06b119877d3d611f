use std::ops::Range;

use serde::Serialize;

/// A histogram of equal-width bins over a fixed range.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    /// The bins in ascending order.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    ///
    /// The last bin also includes its end.
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` equal-width bins spanning `[min, max]`.
    ///
    /// Values outside the range and `NaN` values are ignored. A value equal to
    /// `max` is counted in the last bin.
    ///
    /// # Panics
    ///
    /// Panics if `num_bins` is zero or `min >= max`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pitwall_stats::histogram::Histogram;
    /// let histogram = Histogram::with_range([0.1, 0.25, 0.4, 1.0, 1.5], 0.0, 1.0, 4);
    /// let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
    /// assert_eq!(counts, [1, 2, 0, 1]);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn with_range<I>(values: I, min: f64, max: f64, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        assert!(num_bins > 0, "num_bins must be positive");
        assert!(min < max, "min must be less than max");

        let width = (max - min) / num_bins as f64;
        let mut bins = (0..num_bins)
            .map(|i| {
                let start = min + width * i as f64;
                let end = if i + 1 == num_bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                };
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for value in values {
            if !(min..=max).contains(&value) {
                continue;
            }
            let index = (((value - min) / width) as usize).min(num_bins - 1);
            bins[index].count += 1;
        }

        Self { bins }
    }

    /// Total number of values counted.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Largest bin count, or zero for an empty histogram.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}
