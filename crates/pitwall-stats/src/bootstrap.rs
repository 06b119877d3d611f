use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;

/// Creates a deterministic generator for reproducible resampling.
#[must_use]
pub fn seeded_rng(seed: u64) -> Pcg64 {
    Pcg64::seed_from_u64(seed)
}

/// Draws `n_samples` values from `values` with replacement.
///
/// Returns an empty vector when `values` is empty.
///
/// # Examples
///
/// ```
/// use pitwall_stats::bootstrap::{resample, seeded_rng};
///
/// let back = [0.2, 0.4, 0.5, 0.7];
/// let a = resample(&back, 10, &mut seeded_rng(123));
/// let b = resample(&back, 10, &mut seeded_rng(123));
/// assert_eq!(a.len(), 10);
/// assert_eq!(a, b);
/// ```
pub fn resample<R>(values: &[f64], n_samples: usize, rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    if values.is_empty() {
        return vec![];
    }
    (0..n_samples)
        .map(|_| values[rng.random_range(0..values.len())])
        .collect()
}
