/// Iterative sigma-clipped mean and standard deviation.
///
/// The first estimate uses every sample. Each of the following `iterations`
/// passes recomputes the estimate over the samples inside
/// `[mean - kappa * sigma, mean + kappa * sigma]` of the previous pass. The
/// clipping stops early once the accepted set no longer shrinks or would
/// become empty.
///
/// # Arguments
///
/// * `samples` - The values to estimate from.
/// * `kappa` - Half width of the accepted band in units of sigma.
/// * `iterations` - Maximum number of clipping passes.
///
/// # Returns
///
/// The `(mean, sigma)` pair, `(0, 0)` for no samples.
///
/// # Example
///
/// ```
/// use pleiades_starfind::sigma_clipped_stats;
///
/// let samples = [10.0, 11.0, 9.0, 10.0, 500.0, 10.0, 11.0, 9.0];
/// let (mean, sigma) = sigma_clipped_stats(&samples, 2.0, 3);
///
/// assert_eq!(mean, 10.0);
/// assert!(sigma < 1.0);
/// ```
pub fn sigma_clipped_stats(samples: &[f64], kappa: f64, iterations: usize) -> (f64, f64) {
    let Some((mut mean, mut sigma, mut count)) = moments(samples.iter().copied()) else {
        return (0.0, 0.0);
    };

    for _ in 0..iterations {
        let (lo, hi) = (mean - kappa * sigma, mean + kappa * sigma);
        let accepted = samples.iter().copied().filter(|&v| v >= lo && v <= hi);
        match moments(accepted) {
            Some((m, s, n)) if n < count => {
                mean = m;
                sigma = s;
                count = n;
            }
            _ => break,
        }
    }

    (mean, sigma)
}

// mean, population standard deviation and count in one pass
fn moments(values: impl Iterator<Item = f64>) -> Option<(f64, f64, usize)> {
    let (mut sum, mut sum_sq, mut count) = (0.0, 0.0, 0usize);
    for v in values {
        sum += v;
        sum_sq += v * v;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    Some((mean, variance.sqrt(), count))
}
