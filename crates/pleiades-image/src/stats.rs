use std::sync::OnceLock;

/// Lazily computed plane statistics.
///
/// Each value is filled at most once until [`StatsCache::invalidate`] clears
/// the cache; any mutation of the owning plane does so.
#[derive(Debug, Default)]
pub struct StatsCache {
    min: OnceLock<f64>,
    max: OnceLock<f64>,
    mean: OnceLock<f64>,
    stdev: OnceLock<f64>,
}

impl Clone for StatsCache {
    fn clone(&self) -> Self {
        let cache = StatsCache::default();
        copy_cell(&self.min, &cache.min);
        copy_cell(&self.max, &cache.max);
        copy_cell(&self.mean, &cache.mean);
        copy_cell(&self.stdev, &cache.stdev);
        cache
    }
}

fn copy_cell(src: &OnceLock<f64>, dst: &OnceLock<f64>) {
    if let Some(&value) = src.get() {
        let _ = dst.set(value);
    }
}

impl StatsCache {
    /// Clear every cached value.
    pub fn invalidate(&mut self) {
        *self = StatsCache::default();
    }

    /// Whether no value is cached.
    pub fn is_empty(&self) -> bool {
        self.min.get().is_none()
            && self.max.get().is_none()
            && self.mean.get().is_none()
            && self.stdev.get().is_none()
    }

    /// Cached minimum, if valid.
    pub fn min(&self) -> Option<f64> {
        self.min.get().copied()
    }

    /// Cached maximum, if valid.
    pub fn max(&self) -> Option<f64> {
        self.max.get().copied()
    }

    /// Cached mean, if valid.
    pub fn mean(&self) -> Option<f64> {
        self.mean.get().copied()
    }

    /// Cached standard deviation, if valid.
    pub fn stdev(&self) -> Option<f64> {
        self.stdev.get().copied()
    }

    /// Store the extrema.
    pub fn set_extrema(&self, min: f64, max: f64) {
        let _ = self.min.set(min);
        let _ = self.max.set(max);
    }

    /// Store the first two moments.
    pub fn set_moments(&self, mean: f64, stdev: f64) {
        let _ = self.mean.set(mean);
        let _ = self.stdev.set(stdev);
    }
}
