use crate::error::StarFindError;

/// Parameters of the point-source detector.
///
/// All lengths are in pixels and all intensities are physical values of the
/// scanned plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorParams {
    /// Columns between two local noise estimates.
    pub window_stride: usize,
    /// Width of the row strip used for a local noise estimate.
    pub window_size: usize,
    /// Side of the centered square used for the global noise estimate.
    pub noise_window: usize,
    /// Maximum distance, on either axis, the bright walk may travel.
    pub max_walk: usize,
    /// Values above this level are clamped before scanning.
    pub saturation: f64,
    /// Number of sigma-clipping passes.
    pub clip_iterations: usize,
    /// Half width of the accepted band in units of sigma.
    pub clip_kappa: f64,
    /// Detection threshold above the local mean in units of sigma.
    pub significance: f64,
    /// Width of the excluded frame around the plane.
    pub border: usize,
    /// Smallest accepted source radius.
    pub min_radius: usize,
    /// Largest accepted source radius.
    pub max_radius: usize,
    /// Candidates must exceed this value.
    pub min_peak: f64,
    /// Peaks closer than this on both axes to an accepted source are dropped.
    pub min_separation: usize,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            window_stride: 8,
            window_size: 64,
            noise_window: 100,
            max_walk: 50,
            saturation: f64::MAX,
            clip_iterations: 3,
            clip_kappa: 3.0,
            significance: 5.0,
            border: 10,
            min_radius: 1,
            max_radius: 20,
            min_peak: 0.0,
            min_separation: 5,
        }
    }
}

impl DetectorParams {
    /// Check that the parameters describe a usable scan.
    ///
    /// # Errors
    ///
    /// Returns [`StarFindError::InvalidParameters`] for empty windows, a zero
    /// stride, a radius range with `min_radius > max_radius`, or a
    /// non-positive clipping band.
    pub fn validate(&self) -> Result<(), StarFindError> {
        if self.window_size == 0 || self.noise_window == 0 {
            return Err(StarFindError::InvalidParameters(
                "noise windows must not be empty".to_string(),
            ));
        }
        if self.window_stride == 0 {
            return Err(StarFindError::InvalidParameters(
                "window stride must be positive".to_string(),
            ));
        }
        if self.min_radius > self.max_radius {
            return Err(StarFindError::InvalidParameters(format!(
                "min radius {} exceeds max radius {}",
                self.min_radius, self.max_radius
            )));
        }
        if self.clip_kappa.is_nan() || self.clip_kappa <= 0.0 {
            return Err(StarFindError::InvalidParameters(format!(
                "clip kappa must be positive, got {}",
                self.clip_kappa
            )));
        }
        if self.significance.is_nan() || self.saturation.is_nan() || self.min_peak.is_nan() {
            return Err(StarFindError::InvalidParameters(
                "thresholds must not be NaN".to_string(),
            ));
        }
        Ok(())
    }
}
