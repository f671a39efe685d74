/// A point source found by the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectedSource {
    /// Sub-pixel x coordinate of the centroid.
    pub x: f64,
    /// Sub-pixel y coordinate of the centroid.
    pub y: f64,
    /// Radius at which the profile drops into the background.
    pub radius: usize,
    /// Value of the brightest pixel.
    pub peak: f64,
    /// Background-subtracted flux.
    pub flux: f64,
    pub(crate) magnitude: f64,
}

impl DetectedSource {
    pub(crate) fn new(x: f64, y: f64, radius: usize, peak: f64, flux: f64) -> Self {
        Self {
            x,
            y,
            radius,
            peak,
            flux,
            magnitude: 0.0,
        }
    }

    /// Instrumental magnitude, `-2.5 * log10(flux)`, or 0 without positive flux.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub(crate) fn update_magnitude(&mut self) {
        self.magnitude = if self.flux > 0.0 {
            -2.5 * self.flux.log10()
        } else {
            0.0
        };
    }
}
