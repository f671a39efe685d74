/// Linear mapping from stored codes to physical values.
///
/// `physical = zero + scale * stored + pedestal`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// Multiplier applied to the stored code.
    pub scale: f64,
    /// Offset added after scaling.
    pub zero: f64,
    /// Additional offset, typically a bias level removed by the camera.
    pub pedestal: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Calibration {
    /// The calibration leaving stored codes unchanged.
    pub const IDENTITY: Calibration = Calibration {
        scale: 1.0,
        zero: 0.0,
        pedestal: 0.0,
    };

    /// Create a calibration without pedestal.
    pub fn new(scale: f64, zero: f64) -> Self {
        Self {
            scale,
            zero,
            pedestal: 0.0,
        }
    }

    /// Whether applying the calibration is a no-op.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map a stored code to its physical value.
    #[inline]
    pub fn apply(&self, stored: f64) -> f64 {
        self.zero + self.scale * stored + self.pedestal
    }

    /// Map a physical value back to a stored code.
    ///
    /// A zero scale maps every value to zero.
    #[inline]
    pub fn invert(&self, physical: f64) -> f64 {
        if self.scale == 0.0 {
            return 0.0;
        }
        (physical - self.zero - self.pedestal) / self.scale
    }
}

/// The curve used to map normalized intensities to display levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferFunction {
    /// `f(x) = x`
    #[default]
    Linear,
    /// `f(x) = x^(1/gamma)` with gamma taken from [`RenderParams::exponent`]
    Gamma,
    /// `f(x) = log10(1 + 9x)`
    Log,
    /// `f(x) = sqrt(x)`
    Sqrt,
    /// `f(x) = x^2`
    Square,
    /// `f(x) = cbrt(x)`
    Cbrt,
    /// Logistic curve centered on 0.5, rescaled to pass through 0 and 1.
    Sigmoid,
}

impl TransferFunction {
    /// All available curves.
    pub const ALL: [TransferFunction; 7] = [
        TransferFunction::Linear,
        TransferFunction::Gamma,
        TransferFunction::Log,
        TransferFunction::Sqrt,
        TransferFunction::Square,
        TransferFunction::Cbrt,
        TransferFunction::Sigmoid,
    ];
}

/// Display parameters attached to a plane.
///
/// These are consulted only when rendering and never change stored values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderParams {
    /// Physical value mapped to the minimum display level.
    pub black: f64,
    /// Physical value mapped to the maximum display level.
    pub white: f64,
    /// Whether to invert the display levels.
    pub invert: bool,
    /// The transfer curve.
    pub transfer: TransferFunction,
    /// Exponent of the gamma curve.
    pub exponent: f64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            black: 0.0,
            white: 255.0,
            invert: false,
            transfer: TransferFunction::Linear,
            exponent: 2.2,
        }
    }
}

impl RenderParams {
    /// Pick levels from the plane statistics: one sigma below the mean to
    /// five sigma above it.
    ///
    /// # Example
    ///
    /// ```
    /// use pleiades_image::RenderParams;
    ///
    /// let params = RenderParams::default().auto_levels(100.0, 10.0);
    /// assert_eq!(params.black, 90.0);
    /// assert_eq!(params.white, 150.0);
    /// ```
    pub fn auto_levels(self, mean: f64, stdev: f64) -> Self {
        Self {
            black: mean - stdev,
            white: mean + 5.0 * stdev,
            ..self
        }
    }
}

/// Parameters of the translate-rotate-scale alignment transform.
///
/// A source point `p` lands at
/// `(center + scale * R(angle) * (p - center) + translation) / pixel_size`
/// in the output, where `R` follows the image rotation convention (y down,
/// positive angles turn +x towards -y).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrsParams {
    /// Rotation and scaling center in source pixels.
    pub center: (f64, f64),
    /// Shift applied after rotation and scaling, in source pixels.
    pub translation: (f64, f64),
    /// Rotation angle in radians.
    pub angle: f64,
    /// Scale factor.
    pub scale: f64,
    /// Size of an output pixel in source pixels.
    pub pixel_size: f64,
}

impl Default for TrsParams {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            translation: (0.0, 0.0),
            angle: 0.0,
            scale: 1.0,
            pixel_size: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn calibration_inverse() {
        let cal = Calibration {
            scale: 2.0,
            zero: 32768.0,
            pedestal: 100.0,
        };
        assert_relative_eq!(cal.apply(-10.0), 32848.0);
        assert_relative_eq!(cal.invert(cal.apply(1234.0)), 1234.0);
        assert!(Calibration::default().is_identity());
        assert!(!cal.is_identity());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn render_params_serde() -> Result<(), serde_json::Error> {
        let params = RenderParams {
            transfer: TransferFunction::Sigmoid,
            ..Default::default()
        };
        let json = serde_json::to_string(&params)?;
        let back: RenderParams = serde_json::from_str(&json)?;
        assert_eq!(back, params);
        Ok(())
    }
}
