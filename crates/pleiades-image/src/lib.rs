#![deny(missing_docs)]
//! Scalar-typed planes for astronomical pixel data

/// fallible buffer allocation helpers.
pub mod allocator;

/// tagged pixel buffers and the per-type dispatch macro.
pub mod buffer;

/// Error types for the image module.
pub mod error;

/// calibration and display parameters.
pub mod params;

/// the plane representation.
pub mod plane;

/// scalar types and the pixel type trait.
pub mod scalar;

/// cached plane statistics.
pub mod stats;

pub use crate::buffer::PlaneBuffer;
pub use crate::error::ImageError;
pub use crate::params::{Calibration, RenderParams, TransferFunction, TrsParams};
pub use crate::plane::{ImageSize, Plane};
pub use crate::scalar::{PixelType, ScalarType};
pub use crate::stats::StatsCache;
