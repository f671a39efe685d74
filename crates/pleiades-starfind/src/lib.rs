#![deny(missing_docs)]
//! # Pleiades star finder
//!
//! Walk-based point-source detection with sigma-clipped noise estimates.

/// Detector parameters.
pub mod config;

/// The detection scan.
pub mod detector;

/// Error types for the star finder.
pub mod error;

/// Sigma-clipped noise estimation.
pub mod noise;

/// Detected source records.
pub mod source;

pub use crate::config::DetectorParams;
pub use crate::detector::find_stars;
pub use crate::error::StarFindError;
pub use crate::noise::sigma_clipped_stats;
pub use crate::source::DetectedSource;
