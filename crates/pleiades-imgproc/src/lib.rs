#![deny(missing_docs)]
//! Parallel pixel operations on scalar-typed planes

/// elementwise arithmetic between planes and scalars.
pub mod arith;

/// block summation.
pub mod bin;

/// conversion to calibrated values.
pub mod convert;

/// region extraction.
pub mod crop;

/// mirror operations.
pub mod flip;

/// interpolation kernels.
pub mod interpolation;

/// canvas enlargement.
pub mod padding;

/// partitioned parallel execution and the worker limit.
pub mod parallel;

/// display rendering through transfer curves.
pub mod render;

/// bilinear resampling.
pub mod resize;

/// cached plane statistics.
pub mod stats;

/// affine warps and translation.
pub mod warp;
