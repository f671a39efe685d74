//! Pixel interpolation for geometric transformations.
//!
//! Two border behaviours are provided:
//!
//! - **clamped**: neighbours past the last row or column repeat the edge pixel
//! - **zero border**: neighbours outside the plane contribute zero

mod bilinear;

pub use bilinear::{bilinear_interpolation, bilinear_zero_border};
