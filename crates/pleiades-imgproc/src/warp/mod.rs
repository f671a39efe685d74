//! Geometric transformations resampling a plane through an affine map.
//!
//! - Rotation around a point, growing the plane to the rotated bounding box
//! - Translate-rotate-scale alignment keeping the plane size
//! - Integer and sub-pixel translation
//!
//! # Examples
//!
//! Rotating a plane by a quarter turn around its center:
//!
//! ```no_run
//! use pleiades_image::{Plane, ScalarType};
//! use pleiades_imgproc::warp::rotate;
//!
//! let mut plane = Plane::new([256, 256].into(), ScalarType::F32).unwrap();
//! rotate(&mut plane, 128.0, 128.0, std::f64::consts::FRAC_PI_2).unwrap();
//! ```

mod affine;
mod translate;

pub use affine::{
    get_rotation_matrix2d, get_trs_matrix2d, invert_affine_transform, rotate, transform,
    transform_point, OutsideMask,
};
pub use translate::{translate, translate_subpixel};
