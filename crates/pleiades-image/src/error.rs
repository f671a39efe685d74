use crate::scalar::ScalarType;

/// An error type for plane operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when a geometric or numeric parameter is not valid.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Error when a pixel coordinate is outside the plane.
    #[error("Pixel ({x}, {y}) is out of bounds for a {width}x{height} plane")]
    IndexOutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Plane width.
        width: usize,
        /// Plane height.
        height: usize,
    },

    /// Error when a linear pixel index is outside the plane.
    #[error("Pixel index {0} is out of bounds for a plane of {1} pixels")]
    LinearIndexOutOfBounds(usize, usize),

    /// Error when two planes taking part in one operation differ in size.
    #[error("Plane size mismatch: {0}x{1} vs {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    /// Error when dividing by a zero scalar.
    #[error("Division by zero")]
    DivideByZero,

    /// Error when a scalar-type code is not one of the supported codes.
    #[error("Unsupported scalar type code {0}")]
    UnsupportedScalarType(i32),

    /// Error when a pixel buffer cannot be allocated.
    #[error("Failed to allocate a buffer of {0} elements")]
    Allocation(usize),

    /// Error when the data length does not match the plane size.
    #[error("Data length ({0}) does not match the plane size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when typed access asks for the wrong scalar type.
    #[error("Plane stores {0} pixels, requested {1}")]
    ScalarTypeMismatch(ScalarType, ScalarType),
}
