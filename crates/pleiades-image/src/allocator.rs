use crate::error::ImageError;

/// Compute the number of pixels of a `width` x `height` plane.
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the product overflows `usize`.
pub fn checked_len(width: usize, height: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .ok_or(ImageError::Allocation(usize::MAX))
}

/// Allocate a vector of `len` copies of `val`, reporting allocator failure
/// instead of aborting.
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the memory cannot be reserved.
pub fn try_vec_filled<T: Clone>(len: usize, val: T) -> Result<Vec<T>, ImageError> {
    let mut data = try_vec_with_capacity(len)?;
    data.resize(len, val);
    Ok(data)
}

/// Allocate an empty vector able to hold `len` elements without reallocating.
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the memory cannot be reserved.
pub fn try_vec_with_capacity<T>(len: usize) -> Result<Vec<T>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ImageError::Allocation(len))?;
    Ok(data)
}
