use pleiades_image::{with_pixels, ImageError, PixelType, Plane, PlaneBuffer, ScalarType};

use crate::parallel;

/// The right-hand side of an elementwise operation.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    /// Another plane of the same size.
    Plane(&'a Plane),
    /// A constant applied to every pixel.
    Scalar(f64),
    /// The receiver itself.
    Receiver,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    #[inline]
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
        }
    }

    fn target(self, lhs: ScalarType, rhs: ScalarType) -> ScalarType {
        match self {
            Op::Add | Op::Sub => lhs.promoted().join(rhs.promoted()),
            Op::Mul | Op::Div => ScalarType::F64,
        }
    }
}

/// Add `rhs` to `plane` pixel by pixel.
///
/// The result type is one step up the promotion lattice from the receiver
/// (`u8, i8 -> i16`, `u16, i16 -> i32`, `u32, i32 -> i64`, others `-> f64`),
/// widened further if the right-hand side needs it. Stored codes are added;
/// the calibration of the receiver is kept.
///
/// # Arguments
///
/// * `plane` - The receiver, updated in place.
/// * `rhs` - The operand to add.
///
/// # Errors
///
/// Returns [`ImageError::DimensionMismatch`] if `rhs` is a plane of another
/// size. The receiver is unchanged on error.
///
/// # Example
///
/// ```
/// use pleiades_image::{Plane, ScalarType};
/// use pleiades_imgproc::arith::{add, Operand};
///
/// let mut a = Plane::from_vec([2, 1].into(), vec![250u8, 10]).unwrap();
/// let b = Plane::from_vec([2, 1].into(), vec![10u8, 10]).unwrap();
///
/// add(&mut a, Operand::Plane(&b)).unwrap();
///
/// assert_eq!(a.scalar_type(), ScalarType::I16);
/// assert_eq!(a.get(0, 0).unwrap(), 260.0);
/// ```
pub fn add(plane: &mut Plane, rhs: Operand) -> Result<(), ImageError> {
    binary_op(plane, rhs, Op::Add)
}

/// Subtract `rhs` from `plane` pixel by pixel.
///
/// Promotion follows [`add`]. Subtracting the receiver from itself yields
/// zeros without reading the pixels.
///
/// # Errors
///
/// Returns [`ImageError::DimensionMismatch`] if `rhs` is a plane of another
/// size. The receiver is unchanged on error.
pub fn sub(plane: &mut Plane, rhs: Operand) -> Result<(), ImageError> {
    binary_op(plane, rhs, Op::Sub)
}

/// Multiply `plane` by `rhs` pixel by pixel. The result is stored as `f64`.
///
/// # Errors
///
/// Returns [`ImageError::DimensionMismatch`] if `rhs` is a plane of another
/// size. The receiver is unchanged on error.
pub fn mul(plane: &mut Plane, rhs: Operand) -> Result<(), ImageError> {
    binary_op(plane, rhs, Op::Mul)
}

/// Divide `plane` by `rhs` pixel by pixel. The result is stored as `f64`.
///
/// Pixels divided by a zero pixel of a plane operand are set to zero.
/// Dividing the receiver by itself yields ones without reading the pixels.
///
/// # Errors
///
/// Returns [`ImageError::DivideByZero`] for a zero scalar operand and
/// [`ImageError::DimensionMismatch`] if `rhs` is a plane of another size.
/// The receiver is unchanged on error.
pub fn div(plane: &mut Plane, rhs: Operand) -> Result<(), ImageError> {
    binary_op(plane, rhs, Op::Div)
}

fn binary_op(plane: &mut Plane, rhs: Operand, op: Op) -> Result<(), ImageError> {
    let lhs_type = plane.scalar_type();

    let buffer = match rhs {
        Operand::Receiver => receiver_op(plane, op)?,
        Operand::Plane(other) => {
            if other.size() != plane.size() {
                return Err(ImageError::DimensionMismatch(
                    plane.width(),
                    plane.height(),
                    other.width(),
                    other.height(),
                ));
            }
            let target = op.target(lhs_type, other.scalar_type());
            let mut out = plane.buffer().convert(target)?;
            let width = plane.width();
            with_pixels!(&mut out, |dst| with_pixels!(other.buffer(), |src| {
                zip_kernel(dst, src, width, op)
            }))?;
            out
        }
        Operand::Scalar(value) => {
            if op == Op::Div && value == 0.0 {
                return Err(ImageError::DivideByZero);
            }
            let rhs_type = if value.fract() != 0.0 {
                ScalarType::F64
            } else if value.abs() <= i16::MAX as f64 {
                ScalarType::I16
            } else if value.abs() <= i32::MAX as f64 {
                ScalarType::I32
            } else {
                ScalarType::F64
            };
            let target = match op {
                Op::Add | Op::Sub => lhs_type.promoted().join(rhs_type),
                Op::Mul | Op::Div => ScalarType::F64,
            };
            let mut out = plane.buffer().convert(target)?;
            let width = plane.width();
            with_pixels!(&mut out, |dst| scalar_kernel(dst, value, width, op))?;
            out
        }
    };

    log::debug!(
        "{:?} on {} plane: {} -> {}",
        op,
        plane.size(),
        lhs_type,
        buffer.scalar_type()
    );

    let size = plane.size();
    plane.replace_buffer(size, buffer)?;
    Ok(())
}

fn receiver_op(plane: &Plane, op: Op) -> Result<PlaneBuffer, ImageError> {
    let target = op.target(plane.scalar_type(), plane.scalar_type());
    match op {
        Op::Sub => PlaneBuffer::zeros(target, plane.num_pixels()),
        Op::Div => {
            let mut out = PlaneBuffer::zeros(target, plane.num_pixels())?;
            let width = plane.width();
            with_pixels!(&mut out, |dst| fill_kernel(dst, 1.0, width))?;
            Ok(out)
        }
        Op::Add | Op::Mul => {
            let mut out = plane.buffer().convert(target)?;
            let width = plane.width();
            with_pixels!(&mut out, |dst| self_kernel(dst, width, op))?;
            Ok(out)
        }
    }
}

fn zip_kernel<T: PixelType, U: PixelType>(
    dst: &mut [T],
    src: &[U],
    width: usize,
    op: Op,
) -> Result<(), ImageError> {
    parallel::for_each_partition(dst, width, |rows, dst_chunk| {
        let src_chunk = &src[rows.start * width..rows.end * width];
        for (d, s) in dst_chunk.iter_mut().zip(src_chunk) {
            *d = T::from_f64(op.apply(d.to_f64(), s.to_f64()));
        }
        Ok(())
    })
}

fn scalar_kernel<T: PixelType>(
    dst: &mut [T],
    value: f64,
    width: usize,
    op: Op,
) -> Result<(), ImageError> {
    parallel::for_each_partition(dst, width, |_, dst_chunk| {
        for d in dst_chunk.iter_mut() {
            *d = T::from_f64(op.apply(d.to_f64(), value));
        }
        Ok(())
    })
}

fn self_kernel<T: PixelType>(dst: &mut [T], width: usize, op: Op) -> Result<(), ImageError> {
    parallel::for_each_partition(dst, width, |_, dst_chunk| {
        for d in dst_chunk.iter_mut() {
            let v = d.to_f64();
            *d = T::from_f64(op.apply(v, v));
        }
        Ok(())
    })
}

fn fill_kernel<T: PixelType>(dst: &mut [T], value: f64, width: usize) -> Result<(), ImageError> {
    let value = T::from_f64(value);
    parallel::for_each_partition(dst, width, |_, dst_chunk| {
        dst_chunk.fill(value);
        Ok(())
    })
}
