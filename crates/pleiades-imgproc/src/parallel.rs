use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use pleiades_image::{allocator, ImageError};

// 0 means "size of the global rayon pool"
static MAX_THREADS: AtomicUsize = AtomicUsize::new(0);

/// Set the process-wide upper bound on workers per operation.
///
/// Passing `0` restores the default, the size of the global rayon pool.
/// The limit is read once at the start of every parallel operation.
pub fn set_max_threads(n: usize) {
    MAX_THREADS.store(n, Ordering::Relaxed);
}

/// The current upper bound on workers per operation.
pub fn max_threads() -> usize {
    match MAX_THREADS.load(Ordering::Relaxed) {
        0 => rayon::current_num_threads(),
        n => n,
    }
}

/// Number of workers used for an operation over `extent` units.
///
/// Always in `[1, max(extent, 1)]`.
pub fn num_partitions(extent: usize) -> usize {
    max_threads().clamp(1, extent.max(1))
}

/// Split `0..extent` into `parts` contiguous ranges of near-equal length.
///
/// The last range absorbs the remainder.
///
/// # Example
///
/// ```
/// use pleiades_imgproc::parallel::partition;
///
/// assert_eq!(partition(10, 3), vec![0..3, 3..6, 6..10]);
/// ```
pub fn partition(extent: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, extent.max(1));
    let step = extent / parts;
    (0..parts)
        .map(|i| {
            let begin = i * step;
            let end = if i + 1 == parts { extent } else { begin + step };
            begin..end
        })
        .collect()
}

/// Run `f` concurrently over disjoint groups of `stride`-long units of `dst`.
///
/// The units (rows, or single pixels with `stride == 1`) are partitioned
/// with [`partition`], one task per range. Each task receives its unit range
/// and the matching sub-slice of `dst`. All tasks are joined before
/// returning; the first error reported by any task is returned.
///
/// # Arguments
///
/// * `dst` - The output buffer, `stride * units` elements long.
/// * `stride` - Number of elements in one unit.
/// * `f` - The per-partition worker.
///
/// # Errors
///
/// Returns [`ImageError::InvalidDataLength`] if `dst` is not a multiple of
/// `stride`, or the error of a failing worker.
pub fn for_each_partition<T, F>(dst: &mut [T], stride: usize, f: F) -> Result<(), ImageError>
where
    T: Send,
    F: Fn(Range<usize>, &mut [T]) -> Result<(), ImageError> + Sync,
{
    if stride == 0 || dst.is_empty() {
        return Ok(());
    }
    if dst.len() % stride != 0 {
        return Err(ImageError::InvalidDataLength(
            dst.len(),
            dst.len() / stride * stride,
        ));
    }

    let units = dst.len() / stride;
    let ranges = partition(units, num_partitions(units));
    log::trace!("{} units split over {} workers", units, ranges.len());

    let mut jobs = Vec::with_capacity(ranges.len());
    let mut rest = dst;
    for range in ranges {
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * stride);
        jobs.push((range, chunk));
        rest = tail;
    }

    let mut results: Vec<Result<(), ImageError>> = jobs.iter().map(|_| Ok(())).collect();
    let f = &f;
    rayon::scope(|s| {
        for ((range, chunk), result) in jobs.into_iter().zip(results.iter_mut()) {
            s.spawn(move |_| *result = f(range, chunk));
        }
    });

    results.into_iter().collect()
}

/// Allocate a `width * height` buffer filled with `fill` and compute its rows
/// concurrently.
///
/// `f` receives the row index and the row to fill.
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the buffer cannot be allocated, or
/// the first error reported by `f`.
pub fn build_rows<T, F>(width: usize, height: usize, fill: T, f: F) -> Result<Vec<T>, ImageError>
where
    T: Clone + Send,
    F: Fn(usize, &mut [T]) -> Result<(), ImageError> + Sync,
{
    let mut dst = allocator::try_vec_filled(allocator::checked_len(width, height)?, fill)?;
    for_each_partition(&mut dst, width, |rows, chunk| {
        for (y, dst_row) in rows.zip(chunk.chunks_exact_mut(width)) {
            f(y, dst_row)?;
        }
        Ok(())
    })?;
    Ok(dst)
}

/// Compute one partial result per partition of `0..extent` concurrently.
///
/// The partials are returned in range order, ready to be reduced by the
/// caller.
pub fn map_partitions<R, F>(extent: usize, f: F) -> Vec<R>
where
    R: Send + Default,
    F: Fn(Range<usize>) -> R + Sync,
{
    let ranges = partition(extent, num_partitions(extent));
    let mut partials: Vec<R> = ranges.iter().map(|_| R::default()).collect();
    let f = &f;
    rayon::scope(|s| {
        for (range, partial) in ranges.into_iter().zip(partials.iter_mut()) {
            s.spawn(move |_| *partial = f(range));
        }
    });
    partials
}
