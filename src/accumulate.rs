//! Public entry points.
//!
//! All three take an explicit sample count `len`, an accumulator with at
//! least `len` slots and interleaved samples with at least `2 * len` values.
//! Only the first `len` slots and `2 * len` values are touched.

use log::trace;
use rayon::prelude::*;

use crate::error::{validate_buffers, Result};
use crate::simd::Backend;

/// Samples handed to one rayon task by [`par_accumulate_magnitudes`].
pub const PARALLEL_CHUNK: usize = 16_384;

/// Below this many samples [`par_accumulate_magnitudes`] stays on the
/// calling thread.
pub const PARALLEL_THRESHOLD: usize = 4 * PARALLEL_CHUNK;

/// Adds `ef[2i]² + ef[2i+1]²` (computed in f64) into `ai[i]` for `i < len`.
///
/// Runs the fastest kernel available on the current CPU. Repeated calls keep
/// adding into `ai`.
///
/// # Panics
///
/// Panics if `ai` has fewer than `len` slots or `ef` fewer than `2 * len`
/// values. Debug builds report the violated precondition; release builds hit
/// the slice bounds check.
///
/// # Examples
///
/// ```rust
/// let mut ai = [0.0f32; 4];
/// magsq::accumulate_magnitudes(4, &mut ai, &[1.0, 0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 4.0]);
/// assert_eq!(ai, [1.0, 1.0, 8.0, 25.0]);
/// ```
pub fn accumulate_magnitudes(len: usize, ai: &mut [f32], ef: &[f32]) {
    debug_assert!(
        ai.len() >= len,
        "accumulator holds {} slots, {} required",
        ai.len(),
        len
    );
    debug_assert!(
        ef.len() / 2 >= len,
        "samples hold {} values, {} required",
        ef.len(),
        2 * len
    );

    let ai = &mut ai[..len];
    let ef = &ef[..2 * len];

    let backend = Backend::detect();
    trace!("accumulate_magnitudes: len={} backend={}", len, backend.name());

    backend.accumulate(ai, ef);
}

/// Checked form of [`accumulate_magnitudes`].
///
/// Validates the buffer sizes first and writes nothing on error.
///
/// # Examples
///
/// ```rust
/// use magsq::error::MagsqError;
///
/// let mut ai = [0.0f32; 2];
/// let err = magsq::try_accumulate_magnitudes(2, &mut ai, &[3.0, 4.0]).unwrap_err();
/// assert_eq!(err, MagsqError::SamplesTooShort { required: 4, actual: 2 });
/// assert_eq!(ai, [0.0, 0.0]);
/// ```
pub fn try_accumulate_magnitudes(len: usize, ai: &mut [f32], ef: &[f32]) -> Result<()> {
    let required = validate_buffers(len, ai, ef)?;

    let backend = Backend::detect();
    trace!("try_accumulate_magnitudes: len={} backend={}", len, backend.name());

    backend.accumulate(&mut ai[..len], &ef[..required]);
    Ok(())
}

/// Data-parallel form of [`accumulate_magnitudes`].
///
/// Splits the accumulator into disjoint chunks of [`PARALLEL_CHUNK`] samples
/// and runs the kernel on each from the rayon pool. Inputs shorter than
/// [`PARALLEL_THRESHOLD`] are processed on the calling thread. Results are
/// identical to the sequential call.
///
/// # Panics
///
/// Same preconditions as [`accumulate_magnitudes`].
pub fn par_accumulate_magnitudes(len: usize, ai: &mut [f32], ef: &[f32]) {
    debug_assert!(
        ai.len() >= len,
        "accumulator holds {} slots, {} required",
        ai.len(),
        len
    );
    debug_assert!(
        ef.len() / 2 >= len,
        "samples hold {} values, {} required",
        ef.len(),
        2 * len
    );

    let ai = &mut ai[..len];
    let ef = &ef[..2 * len];

    let backend = Backend::detect();

    if len < PARALLEL_THRESHOLD {
        trace!("par_accumulate_magnitudes: len={} backend={} sequential", len, backend.name());
        backend.accumulate(ai, ef);
        return;
    }

    trace!(
        "par_accumulate_magnitudes: len={} backend={} chunks={}",
        len,
        backend.name(),
        len.div_ceil(PARALLEL_CHUNK)
    );

    ai.par_chunks_mut(PARALLEL_CHUNK)
        .zip(ef.par_chunks(2 * PARALLEL_CHUNK))
        .for_each(|(ai_chunk, ef_chunk)| backend.accumulate(ai_chunk, ef_chunk));
}
