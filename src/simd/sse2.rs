//! SSE2 kernel for 128-bit double-precision lanes.
//!
//! SSE2 is part of the x86_64 baseline, so this path needs no detection. It
//! handles 4 samples per step in pairs of `__m128d` registers and sticks to
//! SSE2 instructions only: the real/imaginary combine uses unpack + add
//! instead of the SSE3 horizontal add.
//!
//! Aligned loads/stores are used when the accumulator (4 × f32) or sample
//! (2 × 4 × f32) pointers are 16-byte aligned, unaligned ones otherwise.

use std::arch::x86_64::*;

use super::is_aligned;
use crate::scalar;

/// Samples per step.
pub(crate) const LANE_COUNT: usize = 4;

#[inline(always)]
unsafe fn load(ptr: *const f32) -> __m128 {
    match is_aligned(ptr) {
        true => _mm_load_ps(ptr),
        false => _mm_loadu_ps(ptr),
    }
}

#[inline(always)]
unsafe fn store(ptr: *mut f32, value: __m128) {
    match is_aligned(ptr) {
        true => _mm_store_ps(ptr, value),
        false => _mm_storeu_ps(ptr, value),
    }
}

/// Squared magnitudes of two samples `[r0, i0, r1, i1]` as `[m0, m1]`.
#[inline(always)]
unsafe fn magnitudes(pairs: __m128) -> __m128d {
    let first = _mm_cvtps_pd(pairs); // [r0, i0]
    let second = _mm_cvtps_pd(_mm_movehl_ps(pairs, pairs)); // [r1, i1]

    let first = _mm_mul_pd(first, first);
    let second = _mm_mul_pd(second, second);

    _mm_add_pd(
        _mm_unpacklo_pd(first, second),
        _mm_unpackhi_pd(first, second),
    )
}

/// Accumulates `re² + im²` of `ef`'s samples into `ai` using SSE2.
///
/// # Panics
///
/// Panics before writing anything unless `ef` holds exactly `2 * ai.len()`
/// values.
pub fn accumulate(ai: &mut [f32], ef: &[f32]) {
    assert_eq!(ef.len(), 2 * ai.len(), "ef must hold two values per slot");

    let mut ai_blocks = ai.chunks_exact_mut(LANE_COUNT);
    let mut ef_blocks = ef.chunks_exact(2 * LANE_COUNT);

    for (ai_block, ef_block) in (&mut ai_blocks).zip(&mut ef_blocks) {
        // SAFETY: SSE2 is always available on x86_64, blocks hold exactly
        // LANE_COUNT accumulators and 2 * LANE_COUNT sample values.
        unsafe { accumulate_block(ai_block.as_mut_ptr(), ef_block.as_ptr()) };
    }

    scalar::accumulate_sequential(ai_blocks.into_remainder(), ef_blocks.remainder());
}

#[inline(always)]
unsafe fn accumulate_block(ai: *mut f32, ef: *const f32) {
    let mag_lo = magnitudes(load(ef));
    let mag_hi = magnitudes(load(ef.add(LANE_COUNT)));

    let acc = load(ai);
    let acc_lo = _mm_add_pd(_mm_cvtps_pd(acc), mag_lo);
    let acc_hi = _mm_add_pd(_mm_cvtps_pd(_mm_movehl_ps(acc, acc)), mag_hi);

    store(ai, _mm_movelh_ps(_mm_cvtpd_ps(acc_lo), _mm_cvtpd_ps(acc_hi)));
}
