//! AVX2 kernel for 256-bit double-precision lanes.
//!
//! Each step reads 4 samples (8 interleaved f32), widens them into two
//! [`F64x4`] registers, squares, combines real and imaginary lanes with a
//! horizontal add, restores sample order with a cross-lane permute, and adds
//! the result into the widened accumulator block before narrowing it back.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: Intel Haswell (2013+) or AMD Excavator (2015+)
//! - **Compilation**: module is built when `build.rs` detects AVX2 on the host
//! - **Runtime**: callers must still check `is_x86_feature_detected!("avx2")`
//!
//! # Memory Alignment
//!
//! Aligned loads and stores are used when a pointer sits on a 16-byte
//! boundary, unaligned ones otherwise. Alignment only affects speed.

pub mod f64x4;

use crate::scalar;
use f64x4::{F64x4, LANE_COUNT};

/// `[m0, m2, m1, m3]` → `[m0, m1, m2, m3]`
const SAMPLE_ORDER: i32 = 0b11_01_10_00;

/// Accumulates `re² + im²` of `ef`'s samples into `ai` using AVX2.
///
/// `ef` must hold exactly `2 * ai.len()` values.
///
/// # Safety
///
/// The CPU must support AVX2, and `ef` must hold at least `2 * ai.len()`
/// values: the vector blocks read `ef` through raw pointers without bounds
/// checks.
#[target_feature(enable = "avx2")]
pub unsafe fn accumulate(ai: &mut [f32], ef: &[f32]) {
    debug_assert_eq!(ef.len(), 2 * ai.len(), "ef must hold two values per slot");

    let size = ai.len();
    let nb_lanes = size - (size % LANE_COUNT);

    let ai_ptr = ai.as_mut_ptr();
    let ef_ptr = ef.as_ptr();

    for i in (0..nb_lanes).step_by(LANE_COUNT) {
        accumulate_block(ai_ptr.add(i), ef_ptr.add(2 * i));
    }

    scalar::accumulate_sequential(&mut ai[nb_lanes..], &ef[2 * nb_lanes..]);
}

/// One step: 4 accumulators, 8 interleaved sample values.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn accumulate_block(ai: *mut f32, ef: *const f32) {
    // [r0, i0, r1, i1] and [r2, i2, r3, i3]
    let lo = F64x4::load_widened(ef);
    let hi = F64x4::load_widened(ef.add(LANE_COUNT));

    let magnitudes = (lo * lo)
        .hadd(hi * hi)
        .permute4x64::<SAMPLE_ORDER>();

    let acc = F64x4::load_widened(ai) + magnitudes;
    acc.store_narrowed_at(ai);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(len: usize) -> (Vec<f32>, Vec<f32>) {
        let ai = (0..len).map(|i| (i % 11) as f32 * 1.25 - 4.0).collect();
        let ef = (0..2 * len)
            .map(|i| ((i * 31) % 53) as f32 * 0.37 - 9.0)
            .collect();
        (ai, ef)
    }

    #[test]
    fn test_known_vector() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }

        let mut ai = [0.0f32; 4];
        unsafe { accumulate(&mut ai, &[1.0, 0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 4.0]) };
        assert_eq!(ai, [1.0, 1.0, 8.0, 25.0]);
    }

    #[test]
    fn test_matches_sequential_for_all_tails() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }

        for len in 0..=21 {
            let (mut expected, ef) = pattern(len);
            let mut ai = expected.clone();

            scalar::accumulate_sequential(&mut expected, &ef);
            unsafe { accumulate(&mut ai, &ef) };

            assert_eq!(ai, expected, "len {len}");
        }
    }

    #[test]
    fn test_misaligned_views_match() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }

        let (ai_base, ef) = pattern(40);
        for offset in 0..4 {
            let mut expected = ai_base.clone();
            let mut ai = ai_base.clone();

            scalar::accumulate_sequential(&mut expected[offset..], &ef[2 * offset..]);
            unsafe { accumulate(&mut ai[offset..], &ef[2 * offset..]) };

            assert_eq!(ai, expected, "offset {offset}");
        }
    }
}
