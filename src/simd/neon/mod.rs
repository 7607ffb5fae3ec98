//! ARM NEON kernel for 128-bit double-precision lanes.
//!
//! Each step de-interleaves 4 samples with `vld2q_f32` into a real and an
//! imaginary register, widens both halves to `float64x2_t`, squares and adds
//! them, then adds into the widened accumulator block and narrows back.
//! Multiply and add stay separate (no `vfmaq`) so rounding matches the scalar
//! kernels exactly.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: any AArch64 processor (NEON is part of the baseline)
//! - **Compilation**: module is built when `build.rs` detects NEON on the host
//!
//! NEON loads and stores have no alignment requirement.

use std::arch::aarch64::*;

use crate::scalar;

/// Samples per step.
pub(crate) const LANE_COUNT: usize = 4;

/// Accumulates `re² + im²` of `ef`'s samples into `ai` using NEON.
///
/// `ef` must hold exactly `2 * ai.len()` values.
///
/// # Safety
///
/// The CPU must support NEON, and `ef` must hold at least `2 * ai.len()`
/// values: the vector blocks read `ef` through raw pointers without bounds
/// checks.
#[target_feature(enable = "neon")]
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

#[inline]
#[target_feature(enable = "neon")]
unsafe fn accumulate_block(ai: *mut f32, ef: *const f32) {
    let samples = vld2q_f32(ef); // .0 = [r0..r3], .1 = [i0..i3]

    let re_lo = vcvt_f64_f32(vget_low_f32(samples.0));
    let re_hi = vcvt_high_f64_f32(samples.0);
    let im_lo = vcvt_f64_f32(vget_low_f32(samples.1));
    let im_hi = vcvt_high_f64_f32(samples.1);

    let mag_lo = vaddq_f64(vmulq_f64(re_lo, re_lo), vmulq_f64(im_lo, im_lo));
    let mag_hi = vaddq_f64(vmulq_f64(re_hi, re_hi), vmulq_f64(im_hi, im_hi));

    let acc = vld1q_f32(ai);
    let acc_lo = vaddq_f64(vcvt_f64_f32(vget_low_f32(acc)), mag_lo);
    let acc_hi = vaddq_f64(vcvt_high_f64_f32(acc), mag_hi);

    vst1q_f32(ai, vcvt_high_f32_f64(vcvt_f32_f64(acc_lo), acc_hi));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let mut ai = [0.0f32; 4];
        unsafe { accumulate(&mut ai, &[1.0, 0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 4.0]) };
        assert_eq!(ai, [1.0, 1.0, 8.0, 25.0]);
    }

    #[test]
    fn test_matches_sequential_for_all_tails() {
        for len in 0..=21 {
            let mut expected: Vec<f32> = (0..len).map(|i| i as f32 - 7.5).collect();
            let ef: Vec<f32> = (0..2 * len).map(|i| ((i * 13) % 29) as f32 * 0.41 - 5.0).collect();
            let mut ai = expected.clone();

            scalar::accumulate_sequential(&mut expected, &ef);
            unsafe { accumulate(&mut ai, &ef) };

            assert_eq!(ai, expected, "len {len}");
        }
    }
}
