//! Portable scalar kernels.
//!
//! All kernels here take an accumulator `ai` of `n` values and interleaved
//! samples `ef` of exactly `2 * n` values, and perform
//! `ai[i] = (ai[i] as f64 + re² + im²) as f32` with the squares and sums in
//! `f64`. They differ only in loop shape:
//!
//! - [`accumulate_sequential`]: indexed walk, one pair per iteration. This is
//!   the reference every other kernel is compared against.
//! - [`accumulate_unrolled`]: `WIDTH` samples per loop body with a scalar
//!   remainder loop ([`accumulate_unrolled4`], [`accumulate_unrolled8`]).
//! - [`accumulate_autovec`]: zipped `chunks_exact` iteration, free of index
//!   bounds checks so LLVM can vectorize it. This is the dispatch fallback.
//! - [`accumulate_planar`]: same contract for split real/imaginary buffers.

/// Squared magnitude of one sample, computed in double precision.
#[inline(always)]
pub fn magnitude_squared(re: f32, im: f32) -> f64 {
    let re = re as f64;
    let im = im as f64;
    re * re + im * im
}

#[inline(always)]
fn accumulate_one(acc: &mut f32, re: f32, im: f32) {
    *acc = (*acc as f64 + magnitude_squared(re, im)) as f32;
}

/// Sequential index walk, one sample per iteration.
pub fn accumulate_sequential(ai: &mut [f32], ef: &[f32]) {
    debug_assert_eq!(ef.len(), 2 * ai.len(), "ef must hold two values per slot");

    for i in 0..ai.len() {
        accumulate_one(&mut ai[i], ef[2 * i], ef[2 * i + 1]);
    }
}

/// Processes `WIDTH` samples per loop body, then the tail one by one.
#[inline(always)]
pub fn accumulate_unrolled<const WIDTH: usize>(ai: &mut [f32], ef: &[f32]) {
    debug_assert!(WIDTH > 0, "unroll width can't be zero");
    debug_assert_eq!(ef.len(), 2 * ai.len(), "ef must hold two values per slot");

    let mut ai_blocks = ai.chunks_exact_mut(WIDTH);
    let mut ef_blocks = ef.chunks_exact(2 * WIDTH);

    for (ai_block, ef_block) in (&mut ai_blocks).zip(&mut ef_blocks) {
        for k in 0..WIDTH {
            accumulate_one(&mut ai_block[k], ef_block[2 * k], ef_block[2 * k + 1]);
        }
    }

    accumulate_sequential(ai_blocks.into_remainder(), ef_blocks.remainder());
}

/// Unrolled by 4 samples.
pub fn accumulate_unrolled4(ai: &mut [f32], ef: &[f32]) {
    accumulate_unrolled::<4>(ai, ef)
}

/// Unrolled by 8 samples.
pub fn accumulate_unrolled8(ai: &mut [f32], ef: &[f32]) {
    accumulate_unrolled::<8>(ai, ef)
}

/// Iterator form of [`accumulate_sequential`], shaped for auto-vectorization.
#[inline]
pub fn accumulate_autovec(ai: &mut [f32], ef: &[f32]) {
    debug_assert_eq!(ef.len(), 2 * ai.len(), "ef must hold two values per slot");

    for (acc, pair) in ai.iter_mut().zip(ef.chunks_exact(2)) {
        accumulate_one(acc, pair[0], pair[1]);
    }
}

/// Planar layout: real and imaginary parts in separate buffers.
pub fn accumulate_planar(ai: &mut [f32], re: &[f32], im: &[f32]) {
    debug_assert_eq!(re.len(), ai.len(), "re must hold one value per slot");
    debug_assert_eq!(im.len(), ai.len(), "im must hold one value per slot");

    for ((acc, &re), &im) in ai.iter_mut().zip(re).zip(im) {
        accumulate_one(acc, re, im);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Kernel = fn(&mut [f32], &[f32]);

    const KERNELS: [(&str, Kernel); 4] = [
        ("sequential", accumulate_sequential as Kernel),
        ("unrolled4", accumulate_unrolled4 as Kernel),
        ("unrolled8", accumulate_unrolled8 as Kernel),
        ("autovec", accumulate_autovec as Kernel),
    ];

    fn pattern(len: usize) -> (Vec<f32>, Vec<f32>) {
        let ai = (0..len).map(|i| i as f32 * 0.5 - 3.0).collect();
        let ef = (0..2 * len)
            .map(|i| ((i * 7919) % 97) as f32 / 13.0 - 3.5)
            .collect();
        (ai, ef)
    }

    mod known_values {
        use super::*;

        #[test]
        fn test_single_sample() {
            for (name, kernel) in KERNELS {
                let mut ai = [0.0f32];
                kernel(&mut ai, &[3.0, 4.0]);
                assert_eq!(ai, [25.0], "{name}");
            }
        }

        #[test]
        fn test_four_samples() {
            for (name, kernel) in KERNELS {
                let mut ai = [0.0f32; 4];
                kernel(&mut ai, &[1.0, 0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 4.0]);
                assert_eq!(ai, [1.0, 1.0, 8.0, 25.0], "{name}");
            }
        }

        #[test]
        fn test_empty_input() {
            for (_, kernel) in KERNELS {
                let mut ai: [f32; 0] = [];
                kernel(&mut ai, &[]);
            }
        }

        #[test]
        fn test_magnitude_squared_is_exact_in_f64() {
            // 4097² needs 25 significant bits: rounded in f32, exact in f64
            let re = 4097.0f32;
            assert_eq!(magnitude_squared(re, 0.0), 16_785_409.0);
            assert_eq!(magnitude_squared(-3.0, -4.0), 25.0);
        }
    }

    mod remainder {
        use super::*;

        #[test]
        fn test_unrolled4_five_samples() {
            let (mut expected, ef) = pattern(5);
            let mut ai = expected.clone();
            accumulate_sequential(&mut expected, &ef);
            accumulate_unrolled4(&mut ai, &ef);
            assert_eq!(ai, expected);
        }

        #[test]
        fn test_every_length_matches_sequential() {
            for len in 0..=33 {
                let (mut expected, ef) = pattern(len);
                accumulate_sequential(&mut expected, &ef);

                for (name, kernel) in KERNELS {
                    let (mut ai, _) = pattern(len);
                    kernel(&mut ai, &ef);
                    assert_eq!(ai, expected, "{name} diverged at len {len}");
                }
            }
        }
    }

    mod planar {
        use super::*;

        #[test]
        fn test_planar_matches_interleaved() {
            let (mut expected, ef) = pattern(19);
            let mut ai = expected.clone();

            let re: Vec<f32> = ef.iter().step_by(2).copied().collect();
            let im: Vec<f32> = ef.iter().skip(1).step_by(2).copied().collect();

            accumulate_sequential(&mut expected, &ef);
            accumulate_planar(&mut ai, &re, &im);
            assert_eq!(ai, expected);
        }
    }
}
