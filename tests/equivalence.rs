//! Every kernel against the sequential f64 reference.
//!
//! Inputs are random but seeded, lengths cover empty input, every tail size
//! of the unrolled and vector kernels, and sizes large enough for the
//! parallel path.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use magsq::{scalar, Backend};

type Kernel = fn(&mut [f32], &[f32]);

fn avx2(ai: &mut [f32], ef: &[f32]) {
    Backend::Avx2.accumulate(ai, ef)
}

fn neon(ai: &mut [f32], ef: &[f32]) {
    Backend::Neon.accumulate(ai, ef)
}

fn dispatched(ai: &mut [f32], ef: &[f32]) {
    magsq::accumulate_magnitudes(ai.len(), ai, ef)
}

fn parallel(ai: &mut [f32], ef: &[f32]) {
    magsq::par_accumulate_magnitudes(ai.len(), ai, ef)
}

fn kernels() -> Vec<(&'static str, Kernel)> {
    let mut kernels: Vec<(&'static str, Kernel)> = vec![
        ("unrolled4", scalar::accumulate_unrolled4 as Kernel),
        ("unrolled8", scalar::accumulate_unrolled8 as Kernel),
        ("unrolled3", scalar::accumulate_unrolled::<3> as Kernel),
        ("autovec", scalar::accumulate_autovec as Kernel),
        ("avx2", avx2 as Kernel),
        ("neon", neon as Kernel),
        ("dispatched", dispatched as Kernel),
        ("parallel", parallel as Kernel),
    ];

    #[cfg(target_arch = "x86_64")]
    kernels.push(("sse2", magsq::simd::sse2::accumulate as Kernel));

    kernels
}

fn random_buffers(rng: &mut StdRng, len: usize, range: f32) -> (Vec<f32>, Vec<f32>) {
    let ai = (0..len).map(|_| rng.random_range(0.0..=range)).collect();
    let ef = (0..2 * len)
        .map(|_| rng.random_range(-range..=range))
        .collect();
    (ai, ef)
}

/// Tolerance for a value of magnitude `reference`: a few f32 ulps.
fn assert_close(name: &str, actual: &[f32], reference: &[f32]) {
    assert_eq!(actual.len(), reference.len(), "{name}: length changed");

    for (i, (&a, &r)) in actual.iter().zip(reference).enumerate() {
        let tolerance = r.abs() * 4.0 * f32::EPSILON;
        assert!(
            (a - r).abs() <= tolerance,
            "{name}: index {i} got {a}, reference {r}, tolerance {tolerance:.2e}"
        );
    }
}

#[test]
fn test_all_kernels_match_reference_for_short_lengths() {
    let mut rng = StdRng::seed_from_u64(12345);

    for len in 0..=67 {
        let (initial, ef) = random_buffers(&mut rng, len, 100.0);

        let mut reference = initial.clone();
        scalar::accumulate_sequential(&mut reference, &ef);

        for (name, kernel) in kernels() {
            let mut ai = initial.clone();
            kernel(&mut ai, &ef);
            assert_close(name, &ai, &reference);
        }
    }
}

#[test]
fn test_all_kernels_match_reference_across_magnitudes() {
    let mut rng = StdRng::seed_from_u64(42);

    for range in [1e-3f32, 1.0, 1e3, 1e6] {
        let (initial, ef) = random_buffers(&mut rng, 1_003, range);

        let mut reference = initial.clone();
        scalar::accumulate_sequential(&mut reference, &ef);

        for (name, kernel) in kernels() {
            let mut ai = initial.clone();
            kernel(&mut ai, &ef);
            assert_close(name, &ai, &reference);
        }
    }
}

#[test]
fn test_parallel_path_matches_reference() {
    let mut rng = StdRng::seed_from_u64(7);
    let len = magsq::PARALLEL_THRESHOLD * 2 + 5;
    let (initial, ef) = random_buffers(&mut rng, len, 10.0);

    let mut reference = initial.clone();
    scalar::accumulate_sequential(&mut reference, &ef);

    let mut ai = initial;
    magsq::par_accumulate_magnitudes(len, &mut ai, &ef);
    assert_close("parallel", &ai, &reference);
}

#[test]
fn test_reverse_block_order_matches_forward() {
    let mut rng = StdRng::seed_from_u64(99);
    let len = 4 * 37 + 3;
    let (initial, ef) = random_buffers(&mut rng, len, 50.0);

    let mut forward = initial.clone();
    magsq::accumulate_magnitudes(len, &mut forward, &ef);

    // Same kernel, blocks of 4 samples visited last to first
    let mut reversed = initial;
    let blocks: Vec<(usize, usize)> = (0..len)
        .step_by(4)
        .map(|start| (start, (start + 4).min(len)))
        .collect();

    for &(start, end) in blocks.iter().rev() {
        magsq::accumulate_magnitudes(end - start, &mut reversed[start..end], &ef[2 * start..2 * end]);
    }

    assert_eq!(forward, reversed);
}

#[test]
fn test_misaligned_buffers_match_reference() {
    let mut rng = StdRng::seed_from_u64(2024);
    let (initial, ef) = random_buffers(&mut rng, 64, 20.0);

    for ai_offset in 0..4 {
        for ef_offset in 0..4 {
            let len = 64 - ai_offset.max(ef_offset);
            let ef_view = &ef[2 * ef_offset..2 * (ef_offset + len)];

            let mut reference = initial.clone();
            scalar::accumulate_sequential(&mut reference[ai_offset..ai_offset + len], ef_view);

            for (name, kernel) in kernels() {
                let mut ai = initial.clone();
                kernel(&mut ai[ai_offset..ai_offset + len], ef_view);
                assert_close(name, &ai, &reference);
            }
        }
    }
}

#[test]
fn test_detected_backend_is_runnable() {
    let backend = Backend::detect();
    println!("detected backend: {}", backend.name());

    let mut ai = [0.0f32; 9];
    let ef = [2.0f32; 18];
    backend.accumulate(&mut ai, &ef);
    assert_eq!(ai, [8.0; 9]);
}
