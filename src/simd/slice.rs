use num::Complex;

use crate::scalar;
use crate::simd::traits::MagnitudeAccumulate;

/// Views complex samples as interleaved `[re, im, re, im, ...]` values.
#[inline(always)]
pub fn interleaved(samples: &[Complex<f32>]) -> &[f32] {
    // SAFETY: Complex<T> is #[repr(C)] with fields `re` then `im`, so `n`
    // complex values are laid out as `2 * n` contiguous T.
    unsafe { std::slice::from_raw_parts(samples.as_ptr().cast::<f32>(), samples.len() * 2) }
}

#[inline(always)]
fn checked_samples(len: usize, ef: &[f32]) -> &[f32] {
    assert!(
        ef.len() / 2 >= len,
        "Samples must hold two values per accumulator slot ({} slots, {} values)",
        len,
        ef.len()
    );

    &ef[..2 * len]
}

impl<'b> MagnitudeAccumulate<&'b [f32]> for [f32] {
    #[inline(always)]
    fn accumulate_magnitudes(&mut self, samples: &'b [f32]) {
        let ef = checked_samples(self.len(), samples);
        crate::accumulate_magnitudes(self.len(), self, ef)
    }

    #[inline(always)]
    fn par_accumulate_magnitudes(&mut self, samples: &'b [f32]) {
        let ef = checked_samples(self.len(), samples);
        crate::par_accumulate_magnitudes(self.len(), self, ef)
    }

    #[inline(always)]
    fn scalar_accumulate_magnitudes(&mut self, samples: &'b [f32]) {
        let ef = checked_samples(self.len(), samples);
        scalar::accumulate_sequential(self, ef)
    }
}

impl<'b> MagnitudeAccumulate<&'b [Complex<f32>]> for [f32] {
    #[inline(always)]
    fn accumulate_magnitudes(&mut self, samples: &'b [Complex<f32>]) {
        self.accumulate_magnitudes(interleaved(samples))
    }

    #[inline(always)]
    fn par_accumulate_magnitudes(&mut self, samples: &'b [Complex<f32>]) {
        self.par_accumulate_magnitudes(interleaved(samples))
    }

    #[inline(always)]
    fn scalar_accumulate_magnitudes(&mut self, samples: &'b [Complex<f32>]) {
        self.scalar_accumulate_magnitudes(interleaved(samples))
    }
}

impl<S> MagnitudeAccumulate<S> for Vec<f32>
where
    [f32]: MagnitudeAccumulate<S>,
{
    #[inline(always)]
    fn accumulate_magnitudes(&mut self, samples: S) {
        self.as_mut_slice().accumulate_magnitudes(samples)
    }

    #[inline(always)]
    fn par_accumulate_magnitudes(&mut self, samples: S) {
        self.as_mut_slice().par_accumulate_magnitudes(samples)
    }

    #[inline(always)]
    fn scalar_accumulate_magnitudes(&mut self, samples: S) {
        self.as_mut_slice().scalar_accumulate_magnitudes(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_layout() {
        let samples = [Complex::new(1.0f32, 2.0), Complex::new(3.0, 4.0)];
        assert_eq!(interleaved(&samples), &[1.0, 2.0, 3.0, 4.0]);
        assert!(interleaved(&[]).is_empty());
    }

    #[test]
    fn test_complex_and_interleaved_agree() {
        let samples: Vec<Complex<f32>> = (0..13)
            .map(|i| Complex::new(i as f32 * 0.5, 3.0 - i as f32))
            .collect();
        let flat: Vec<f32> = samples.iter().flat_map(|c| [c.re, c.im]).collect();

        let mut from_complex = vec![1.0f32; 13];
        let mut from_flat = vec![1.0f32; 13];

        from_complex.accumulate_magnitudes(samples.as_slice());
        from_flat.accumulate_magnitudes(flat.as_slice());

        assert_eq!(from_complex, from_flat);
    }

    #[test]
    fn test_longer_samples_are_truncated() {
        let mut ai = vec![0.0f32; 2];
        ai.scalar_accumulate_magnitudes(&[3.0f32, 4.0, 1.0, 1.0, 100.0, 100.0][..]);
        assert_eq!(ai, [25.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "two values per accumulator slot")]
    fn test_short_samples_panic() {
        let mut ai = vec![0.0f32; 3];
        ai.accumulate_magnitudes(&[1.0f32, 2.0, 3.0, 4.0, 5.0][..]);
    }
}
