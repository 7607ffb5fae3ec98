//! AVX 4-lane f64 vector fed from f32 memory.
//!
//! `F64x4` wraps an `__m256d` register. It is loaded from four packed `f32`
//! values, which are widened to double precision, and stored back by
//! narrowing to four `f32`. This is the shape the magnitude kernel needs:
//! samples and accumulators live in single precision, arithmetic happens in
//! double precision.
//!
//! # Supported Operations
//!
//! - `load_widened()` - 4 × f32 → 4 × f64, aligned or unaligned
//! - `store_narrowed_at()` - 4 × f64 → 4 × f32, aligned or unaligned
//! - `hadd()` - pairwise horizontal add across two vectors
//! - `permute4x64()` - cross-lane permutation
//! - Element-wise `+` and `*`

use std::arch::x86_64::*;

use std::ops::{Add, Mul};

use crate::simd::is_aligned;

/// Number of f64 lanes in a 256-bit register.
pub(crate) const LANE_COUNT: usize = 4;

/// Four packed f64 values in an AVX register.
#[derive(Copy, Clone, Debug)]
pub struct F64x4 {
    pub elements: __m256d,
}

impl F64x4 {
    /// Loads four f32 values and widens them to f64.
    ///
    /// Chooses the aligned load when `ptr` is 16-byte aligned.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least 4 readable f32 values and the CPU must
    /// support AVX.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn load_widened(ptr: *const f32) -> Self {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let packed = match is_aligned(ptr) {
            true => _mm_load_ps(ptr),
            false => _mm_loadu_ps(ptr),
        };

        Self {
            elements: _mm256_cvtps_pd(packed),
        }
    }

    /// Narrows the four lanes to f32 (round to nearest) and stores them.
    ///
    /// Chooses the aligned store when `ptr` is 16-byte aligned.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least 4 writable f32 values and the CPU must
    /// support AVX.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn store_narrowed_at(&self, ptr: *mut f32) {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let packed = _mm256_cvtpd_ps(self.elements);

        match is_aligned(ptr) {
            true => _mm_store_ps(ptr, packed),
            false => _mm_storeu_ps(ptr, packed),
        }
    }

    /// Pairwise horizontal add.
    ///
    /// Returns `[a0 + a1, b0 + b1, a2 + a3, b2 + b3]` for `self = a`, `other = b`.
    ///
    /// # Safety
    ///
    /// The CPU must support AVX.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn hadd(&self, other: Self) -> Self {
        Self {
            elements: _mm256_hadd_pd(self.elements, other.elements),
        }
    }

    /// Permutes the four lanes across the 128-bit halves.
    ///
    /// Lane `k` of the result is lane `(MASK >> 2k) & 3` of `self`.
    ///
    /// # Safety
    ///
    /// The CPU must support AVX2.
    #[inline]
    #[target_feature(enable = "avx2")]
    pub unsafe fn permute4x64<const MASK: i32>(&self) -> Self {
        Self {
            elements: _mm256_permute4x64_pd::<MASK>(self.elements),
        }
    }
}

impl Add for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_add_pd(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_mul_pd(self.elements, rhs.elements) },
        }
    }
}
