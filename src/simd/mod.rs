//! Explicit vector kernels and backend detection.
//!
//! - [`sse2`]: x86_64 baseline, always compiled there.
//! - [`avx2`]: compiled when `build.rs` emits `cfg(avx2)`, used only after
//!   `is_x86_feature_detected!("avx2")` confirms support at runtime.
//! - [`neon`]: compiled when `build.rs` emits `cfg(neon)` on aarch64.
//!
//! [`Backend::detect`] picks the kernel the public entry points run. When no
//! vector backend applies, they fall back to
//! [`scalar::accumulate_autovec`](crate::scalar::accumulate_autovec).

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(all(avx2, target_arch = "x86_64"))]
pub mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod slice;
pub mod traits;

pub use slice::interleaved;
pub use traits::MagnitudeAccumulate;

use crate::scalar;

/// Alignment in bytes of four packed f32 values.
///
/// The x86 kernels use `_mm_load_ps` / `_mm_store_ps` on pointers that meet
/// this boundary and the unaligned forms otherwise.
#[cfg(target_arch = "x86_64")]
pub(crate) const F32X4_ALIGNMENT: usize = 16;

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn is_aligned(ptr: *const f32) -> bool {
    (ptr as usize) % F32X4_ALIGNMENT == 0
}

/// Kernel family selected for the running CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Avx2,
    Neon,
    Scalar,
}

impl Backend {
    /// Detects the best kernel usable on this CPU.
    ///
    /// The standard library caches feature detection, so this is cheap enough
    /// to call once per kernel invocation.
    #[inline]
    pub fn detect() -> Self {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        if is_x86_feature_detected!("avx2") {
            return Backend::Avx2;
        }

        #[cfg(all(neon, target_arch = "aarch64"))]
        if std::arch::is_aarch64_feature_detected!("neon") {
            return Backend::Neon;
        }

        Backend::Scalar
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Avx2 => "avx2",
            Backend::Neon => "neon",
            Backend::Scalar => "scalar",
        }
    }

    /// Runs this backend's kernel on exactly-sized buffers.
    ///
    /// A backend the CPU cannot run (only possible for a value not obtained
    /// from [`Backend::detect`]) degrades to the scalar kernel.
    ///
    /// # Panics
    ///
    /// Panics before writing anything unless `ef` holds exactly
    /// `2 * ai.len()` values.
    #[inline]
    pub fn accumulate(self, ai: &mut [f32], ef: &[f32]) {
        assert_eq!(ef.len(), 2 * ai.len(), "ef must hold two values per slot");

        match self {
            #[cfg(all(avx2, target_arch = "x86_64"))]
            Backend::Avx2 if is_x86_feature_detected!("avx2") => {
                // SAFETY: AVX2 support was checked just above, lengths at entry.
                unsafe { avx2::accumulate(ai, ef) }
            }
            #[cfg(all(neon, target_arch = "aarch64"))]
            Backend::Neon if std::arch::is_aarch64_feature_detected!("neon") => {
                // SAFETY: NEON support was checked just above, lengths at entry.
                unsafe { neon::accumulate(ai, ef) }
            }
            _ => scalar::accumulate_autovec(ai, ef),
        }
    }
}
