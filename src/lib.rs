//! Accumulation of squared magnitudes of interleaved complex samples.
//!
//! For `i < len`, every kernel in this crate performs
//!
//! ```text
//! ai[i] = f32( f64(ai[i]) + f64(ef[2i])² + f64(ef[2i+1])² )
//! ```
//!
//! The kernels differ only in loop shape (sequential, unrolled by 4 or 8,
//! auto-vectorization friendly, SSE2, AVX2, NEON) and agree bit-for-bit.
//! Buffers belong to the caller; nothing here allocates.
//!
//! ```rust
//! use magsq::MagnitudeAccumulate;
//!
//! let mut ai = vec![0.0f32; 2];
//! ai.accumulate_magnitudes(&[3.0f32, 4.0, 1.0, 1.0][..]);
//! ai.accumulate_magnitudes(&[3.0f32, 4.0, 1.0, 1.0][..]);
//! assert_eq!(ai, [50.0, 4.0]);
//! ```

mod accumulate;

pub mod array;
pub mod error;
pub mod scalar;
pub mod simd;
pub mod utils;

pub use accumulate::{
    accumulate_magnitudes, par_accumulate_magnitudes, try_accumulate_magnitudes, PARALLEL_CHUNK,
    PARALLEL_THRESHOLD,
};
pub use simd::{Backend, MagnitudeAccumulate};
