use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{layout_error, Result};

/// Alignment that lets every vector kernel take its aligned load/store path.
pub const DEFAULT_ALIGNMENT: usize = 32;

/// A zero-initialized `f32` buffer with a caller-chosen alignment.
///
/// The kernels never allocate; this is for callers (and the benches) that
/// want accumulators and sample buffers on a 16- or 32-byte boundary so the
/// SSE2/AVX2 kernels use aligned loads and stores.
///
/// The memory is released with the same layout it was allocated with, so
/// unlike `Vec::from_raw_parts` on an over-aligned pointer this never hands
/// an over-aligned block to `Vec`'s deallocator.
///
/// # Example
///
/// ```rust
/// use magsq::utils::AlignedBuffer;
///
/// let mut ai = AlignedBuffer::new(4, 16);
/// let ef = [1.0f32, 0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 4.0];
///
/// magsq::accumulate_magnitudes(4, &mut ai, &ef);
/// assert_eq!(&ai[..], &[1.0, 1.0, 8.0, 25.0]);
/// assert_eq!(ai.as_ptr() as usize % 16, 0);
/// ```
pub struct AlignedBuffer {
    ptr: NonNull<f32>,
    len: usize,
    layout: Layout,
}

// SAFETY: the buffer exclusively owns its allocation, like Vec<f32>.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocates `len` zeroed values aligned to `align` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two, is smaller than the alignment
    /// of `f32`, or the size overflows. Aborts through `handle_alloc_error`
    /// if the allocator fails.
    pub fn new(len: usize, align: usize) -> Self {
        match Self::try_new(len, align) {
            Ok(buffer) => buffer,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`AlignedBuffer::new`].
    pub fn try_new(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align < mem::align_of::<f32>() {
            return Err(layout_error(
                len,
                align,
                "alignment must be a power of two and at least 4",
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<f32>())
            .ok_or_else(|| layout_error(len, align, "size overflows usize"))?;

        let layout = Layout::from_size_align(size, align)
            .map_err(|err| layout_error(size, align, err.to_string()))?;

        if size == 0 {
            // Zero-sized allocations are not allowed; any aligned non-null
            // pointer is a valid empty slice.
            let dangling = align as *mut f32;
            return Ok(Self {
                ptr: NonNull::new(dangling).unwrap_or(NonNull::dangling()),
                len: 0,
                layout,
            });
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut f32;

        let ptr = match NonNull::new(raw) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        };

        Ok(Self { ptr, len, layout })
    }

    /// Allocates with [`DEFAULT_ALIGNMENT`] and copies `values` in.
    pub fn from_slice(values: &[f32]) -> Self {
        let mut buffer = Self::new(values.len(), DEFAULT_ALIGNMENT);
        buffer.copy_from_slice(values);
        buffer
    }

    /// Alignment in bytes the buffer was allocated with.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in try_new with exactly this layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, self.layout) };
        }
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        // SAFETY: ptr is valid, aligned and initialized for len values.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as in deref, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("alignment", &self.alignment())
            .field("values", &&self[..])
            .finish()
    }
}

impl From<AlignedBuffer> for Vec<f32> {
    fn from(buffer: AlignedBuffer) -> Self {
        buffer.to_vec()
    }
}
