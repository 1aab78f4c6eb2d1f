use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{layout_error, Result};

/// Alignment used for benchmark buffers: one AVX2 register (8 × f32).
pub const BUFFER_ALIGNMENT: usize = 32;

/// A zero-initialized `f32` buffer with a caller-chosen alignment.
///
/// `Vec<f32>` only guarantees 4-byte alignment, and handing a custom-aligned
/// allocation to `Vec::from_raw_parts` would free it with the wrong layout.
/// This container keeps the `Layout` it was allocated with and frees with it.
///
/// It dereferences to `[f32]`, so every slice API (including the rsqrt slice
/// traits) works on it directly.
///
/// # Example
///
/// ```rust
/// use qrsqrt::utils::{AlignedBuffer, BUFFER_ALIGNMENT};
///
/// let mut buffer = AlignedBuffer::zeroed(16, BUFFER_ALIGNMENT).unwrap();
/// buffer.fill(4.0);
/// assert_eq!(buffer.as_ptr() as usize % BUFFER_ALIGNMENT, 0);
/// assert_eq!(buffer[15], 4.0);
/// ```
pub struct AlignedBuffer {
    ptr: NonNull<f32>,
    len: usize,
    layout: Layout,
}

// SAFETY: the buffer uniquely owns its allocation, like `Vec<f32>`.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocates `len` zeroed elements aligned to `align` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RsqrtError::LayoutError`](crate::error::RsqrtError::LayoutError)
    /// when `align` is not a power of two, is smaller than the natural alignment
    /// of `f32`, or when the byte size overflows.
    ///
    /// # Panics
    ///
    /// If the allocation itself fails, the global allocation error handler is
    /// invoked, which typically aborts.
    pub fn zeroed(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align < mem::align_of::<f32>() {
            return Err(layout_error(
                len,
                align,
                "alignment must be a power of two no smaller than 4",
            ));
        }

        let size_bytes = len
            .checked_mul(mem::size_of::<f32>())
            .ok_or_else(|| layout_error(len, align, "total size overflowed"))?;

        let layout = Layout::from_size_align(size_bytes, align)
            .map_err(|e| layout_error(len, align, e.to_string()))?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len: 0,
                layout,
            });
        }

        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) } as *mut f32;

        let ptr = match NonNull::new(ptr) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        };

        Ok(Self { ptr, len, layout })
    }

    /// The alignment, in bytes, the buffer was allocated with.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in `zeroed` with exactly this layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, self.layout) };
        }
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        // SAFETY: `ptr` is valid for `len` initialized elements (or dangling with len 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("alignment", &self.layout.align())
            .finish()
    }
}
