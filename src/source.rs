//! Backing sources: where pools come from and where they go back to.
use core::{
    alloc::{GlobalAlloc, Layout},
    mem::MaybeUninit,
    ptr::NonNull,
};

use crate::tlsf::ALIGN;

/// A supplier of raw memory pools for [`Tlsf`](crate::Tlsf).
///
/// This is the growth and shrink seam of the allocator: `map` is consulted
/// when no free block can satisfy a request, and `unmap` hands a drained
/// pool back. A source typically wraps an operating-system facility
/// ([`MmapSource`]), a parent allocator ([`GlobalAllocSource`]), or a
/// caller-owned region ([`ArenaSource`]).
///
/// # Safety
///
/// Implementations must uphold, for every successful `map` call:
///
///  - the returned region is valid for reads and writes until it is passed
///    to `unmap` or the source is dropped, and nothing else accesses it;
///  - the region starts at an [`ALIGN`]-aligned address;
///  - the region's length is a multiple of `ALIGN`, at least the requested
///    minimum, and below [`BLOCK_SIZE_MAX`](crate::BLOCK_SIZE_MAX);
///  - the region does not overlap any region previously returned by `map`
///    and not yet unmapped.
pub unsafe trait PoolSource {
    /// Obtain a region of at least `min_len` bytes. The fat pointer's
    /// length reports the size actually granted, which may be larger.
    /// Returns `None` when no memory can be supplied; the allocator treats
    /// that as allocation failure, not as an error.
    ///
    /// # Safety
    ///
    /// The caller must not ask for a zero `min_len`.
    unsafe fn map(&mut self, min_len: usize) -> Option<NonNull<[u8]>>;

    /// Release a region. Called with exactly a pointer and length
    /// previously returned by `map`, at most once per region.
    ///
    /// Never called when [`supports_unmap`](Self::supports_unmap) is
    /// `false`; the provided body is for such sources.
    ///
    /// # Safety
    ///
    /// `(pool, len)` must be a mapped, not yet unmapped region of `self`.
    unsafe fn unmap(&mut self, pool: NonNull<u8>, len: usize) {
        let _ = (pool, len);
        debug_assert!(
            !self.supports_unmap(),
            "`unmap` must be overridden when `supports_unmap` returns true"
        );
    }

    /// Whether the allocator may hand regions back via
    /// [`unmap`](Self::unmap). When `false`, drained pools are retained
    /// and reused for the life of the allocator.
    fn supports_unmap(&self) -> bool {
        false
    }
}

/// A source that serves a single caller-owned region, once.
///
/// The first `map` hands out the whole arena (trimmed to alignment); any
/// further growth request fails. Suited to `no_std` environments where the
/// heap is a `static` buffer or a region carved out by a boot allocator.
pub struct ArenaSource<'a> {
    arena: Option<&'a mut [MaybeUninit<u8>]>,
}

impl<'a> ArenaSource<'a> {
    /// Wrap `arena`. The allocator never reads uninitialized bytes, and
    /// regards the arena's contents as garbage from here on.
    pub fn new(arena: &'a mut [MaybeUninit<u8>]) -> Self {
        Self { arena: Some(arena) }
    }
}

unsafe impl PoolSource for ArenaSource<'_> {
    unsafe fn map(&mut self, min_len: usize) -> Option<NonNull<[u8]>> {
        let arena = self.arena.take()?;

        // Trim to an aligned start and an ALIGN-multiple length.
        let unaligned_start = arena.as_mut_ptr() as usize;
        let start = (unaligned_start.wrapping_add(ALIGN - 1)) & !(ALIGN - 1);
        let len = match arena.len().checked_sub(start - unaligned_start) {
            Some(len) => len & !(ALIGN - 1),
            None => 0,
        };

        if len < min_len {
            // Too small for this request; keep the arena for a smaller one.
            self.arena = Some(arena);
            return None;
        }

        Some(NonNull::slice_from_raw_parts(
            NonNull::new_unchecked(start as *mut u8),
            len,
        ))
    }
}

/// A source that maps pools from a parent [`GlobalAlloc`].
///
/// Grants exactly the requested length (rounded up to [`ALIGN`]), which
/// makes the allocator's footprint track its demand closely.
#[derive(Debug, Default)]
pub struct GlobalAllocSource<A>(pub A);

unsafe impl<A: GlobalAlloc> PoolSource for GlobalAllocSource<A> {
    unsafe fn map(&mut self, min_len: usize) -> Option<NonNull<[u8]>> {
        debug_assert_ne!(min_len, 0);
        let len = min_len.checked_add(ALIGN - 1)? & !(ALIGN - 1);
        let layout = Layout::from_size_align(len, ALIGN).ok()?;
        let ptr = NonNull::new(self.0.alloc(layout))?;
        Some(NonNull::slice_from_raw_parts(ptr, len))
    }

    unsafe fn unmap(&mut self, pool: NonNull<u8>, len: usize) {
        // `len` is exactly what `map` granted, so this layout matches.
        let layout = Layout::from_size_align_unchecked(len, ALIGN);
        self.0.dealloc(pool.as_ptr(), layout);
    }

    fn supports_unmap(&self) -> bool {
        true
    }
}

/// [`GlobalAllocSource`] over the operating system's allocator.
#[cfg(feature = "std")]
pub type SystemSource = GlobalAllocSource<std::alloc::System>;

/// A source backed by anonymous memory mappings.
///
/// Requests are rounded up to whole pages, so small pools get room to grow
/// into before the allocator has to map again.
#[cfg(unix)]
pub struct MmapSource {
    /// Page size minus one; 0 until first queried.
    page_size_m1: usize,
}

#[cfg(unix)]
impl MmapSource {
    pub const fn new() -> Self {
        Self { page_size_m1: 0 }
    }

    fn page_size_m1(&mut self) -> usize {
        if self.page_size_m1 == 0 {
            let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
            assert!(
                page_size.is_power_of_two() && page_size >= ALIGN,
                "unusable page size"
            );
            self.page_size_m1 = page_size - 1;
        }
        self.page_size_m1
    }
}

#[cfg(unix)]
impl Default for MmapSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
unsafe impl PoolSource for MmapSource {
    unsafe fn map(&mut self, min_len: usize) -> Option<NonNull<[u8]>> {
        let page_size_m1 = self.page_size_m1();
        let len = min_len.checked_add(page_size_m1)? & !page_size_m1;

        let ptr = libc::mmap(
            core::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_ANONYMOUS | libc::MAP_PRIVATE,
            -1,
            0,
        );
        if ptr == libc::MAP_FAILED {
            return None;
        }

        Some(NonNull::slice_from_raw_parts(
            NonNull::new(ptr as *mut u8)?,
            len,
        ))
    }

    unsafe fn unmap(&mut self, pool: NonNull<u8>, len: usize) {
        let ret = libc::munmap(pool.as_ptr() as *mut _, len);
        debug_assert_eq!(ret, 0, "munmap of a mapped pool failed");
    }

    fn supports_unmap(&self) -> bool {
        true
    }
}
