//! This crate implements the TLSF (Two-Level Segregated Fit) dynamic memory
//! allocation algorithm¹ over a set of memory pools obtained on demand from
//! a caller-supplied backing source.
//!
//!  - **Allocation and deallocation complete in constant time.** The only
//!    unbounded work happens inside the backing source, and only when a
//!    pool boundary is crossed.
//!
//!  - **The memory footprint follows the demand.** When no free block fits,
//!    the allocator maps a new pool from its [`PoolSource`]; when a mapped
//!    pool drains completely, it is handed back at once. Only the initial
//!    pool stays for the allocator's whole life.
//!
//!  - **This crate supports `#![no_std]`.** Bring your own source: a static
//!    arena ([`ArenaSource`]), a parent allocator ([`GlobalAllocSource`]),
//!    or anonymous mappings ([`MmapSource`] on Unix).
//!
//! <sub>¹ M. Masmano, I. Ripoll, A. Crespo and J. Real, "TLSF: a new
//! dynamic memory allocator for real-time systems," *Proceedings. 16th
//! Euromicro Conference on Real-Time Systems*, 2004. ECRTS 2004., Catania,
//! Italy, 2004, pp. 79-88, doi: 10.1109/EMRTS.2004.1311009.</sub>
//!
//! # Examples
//!
//! ```rust
//! use segfit::{ArenaSource, Tlsf};
//! use std::mem::MaybeUninit;
//!
//! let mut arena = [MaybeUninit::uninit(); 65536];
//! let mut tlsf = Tlsf::new(ArenaSource::new(&mut arena)).unwrap();
//!
//! unsafe {
//!     let mut ptr1 = tlsf.allocate(8).unwrap().cast::<u64>();
//!     let mut ptr2 = tlsf.allocate(8).unwrap().cast::<u64>();
//!     *ptr1.as_mut() = 42;
//!     *ptr2.as_mut() = 56;
//!     assert_eq!(*ptr1.as_ref(), 42);
//!     assert_eq!(*ptr2.as_ref(), 56);
//!     tlsf.deallocate(ptr1.cast());
//!     tlsf.deallocate(ptr2.cast());
//! }
//! ```
//!
//! A source that supports unmapping lets the allocator both grow and
//! shrink:
//!
//! ```rust
//! use segfit::{GlobalAllocSource, Tlsf};
//! use std::alloc::System;
//!
//! let mut tlsf = Tlsf::new(GlobalAllocSource(System)).unwrap();
//! let ptr = tlsf.allocate(4096).unwrap();
//! unsafe { tlsf.deallocate(ptr) };
//! ```
//!
//! # Details
//!
//! ## Block structure
//!
//! Blocks carry a single header word packing the size with three flag bits
//! (free, previous-free, pool-origin). Free blocks additionally thread two
//! list links through their payload, and the word preceding a block's
//! header doubles as a back-link to the previous physical block while that
//! one is free. The net overhead of a used block is one word.
//!
//! ## Sentinels
//!
//! Each pool ends with a zero-size, permanently used sentinel block, so
//! coalescing needs no bounds checks. Empty free lists are plain `None`
//! rather than a shared null-object block.
//!
//! ## Concurrency
//!
//! None. Operations take `&mut self`; callers using an allocator from
//! several contexts must serialize access around it.
#![no_std]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("segfit supports only 64-bit targets.");

mod source;
#[cfg(feature = "stats")]
mod stats;
mod tlsf;

#[cfg(unix)]
pub use self::source::MmapSource;
#[cfg(feature = "std")]
pub use self::source::SystemSource;
pub use self::source::{ArenaSource, GlobalAllocSource, PoolSource};
#[cfg(feature = "stats")]
pub use self::stats::Stats;
pub use self::tlsf::{
    Tlsf, ALIGN, BLOCK_OVERHEAD, BLOCK_SIZE_MAX, BLOCK_SIZE_MIN, POOL_OVERHEAD,
};

#[cfg(any(test, feature = "std"))]
extern crate std;
