// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scratch segments: zeroed, block-sized buffers for hot-path expansion.
//!
//! Low-width-code blocks are unpacked into a full block of one-byte symbols
//! before Rank/Access can scan them, and the encoder needs a 256-entry
//! symbol-remap table per block. Both want a buffer that costs nothing to
//! acquire in steady state.
//!
//! Segments live in per-thread pools. [`free_segment`] pops a buffer (or
//! allocates when the pool is dry), zeroes it, and returns an RAII guard;
//! dropping the guard returns the buffer to the pool of the releasing
//! thread. [`set_segment_cache`] caps how many buffers each thread retains,
//! which bounds idle scratch memory at `threads × cache × 256` bytes.
//! Because ownership is per-thread, concurrent queries never contend and
//! never trample each other's scratch, whatever the cache size.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::SZ;

static CACHE_SIZE: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static POOL: RefCell<Vec<Box<[u8; SZ]>>> = const { RefCell::new(Vec::new()) };
}

/// Cap the number of scratch segments each thread keeps between
/// acquisitions. One is enough for every query path in this crate; raise it
/// only if an embedding holds several segments alive at once.
pub fn set_segment_cache(sz: usize) {
    CACHE_SIZE.store(sz.max(1), Ordering::Relaxed);
}

/// A zeroed block-sized scratch buffer, returned to the thread's pool on
/// drop.
pub(crate) struct Segment(Option<Box<[u8; SZ]>>);

impl Deref for Segment {
    type Target = [u8; SZ];

    #[inline]
    fn deref(&self) -> &[u8; SZ] {
        self.0.as_ref().expect("segment taken")
    }
}

impl DerefMut for Segment {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8; SZ] {
        self.0.as_mut().expect("segment taken")
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        if let Some(buf) = self.0.take() {
            POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < CACHE_SIZE.load(Ordering::Relaxed) {
                    pool.push(buf);
                }
            });
        }
    }
}

/// Acquire a zeroed scratch segment from the current thread's pool.
pub(crate) fn free_segment() -> Segment {
    let mut buf = POOL
        .with(|pool| pool.borrow_mut().pop())
        .unwrap_or_else(|| Box::new([0u8; SZ]));
    buf.fill(0);
    Segment(Some(buf))
}
