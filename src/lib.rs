// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hybrid-encoded FM-index over byte strings.
//!
//! `talpa` stores the Burrows–Wheeler transform of a text in fixed 256-byte
//! blocks, each compressed under whichever of four codecs yields the
//! smallest body, and answers rank, access, counting, substring search, and
//! text extraction directly on the compressed form.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌───────────────────────────────┐
//! │  bwt.rs  │──▶│ builder.rs│──▶│ header.rs                     │
//! │ (reverse,│   │ (split,   │   │ (per-block records, Meta:     │
//! │  sort,   │   │  choose,  │   │  super-blocks, buckets)       │
//! │  BWT)    │   │  encode)  │   └───────────────┬───────────────┘
//! └──────────┘   └─────┬─────┘                   │
//!                      │         ┌───────────────▼───────────────┐
//!                ┌─────▼─────┐   │ index.rs / extract.rs         │
//!                │ codec/    │   │ (access, rank, search, count, │
//!                │ single ·  │   │  locate, restore, fields)     │
//!                │ runlen ·  │   └───────────────────────────────┘
//!                │ sparse ·  │
//!                │ lwc       │
//!                └───────────┘
//! ```
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Ranks are 1-based and inclusive**: `rank(a, p)` counts positions
//!   `0..=p`. Ranges are half-open `(s, e]`. The two cancel in every LF
//!   step; change one and every query goes off by one.
//! - **Dense symbol order is BWT sort order**: symbol 0 is the sentinel,
//!   and for byte alphabets density is monotone in byte value.
//! - **Blocks are 256 positions**, super-blocks are 8 blocks. The header
//!   format and the rank arithmetic both hard-code these.
//! - **The index covers the reversed text.** Search consumes patterns
//!   left-to-right, extraction walks the original text forward; both
//!   depend on the reversal done in `bwt`.
//!
//! # Usage
//!
//! ```
//! use talpa::HybridIndex;
//!
//! let idx = HybridIndex::new(b"to be or not to be").unwrap();
//! assert_eq!(idx.count(b"to"), 2);
//! assert!(idx.search(b"question").is_none());
//!
//! // serialize and restore
//! let blob = idx.to_bytes();
//! let back = HybridIndex::from_bytes(idx.len(), idx.dictionary(), &blob).unwrap();
//! assert_eq!(back.count(b"be"), 2);
//! ```

mod builder;
mod bwt;
mod codec;
mod dict;
mod error;
mod extract;
mod header;
mod histogram;
mod index;
mod segment;
mod types;

pub use error::Error;
pub use index::HybridIndex;
pub use segment::set_segment_cache;
