// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared constants and the small plain types of the runtime metadata.

/// Block size: positions of BWT covered by one encoded block.
pub(crate) const SZ: usize = 256;

/// Super-block span, in blocks. A cumulative rank snapshot is taken every
/// `SBSZ` blocks.
pub(crate) const SBSZ: usize = 8;

/// Most significant bit of a header tag byte.
pub(crate) const MSB: u8 = 1 << 7;

/// Sentinel in `fidx`/`ioe` meaning "no entry". Collides with the
/// legitimate symbol index 255, which only exists when the alphabet is
/// full; the disambiguation rule is `fidx[b] == ABSENT && b != 255`.
pub(crate) const ABSENT: u8 = 255;

/// Block codec identifier as stored in the 2-bit header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodecTag {
    Single = 0,
    RunLen = 1,
    Sparse = 2,
    Lwc = 3,
}

impl CodecTag {
    /// Decode a 2-bit tag.
    pub(crate) fn from_bits(bits: u8) -> CodecTag {
        match bits & 0x3 {
            0 => CodecTag::Single,
            1 => CodecTag::RunLen,
            2 => CodecTag::Sparse,
            _ => CodecTag::Lwc,
        }
    }
}

/// One entry of the end-of-bucket table: `v` is the exclusive upper bound
/// of symbol `b`'s bucket in BWT sort order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BucketEnd {
    pub v: usize,
    pub b: u8,
}

/// Cumulative state snapshot taken every [`SBSZ`] blocks.
///
/// `rank[s]` counts occurrences of dense symbol `s` strictly before the
/// super-block boundary; `offset` indexes the flat symbol/frequency record
/// arrays at that boundary.
#[derive(Clone)]
pub(crate) struct SuperBlock {
    pub rank: [usize; 256],
    pub offset: usize,
}
