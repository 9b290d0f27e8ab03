// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Block codecs: four interchangeable encodings for one 256-position block
//! of the BWT, each answering intra-block Access and Rank.
//!
//! Every block is stored under whichever codec yields the fewest body
//! bytes (see [`choose`]):
//!
//! - **Single**: one distinct symbol; no body at all.
//! - **Run-length**: `(symbol, length)` pairs; wins on long runs.
//! - **Sparse**: positions of everything *except* the dominant symbol;
//!   wins when one symbol owns nearly the whole block.
//! - **Low-width code**: fixed k-bit packing; the dense fallback.
//!
//! Intra-block queries return 1-based ranks counting positions `0..=p`,
//! which composes with the exclusive cross-block rank of the super-block
//! layer. All scans are linear in the block size; the two-level rank
//! structure keeps that the only linear factor in a query.

use std::ops::Range;

use crate::histogram::BlockHistogram;
use crate::types::CodecTag;

pub(crate) mod huffman;
pub(crate) mod lwc;
pub(crate) mod runlen;
pub(crate) mod sparse;

/// Runtime form of one encoded block. Body and symbol ranges index the
/// index-wide body buffer and flat symbol array; the variants carry just
/// enough state to answer Access/Rank against those slices.
#[derive(Debug, Clone)]
pub(crate) enum BlockCodec {
    /// A block of `c` repeated; Access/Rank are arithmetic.
    Single { c: u8 },
    RunLen { body: Range<usize> },
    Sparse { mfc: u8, body: Range<usize> },
    /// Bit-packed body plus the block's symbol span, needed to map packed
    /// ordinals back to dense symbols on expansion.
    Lwc { body: Range<usize>, chars: Range<usize> },
}

/// Pick the cheapest codec for a block with the given histogram.
///
/// A single run means a single symbol and an empty body. Otherwise the
/// run-length and sparse estimates compete (ties to run-length), and only a
/// winner of at most 16 body bytes beats the fixed-width packing.
pub(crate) fn choose(h: &BlockHistogram) -> CodecTag {
    if h.runs == 1 {
        return CodecTag::Single;
    }

    let rl = runlen::comp_sz(h.runs);
    let sp = sparse::comp_sz(&h.freqs);
    let (tag, sz) = if rl > sp {
        (CodecTag::Sparse, sp)
    } else {
        (CodecTag::RunLen, rl)
    };

    if sz <= 16 {
        tag
    } else {
        CodecTag::Lwc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::block_histogram;

    #[test]
    fn single_run_is_single() {
        assert_eq!(choose(&block_histogram(&[7; 200])), CodecTag::Single);
        assert_eq!(choose(&block_histogram(&[7; 256])), CodecTag::Single);
    }

    #[test]
    fn few_runs_pick_runlen() {
        // 4 runs -> 8 body bytes, beats sparse (2 * 96 outliers)
        let mut block = vec![3u8; 64];
        block.extend_from_slice(&[5; 64]);
        block.extend_from_slice(&[3; 64]);
        block.extend_from_slice(&[5; 64]);
        assert_eq!(choose(&block_histogram(&block)), CodecTag::RunLen);
    }

    #[test]
    fn dominant_symbol_picks_sparse() {
        let mut block = vec![9u8; 256];
        block[17] = 30;
        block[200] = 40;
        // 5 runs (10 bytes) vs 2 outliers (4 bytes)
        assert_eq!(choose(&block_histogram(&block)), CodecTag::Sparse);
    }

    #[test]
    fn dense_blocks_fall_back_to_lwc() {
        let block: Vec<u8> = (0..=255u8).collect();
        assert_eq!(choose(&block_histogram(&block)), CodecTag::Lwc);
    }

    #[test]
    fn chosen_pair_codec_fits_its_estimate() {
        // the sparse estimate (sum of freqs[1..]) upper-bounds the real
        // body, so a chosen candidate never exceeds the 16-byte rule
        let mut block = vec![1u8; 256];
        for i in 0..5 {
            block[i * 50 + 3] = 200;
        }
        let h = block_histogram(&block);
        let tag = choose(&h);
        assert_eq!(tag, CodecTag::Sparse);
        let mut body = Vec::new();
        let written = sparse::encode(&mut body, &block, h.mfc);
        assert!(written <= 16);
    }
}
