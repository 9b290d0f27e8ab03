// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Low-width code: fixed k-bit packing of per-block symbol ordinals.
//!
//! The width follows the block's distinct-symbol count: fewer than 3
//! symbols fit in 1 bit each, fewer than 5 in 2, fewer than 17 in 4, and
//! anything denser falls back to a byte per symbol. Queries first expand
//! the packed body into a scratch segment, one dense symbol per byte, then
//! scan linearly; rank accumulates a branch-free equality weight over
//! `0..=p`, which is cheap at block scale.
//!
//! Unpacking goes through precomputed byte-to-ordinals tables, one row per
//! possible packed byte, so expansion is a copy per input byte rather than
//! a shift per symbol.

use crate::segment;
use crate::types::SZ;

/// Unpack tables: row `b` lists the k-bit fields of byte `b`, low bits
/// first.
static UNPACK1: [[u8; 8]; 256] = build_unpack1();
static UNPACK2: [[u8; 4]; 256] = build_unpack2();
static UNPACK4: [[u8; 2]; 256] = build_unpack4();

const fn build_unpack1() -> [[u8; 8]; 256] {
    let mut t = [[0u8; 8]; 256];
    let mut b = 0;
    while b < 256 {
        let mut j = 0;
        while j < 8 {
            t[b][j] = ((b >> j) & 0x1) as u8;
            j += 1;
        }
        b += 1;
    }
    t
}

const fn build_unpack2() -> [[u8; 4]; 256] {
    let mut t = [[0u8; 4]; 256];
    let mut b = 0;
    while b < 256 {
        let mut j = 0;
        while j < 4 {
            t[b][j] = ((b >> (2 * j)) & 0x3) as u8;
            j += 1;
        }
        b += 1;
    }
    t
}

const fn build_unpack4() -> [[u8; 2]; 256] {
    let mut t = [[0u8; 2]; 256];
    let mut b = 0;
    while b < 256 {
        t[b][0] = (b & 0xF) as u8;
        t[b][1] = ((b >> 4) & 0xF) as u8;
        b += 1;
    }
    t
}

/// Symbol at block offset `p` of an expanded body, and its 1-based rank.
pub(crate) fn access(p: usize, bv: &[u8]) -> (u8, usize) {
    let a = bv[p];
    (a, rank(a, p, bv))
}

/// Occurrences of `a` in offsets `0..=p` of an expanded body.
pub(crate) fn rank(a: u8, p: usize, bv: &[u8]) -> usize {
    // equality weight: one per matching byte, no branches in the loop
    bv[..=p].iter().map(|&b| usize::from(b == a)).sum()
}

/// Expand a packed body into `dst`, mapping each packed ordinal to its
/// dense symbol via the block's `symbols` list. Returns the expanded
/// length, which may exceed the true block length by padding ordinals (all
/// zero, so they decode to `symbols[0]` and sit past any queried offset).
pub(crate) fn expand_into(packed: &[u8], symbols: &[u8], dst: &mut [u8; SZ]) -> usize {
    let sz = match symbols.len() {
        0..=2 => {
            for (i, &b) in packed.iter().enumerate() {
                dst[i * 8..i * 8 + 8].copy_from_slice(&UNPACK1[b as usize]);
            }
            packed.len() * 8
        }
        3..=4 => {
            for (i, &b) in packed.iter().enumerate() {
                dst[i * 4..i * 4 + 4].copy_from_slice(&UNPACK2[b as usize]);
            }
            packed.len() * 4
        }
        5..=16 => {
            for (i, &b) in packed.iter().enumerate() {
                dst[i * 2..i * 2 + 2].copy_from_slice(&UNPACK4[b as usize]);
            }
            packed.len() * 2
        }
        _ => {
            dst[..packed.len()].copy_from_slice(packed);
            packed.len()
        }
    };

    for v in &mut dst[..sz] {
        *v = symbols[*v as usize];
    }
    sz
}

/// Expand a packed body into thread-local scratch and run `f` over it.
pub(crate) fn with_expanded<R>(packed: &[u8], symbols: &[u8], f: impl FnOnce(&[u8]) -> R) -> R {
    let mut seg = segment::free_segment();
    let sz = expand_into(packed, symbols, &mut seg);
    f(&seg[..sz])
}

/// Append the packed body of `src` to `dst`; returns bytes written.
/// `symbols` must be the block's distinct symbols in ascending order.
pub(crate) fn encode(dst: &mut Vec<u8>, src: &[u8], symbols: &[u8]) -> usize {
    let mut ord = segment::free_segment();
    for (i, &c) in symbols.iter().enumerate() {
        ord[c as usize] = i as u8;
    }

    let start = dst.len();
    match symbols.len() {
        0..=2 => {
            for chunk in src.chunks(8) {
                let mut b = 0u8;
                for (i, &c) in chunk.iter().enumerate() {
                    b |= (ord[c as usize] & 0x1) << i;
                }
                dst.push(b);
            }
        }
        3..=4 => {
            for chunk in src.chunks(4) {
                let mut b = 0u8;
                for (i, &c) in chunk.iter().enumerate() {
                    b |= (ord[c as usize] & 0x3) << (2 * i);
                }
                dst.push(b);
            }
        }
        5..=16 => {
            for chunk in src.chunks(2) {
                let mut b = 0u8;
                for (i, &c) in chunk.iter().enumerate() {
                    b |= (ord[c as usize] & 0xF) << (4 * i);
                }
                dst.push(b);
            }
        }
        _ => {
            dst.extend(src.iter().map(|&c| ord[c as usize]));
        }
    }
    dst.len() - start
}

/// Packed size of a full block at the width implied by the distinct count.
pub(crate) fn comp_sz(distinct: usize) -> usize {
    match distinct {
        0..=2 => SZ >> 3,
        3..=4 => SZ >> 2,
        5..=16 => SZ >> 1,
        _ => SZ,
    }
}

/// Exact packed size of `len` positions at the width implied by the
/// distinct count; what [`encode`] emits and what a decoder must find.
pub(crate) fn packed_len(distinct: usize, len: usize) -> usize {
    match distinct {
        0..=2 => len.div_ceil(8),
        3..=4 => len.div_ceil(4),
        5..=16 => len.div_ceil(2),
        _ => len,
    }
}
