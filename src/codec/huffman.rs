// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Canonical Huffman code construction.
//!
//! Not wired into the block codec chooser: the hybrid encoder never beats
//! the fixed-width fallback with a prefix code at block scale, so this
//! stays a sizing tool. It is kept because the serialized header format
//! reserves no tag for it and the estimate is still useful when comparing
//! block codecs offline.
//!
//! The construction is the textbook one with fully pinned-down tie-breaks,
//! so code assignment is deterministic: the build heap orders by frequency
//! ascending, then internal nodes before leaves, then leaves by symbol
//! ascending; canonical assignment orders leaves by code length ascending,
//! frequency descending, symbol ascending, and hands out codes level by
//! level from the shrinking candidate set `{1, 0} → {11, 01, 10, 00} → …`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// One symbol's canonical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Code {
    pub freq: usize,
    /// Code length in bits; 0 only for a single-symbol alphabet.
    pub len: u8,
    pub prefix: u16,
}

struct Leaf {
    sym: u8,
    freq: usize,
    len: u8,
}

/// Build the Huffman tree and return the leaves with their code lengths.
///
/// The arena holds child links only; leaves occupy slots
/// `0..symbols.len()`, internal nodes append after them. Heap entries carry
/// `(freq, s, slot)` where `s` is the leaf symbol for leaves and a
/// decreasing negative marker for internal nodes, so equal frequencies
/// resolve internal-first, then leaves in symbol order.
fn build_lengths(symbols: &[u8], freqs: &[u16]) -> Vec<Leaf> {
    debug_assert_eq!(symbols.len(), freqs.len());
    debug_assert!(!symbols.is_empty());

    let mut kids: Vec<Option<(usize, usize)>> = vec![None; symbols.len()];
    let mut heap: BinaryHeap<Reverse<(usize, i16, usize)>> = symbols
        .iter()
        .zip(freqs)
        .enumerate()
        .map(|(i, (&s, &f))| Reverse((f as usize, s as i16, i)))
        .collect();

    let mut internal: i16 = -1;
    while heap.len() > 1 {
        let Reverse((lf, _, li)) = heap.pop().expect("heap len checked");
        let Reverse((rf, _, ri)) = heap.pop().expect("heap len checked");
        let slot = kids.len();
        kids.push(Some((li, ri)));
        heap.push(Reverse((lf + rf, internal, slot)));
        internal -= 1;
    }

    // leaf depth = code length; a lone leaf sits at depth 0
    let Reverse((_, _, root)) = heap.pop().expect("at least one symbol");
    let mut lens = vec![0u8; symbols.len()];
    let mut stack = vec![(root, 0u8)];
    while let Some((slot, depth)) = stack.pop() {
        match kids[slot] {
            Some((l, r)) => {
                stack.push((l, depth + 1));
                stack.push((r, depth + 1));
            }
            None => lens[slot] = depth,
        }
    }

    symbols
        .iter()
        .zip(freqs)
        .zip(lens)
        .map(|((&sym, &freq), len)| Leaf { sym, freq: freq as usize, len })
        .collect()
}

/// Estimated encoded size in bytes of data with the given histogram.
pub(crate) fn comp_sz(symbols: &[u8], freqs: &[u16]) -> usize {
    let bits: usize = build_lengths(symbols, freqs)
        .iter()
        .map(|l| l.freq * l.len as usize)
        .sum();
    bits.div_ceil(8)
}

/// Canonical codes for the given histogram, plus the tree depth.
pub(crate) fn canonical_code(symbols: &[u8], freqs: &[u16]) -> ([Option<Code>; 256], u8) {
    let mut leaves = build_lengths(symbols, freqs);
    leaves.sort_by(|a, b| {
        a.len
            .cmp(&b.len)
            .then(b.freq.cmp(&a.freq))
            .then(a.sym.cmp(&b.sym))
    });

    let depth = leaves.last().map_or(0, |l| l.len);
    let mut table = [None; 256];

    // assign level by level from the shrinking candidate set
    let mut code: Vec<u16> = vec![1, 0];
    let mut i = 0;
    for len in 1..=depth {
        let mut used = 0;
        while i < leaves.len() && leaves[i].len == len {
            let leaf = &leaves[i];
            table[leaf.sym as usize] = Some(Code { freq: leaf.freq, len, prefix: code[used] });
            i += 1;
            used += 1;
        }
        code = extend_codes(&code[used..]);
    }

    // a single-symbol alphabet has one zero-length code
    for leaf in &leaves {
        if leaf.len == 0 {
            table[leaf.sym as usize] = Some(Code { freq: leaf.freq, len: 0, prefix: 0 });
        }
    }

    (table, depth)
}

/// `{1, 0} → {11, 01, 10, 00}`: append a 1 to every unused code, then a 0.
fn extend_codes(code: &[u16]) -> Vec<u16> {
    let mut out = Vec::with_capacity(code.len() * 2);
    for bit in [1u16, 0] {
        for &c in code {
            out.push((c << 1) | bit);
        }
    }
    out
}
