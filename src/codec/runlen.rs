// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Run-length block codec.
//!
//! Body layout, two bytes per maximal run:
//!
//! ```text
//! ┌─┬────────┐
//! │0│ symbol │
//! ├─┼────────┤
//! │1│ length │
//! ├─┼────────┤
//! │2│ symbol │
//! ├─┼────────┤
//! │3│ length │
//! └─┴────────┘
//! ```
//!
//! Consecutive records carry distinct symbols by construction. A length
//! byte caps a run at 255; a full-block run of 256 never reaches this codec
//! because one run means one symbol, which the chooser encodes as Single.

/// Symbol at block offset `p` and its 1-based rank within the block.
pub(crate) fn access(p: usize, bv: &[u8]) -> (u8, usize) {
    let mut ranks = [0usize; 256];
    let mut start = 0usize;
    let mut b = 0u8;
    for rec in bv.chunks_exact(2) {
        b = rec[0];
        let len = rec[1] as usize;
        if start + len > p {
            break;
        }
        ranks[b as usize] += len;
        start += len;
    }
    // offset into the containing run plus the symbol's prior full runs
    (b, p - start + ranks[b as usize] + 1)
}

/// Occurrences of `a` in block offsets `0..=p`.
pub(crate) fn rank(a: u8, p: usize, bv: &[u8]) -> usize {
    let mut end = 0usize;
    let mut last = 0usize;
    let mut r = 0usize;
    for rec in bv.chunks_exact(2) {
        let (b, len) = (rec[0], rec[1] as usize);
        end += len;
        if end > p {
            if a == b {
                return p - last + r + 1;
            }
            return r;
        }
        if b == a {
            r += len;
        }
        last = end;
    }
    r
}

/// Append the run-length body of `src` to `dst`; returns bytes written.
pub(crate) fn encode(dst: &mut Vec<u8>, src: &[u8]) -> usize {
    let start = dst.len();
    let mut prev = src[0];
    let mut run = 1usize;
    for &b in &src[1..] {
        if b == prev {
            run += 1;
        } else {
            debug_assert!(run <= 255, "a full-block run belongs to the single codec");
            dst.push(prev);
            dst.push(run as u8);
            prev = b;
            run = 1;
        }
    }
    debug_assert!(run <= 255, "a full-block run belongs to the single codec");
    dst.push(prev);
    dst.push(run as u8);
    dst.len() - start
}

/// Encoded body size: two bytes per run.
pub(crate) fn comp_sz(runs: usize) -> usize {
    2 * runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::block_histogram;

    const TEXT: &[u8] = b"tobeornottobethatisthequestion";

    #[test]
    fn access_matches_scan() {
        let h = block_histogram(TEXT);
        let mut bv = Vec::new();
        let n = encode(&mut bv, TEXT);
        assert_eq!(n, comp_sz(h.runs));

        let mut ranks = [0usize; 256];
        for (i, &c) in TEXT.iter().enumerate() {
            ranks[c as usize] += 1;
            assert_eq!(access(i, &bv), (c, ranks[c as usize]), "offset {i}");
        }
    }

    #[test]
    fn rank_matches_scan() {
        let mut bv = Vec::new();
        encode(&mut bv, TEXT);

        let mut ranks = [0usize; 256];
        for (i, &c) in TEXT.iter().enumerate() {
            ranks[c as usize] += 1;
            assert_eq!(rank(c, i, &bv), ranks[c as usize]);
        }
        // a symbol that never occurs
        for i in 0..TEXT.len() {
            assert_eq!(rank(b'z', i, &bv), 0);
        }
    }

    #[test]
    fn merges_runs() {
        let mut bv = Vec::new();
        let n = encode(&mut bv, &[4, 4, 4, 7, 7, 4]);
        assert_eq!(n, 6);
        assert_eq!(bv, vec![4, 3, 7, 2, 4, 1]);
        assert_eq!(access(4, &bv), (7, 2));
        assert_eq!(access(5, &bv), (4, 4));
        assert_eq!(rank(4, 5, &bv), 4);
        assert_eq!(rank(7, 5, &bv), 2);
    }
}
