// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Burrows–Wheeler transform of the reversed input text.
//!
//! The index stores the BWT of `reverse(text) ++ [0]`. Reversal is what
//! makes the rest of the crate line up: the search loop consumes patterns
//! left-to-right while each LF-style range update *prepends* a symbol to
//! the matched string, so the row range ends up keyed by the reversed
//! pattern, which occurs in the reversed text exactly where the pattern
//! occurs in the original. It also turns LF-stepping into forward motion
//! through the original text, which is what restoration and field
//! extraction rely on.
//!
//! Construction is a comparison sort over suffixes. The unique, smallest
//! sentinel makes suffix order equal rotation order, and keeps every
//! comparison decidable without wraparound. Linear-time construction is a
//! deliberate non-goal; the sort is O(n log n) comparisons and entirely
//! adequate for index building.

use crate::error::Error;

pub(crate) struct BwTransform {
    /// Last column of the sorted rotation matrix.
    pub bwt: Vec<u8>,
    /// Sorted distinct bytes of the transformed string, sentinel first.
    pub alphabet: Vec<u8>,
}

/// Transform `text` into the BWT of its reversal plus sentinel.
///
/// The byte 0 is reserved as the end-of-text sentinel and must not occur in
/// the input. Byte 1 is conventionally the field separator understood by
/// the extraction operations, but nothing here treats it specially.
pub(crate) fn transform(text: &[u8]) -> Result<BwTransform, Error> {
    if text.contains(&0) {
        return Err(Error::SentinelInInput);
    }

    let mut s: Vec<u8> = text.iter().rev().copied().collect();
    s.push(0);
    let n = s.len();

    let mut sa: Vec<usize> = (0..n).collect();
    sa.sort_unstable_by(|&a, &b| s[a..].cmp(&s[b..]));

    let bwt = sa.iter().map(|&i| s[(i + n - 1) % n]).collect();

    let mut seen = [false; 256];
    for &b in &s {
        seen[b as usize] = true;
    }
    let alphabet = (0u16..256)
        .filter(|&b| seen[b as usize])
        .map(|b| b as u8)
        .collect();

    Ok(BwTransform { bwt, alphabet })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banana_reversed() {
        // s = "ananab" + 0; rotations sort with the sentinel first
        let t = transform(b"banana").unwrap();
        assert_eq!(t.bwt.len(), 7);
        assert_eq!(t.alphabet, vec![0, b'a', b'b', b'n']);
        // one sentinel, three a's, one b, two n's in any BWT of the string
        let mut counts = [0usize; 256];
        for &b in &t.bwt {
            counts[b as usize] += 1;
        }
        assert_eq!(counts[0], 1);
        assert_eq!(counts[b'a' as usize], 3);
        assert_eq!(counts[b'b' as usize], 1);
        assert_eq!(counts[b'n' as usize], 2);
    }

    #[test]
    fn tiny_inputs() {
        let t = transform(&[32]).unwrap();
        assert_eq!(t.bwt, vec![32, 0]);

        let t = transform(&[]).unwrap();
        assert_eq!(t.bwt, vec![0]);
        assert_eq!(t.alphabet, vec![0]);
    }

    #[test]
    fn rejects_embedded_sentinel() {
        assert!(matches!(transform(&[5, 0, 9]), Err(Error::SentinelInInput)));
    }
}
