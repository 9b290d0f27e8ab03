//! Reference oracles for differential testing.
//!
//! Simple, obviously-correct implementations of the transform and the
//! queries, used as ground truth against the block-compressed index. The
//! oracle mirrors the crate's conventions: the BWT covers the reversed
//! text plus sentinel, ranks are 1-based over `0..=p`.

#![allow(dead_code)]

/// O(n² log n) BWT of `reverse(text) ++ [0]` by sorting suffixes.
pub fn oracle_bwt(text: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = text.iter().rev().copied().collect();
    s.push(0);
    let n = s.len();
    let mut sa: Vec<usize> = (0..n).collect();
    sa.sort_by(|&a, &b| s[a..].cmp(&s[b..]));
    sa.iter().map(|&i| s[(i + n - 1) % n]).collect()
}

/// First column of the sorted rotation matrix: the BWT bytes, sorted.
pub fn oracle_f_column(text: &[u8]) -> Vec<u8> {
    let mut f = oracle_bwt(text);
    f.sort_unstable();
    f
}

/// Occurrences of `a` at BWT positions `0..=p`.
pub fn oracle_rank(bwt: &[u8], a: u8, p: usize) -> usize {
    bwt[..=p].iter().filter(|&&b| b == a).count()
}

/// Occurrences of `pattern` in `text` (overlapping).
pub fn oracle_count(text: &[u8], pattern: &[u8]) -> usize {
    if pattern.is_empty() || pattern.len() > text.len() {
        return 0;
    }
    text.windows(pattern.len()).filter(|w| w == &pattern).count()
}

/// Occurrence counts of every byte in the transformed string.
pub fn oracle_histogram(text: &[u8]) -> [usize; 256] {
    let mut counts = [0usize; 256];
    counts[0] = 1; // sentinel
    for &b in text {
        counts[b as usize] += 1;
    }
    counts
}
