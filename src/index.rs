// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The hybrid FM-index: construction entry points, serialization, and the
//! rank/access/search query surface.
//!
//! # Conventions that everything else leans on
//!
//! Ranks are 1-based and inclusive: `rank(a, p)` counts occurrences of `a`
//! at positions `0..=p`. Bucket ranges and search results are half-open
//! `(s, e]`: the matching rows are `s+1 ..= e`, and `e - s` is the count.
//! The two conventions cancel in the LF step: `bucket_start + rank` lands
//! exactly on the mapped row.
//!
//! "Backward search" names the LF-mapping direction, not pattern order:
//! the pattern is consumed left-to-right, each step prepending a symbol to
//! the matched prefix. Since the index is built over the reversed text
//! (see the `bwt` module), the net effect is ordinary substring search.

use std::fmt;

use crate::builder;
use crate::bwt;
use crate::dict::Dictionary;
use crate::error::Error;
use crate::header::Meta;
use crate::types::{SBSZ, SZ};

/// A compressed, self-indexing view of a byte string.
///
/// Built once with [`HybridIndex::new`] or restored with
/// [`HybridIndex::from_bytes`]; immutable afterwards. Queries are pure
/// reads and may run concurrently from any number of threads.
pub struct HybridIndex {
    /// BWT length (text length plus sentinel).
    n: usize,
    /// Serialized header stream, count prefix included.
    hdr: Vec<u8>,
    /// Concatenated block bodies.
    body: Vec<u8>,
    dict: Dictionary,
    meta: Meta,
}

impl fmt::Debug for HybridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridIndex")
            .field("len", &self.n)
            .field("header_bytes", &self.hdr.len())
            .field("body_bytes", &self.body.len())
            .finish()
    }
}

impl HybridIndex {
    /// Build an index over `text`.
    ///
    /// The byte 0 is reserved as the end-of-text sentinel and must not
    /// occur in the input; byte 1 is the conventional field separator for
    /// the extraction operations.
    pub fn new(text: &[u8]) -> Result<HybridIndex, Error> {
        let t = bwt::transform(text)?;
        builder::from_bwt(t.bwt, Dictionary::new(&t.alphabet))
    }

    /// Restore an index serialized by [`HybridIndex::to_bytes`]. `n` and
    /// `ridx` travel out-of-band, exactly as [`HybridIndex::len`] and
    /// [`HybridIndex::dictionary`] produced them.
    pub fn from_bytes(n: usize, ridx: &[u8; 256], data: &[u8]) -> Result<HybridIndex, Error> {
        if data.len() < 4 {
            return Err(Error::Truncated { expected: 4, got: data.len() });
        }
        let hlen = u32::from_le_bytes(data[..4].try_into().expect("length checked")) as usize;
        let rest = &data[4..];
        if rest.len() < hlen {
            return Err(Error::Truncated { expected: 4 + hlen, got: data.len() });
        }
        let (hdr, body) = rest.split_at(hlen);

        let dict = Dictionary::from_ridx(ridx);
        let meta = Meta::decode(hdr, body, n, &dict)?;
        Ok(HybridIndex {
            n,
            hdr: hdr.to_vec(),
            body: body.to_vec(),
            dict,
            meta,
        })
    }

    pub(crate) fn from_parts(
        n: usize,
        hdr: Vec<u8>,
        body: Vec<u8>,
        dict: Dictionary,
        meta: Meta,
    ) -> HybridIndex {
        HybridIndex { n, hdr, body, dict, meta }
    }

    /// Serialize to `[LE u32 header length][header][body]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.hdr.len() + self.body.len());
        out.extend_from_slice(&(self.hdr.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.hdr);
        out.extend_from_slice(&self.body);
        out
    }

    /// The 256-byte reverse dictionary, for storage next to the blob.
    pub fn dictionary(&self) -> &[u8; 256] {
        self.dict.ridx()
    }

    /// Header and body sizes in bytes.
    pub fn size(&self) -> (usize, usize) {
        (self.hdr.len(), self.body.len())
    }

    /// BWT length: indexed text length plus one sentinel.
    pub fn len(&self) -> usize {
        self.n
    }

    /// True for an index over the empty text (a lone sentinel).
    pub fn is_empty(&self) -> bool {
        self.n <= 1
    }

    /// The byte at BWT position `p` and its 1-based rank among equal
    /// bytes at positions `0..=p`.
    pub fn access(&self, p: usize) -> Option<(u8, usize)> {
        if p >= self.n {
            return None;
        }
        let (b, r) = self.meta.access(&self.body, p);
        Some((self.dict.reverse(b), r))
    }

    /// Occurrences of raw byte `a` at BWT positions `0..=p`.
    pub fn rank(&self, a: u8, p: usize) -> Option<usize> {
        if p >= self.n {
            return None;
        }
        Some(self.meta.rank(&self.body, self.dict.forward(a), p))
    }

    /// The bucket holding row `p` in BWT sort order: the bucket's raw
    /// byte and the row's 1-based offset within it.
    pub fn locate(&self, p: usize) -> Option<(u8, usize)> {
        if p >= self.n {
            return None;
        }
        // eob positions are exclusive bucket upper bounds
        let i = self.meta.eob.partition_point(|pair| pair.v <= p);
        if i == 0 {
            return Some((0, p + 1));
        }
        let pair = self.meta.eob[i];
        Some((self.dict.reverse(pair.b), p - self.meta.eob[i - 1].v + 1))
    }

    /// Bucket bounds `(start, end]` of raw byte `b`; `end - start` is its
    /// occurrence count.
    pub fn get_bound(&self, b: u8) -> Option<(usize, usize)> {
        if self.dict.is_absent(b) {
            return None;
        }
        self.meta.get_block_range(self.dict.forward(b))
    }

    /// Inverse of rank. Unsupported by this structure; always `None`.
    pub fn select(&self, _a: u8, _r: usize) -> Option<usize> {
        None
    }

    /// Find `pattern` in the indexed text; returns its half-open row
    /// range `(s, e]` in BWT sort order, or `None` when absent, unknown,
    /// or empty.
    pub fn search(&self, pattern: &[u8]) -> Option<(usize, usize)> {
        if pattern.is_empty() {
            return None;
        }
        let mut pat = Vec::with_capacity(pattern.len());
        for &raw in pattern {
            if self.dict.is_absent(raw) {
                return None;
            }
            pat.push(self.dict.forward(raw));
        }

        let (mut s, mut e) = self.meta.get_block_range(pat[0])?;
        for &b in &pat[1..] {
            if s == e {
                break;
            }
            let (base, _) = self.meta.get_block_range(b)?;
            s = base + self.meta.rank(&self.body, b, s);
            e = base + self.meta.rank(&self.body, b, e);
        }

        (e > s).then_some((s, e))
    }

    /// Number of occurrences of `pattern` in the indexed text.
    pub fn count(&self, pattern: &[u8]) -> usize {
        self.search(pattern).map_or(0, |(s, e)| e - s)
    }

    /// Occurrence counts of every raw byte, sentinel included.
    pub fn histogram(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for (i, &c) in self.meta.chars.iter().enumerate() {
            counts[self.dict.reverse(c) as usize] += self.meta.freqs[i] as usize;
        }
        counts
    }

    /// Distinct raw bytes stored in the blocks covering BWT positions
    /// `s..=e`, resolved from block metadata without touching bodies.
    pub fn chars_in_bound(&self, s: usize, e: usize) -> Vec<u8> {
        let nblocks = self.meta.blocks.len();
        if nblocks == 0 || s > e {
            return Vec::new();
        }
        let sb = (s / SZ).min(nblocks - 1);
        let eb = (e / SZ).min(nblocks - 1);

        // record offset of the first covered block, via the nearest
        // super-block snapshot
        let sup = sb / SBSZ;
        let (mut from, mut offset) = (0usize, 0usize);
        if sup > 0 {
            from = sup * SBSZ;
            offset = self.meta.supers[sup - 1].offset;
        }
        offset += self.meta.bsz[from..sb].iter().map(|&v| v as usize).sum::<usize>();
        let span: usize = self.meta.bsz[sb..=eb].iter().map(|&v| v as usize).sum();

        let mut present = [false; 256];
        for &c in &self.meta.chars[offset..offset + span] {
            present[c as usize] = true;
        }
        (0u16..256)
            .filter(|&c| present[c as usize])
            .map(|c| self.dict.reverse(c as u8))
            .collect()
    }

    pub(crate) fn meta(&self) -> &Meta {
        &self.meta
    }

    pub(crate) fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn dict(&self) -> &Dictionary {
        &self.dict
    }
}
