// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Block header serialization and the runtime metadata it decodes into.
//!
//! # Record format
//!
//! The header stream opens with a little-endian u32 counting the
//! distinct-symbol records across all blocks, then one record per block.
//! The first byte distinguishes three shapes:
//!
//! ```text
//! single-symbol block (3 bytes)
//! +7+6+5+4+3+2+1+0+
//! |1|0|0|0|0|0|0|0|  marker 0x80
//! +-+-+-+-+-+-+-+-+
//! | raw symbol    |
//! +-+-+-+-+-+-+-+-+
//! | freq, 0 ⇒ 256 |
//! +-+-+-+-+-+-+-+-+
//!
//! short block, distinct count ≤ 32
//! +7+6+5+4+3+2+1+0+
//! |1| tag |  cnt  |  cnt 5 bits, 0 ⇒ 32
//! +-+-+-+-+-+-+-+-+
//!
//! long block, distinct count > 32
//! +7+6+5+4+3+2+1+0+
//! |0| tag |0|0|0|0|
//! +-+-+-+-+-+-+-+-+
//! |     cnt       |
//! +-+-+-+-+-+-+-+-+
//! ```
//!
//! Non-single records continue with one byte of body size modulo 256
//! (0 ⇒ 256), then `cnt` pairs of (raw symbol, frequency with 0 ⇒ 256).
//! Symbols are written raw (pre-remap) and mapped back through the
//! dictionary on decode, so the stream is meaningful next to its `ridx`.
//!
//! # Decode
//!
//! [`Meta::decode`] rebuilds everything queries need: per-block codec
//! state, the flat symbol/frequency record arrays, a super-block snapshot
//! of cumulative ranks every eight blocks, and the end-of-bucket table
//! derived from the final cumulative ranks. The decoder is strict;
//! truncation, impossible tags, body overruns, or totals that contradict
//! the declared record count and BWT length are errors, since the input
//! may come from disk.

use log::debug;

use crate::codec::{lwc, runlen, sparse, BlockCodec};
use crate::dict::Dictionary;
use crate::error::Error;
use crate::histogram::BlockHistogram;
use crate::types::{BucketEnd, CodecTag, SuperBlock, ABSENT, MSB, SBSZ, SZ};

/// Shift of the 2-bit codec tag inside a header tag byte.
const HTP: u32 = 5;
/// Low five bits of a short-form tag byte: the distinct-symbol count.
const CNT_MASK: u8 = 0x1F;

/// Append one block's header record.
///
/// `h` is the histogram of the remapped (dense-symbol) block; symbols are
/// written back out as raw bytes via the dictionary. `body_sz` is the
/// encoded body length, ignored for single blocks.
pub(crate) fn encode_record(
    out: &mut Vec<u8>,
    h: &BlockHistogram,
    tag: CodecTag,
    body_sz: usize,
    dict: &Dictionary,
) {
    if tag == CodecTag::Single {
        debug_assert_eq!(h.symbols.len(), 1);
        out.push(MSB);
        out.push(dict.reverse(h.symbols[0]));
        // a full block of 256 wraps to the 0 marker
        out.push(h.freqs[0] as u8);
        return;
    }

    let cnt = h.symbols.len();
    debug_assert!((2..=256).contains(&cnt));
    if cnt > 1 << HTP {
        out.push((tag as u8) << HTP);
        out.push(cnt as u8);
    } else {
        out.push(MSB | (tag as u8) << HTP | (cnt as u8 & CNT_MASK));
    }

    debug_assert!((1..=SZ).contains(&body_sz));
    out.push(body_sz as u8);

    for (i, &s) in h.symbols.iter().enumerate() {
        debug_assert!(h.freqs[i] < 256, "only a single block holds 256 of one symbol");
        out.push(dict.reverse(s));
        out.push(h.freqs[i] as u8);
    }
}

/// Runtime metadata decoded from the header stream.
pub(crate) struct Meta {
    /// End-of-bucket table, ascending position.
    pub eob: Vec<BucketEnd>,
    /// Dense symbol -> index into `eob`, `ABSENT` when the symbol never
    /// occurs.
    pub ioe: [u8; 256],
    /// Per-block codec state, body ranges resolved against the body
    /// buffer.
    pub blocks: Vec<BlockCodec>,
    /// Per-block distinct-symbol counts.
    pub bsz: Vec<u16>,
    /// Flat distinct-symbol records of all blocks, dense indices.
    pub chars: Vec<u8>,
    /// Frequencies parallel to `chars`.
    pub freqs: Vec<u16>,
    /// Cumulative snapshots every [`SBSZ`] blocks.
    pub supers: Vec<SuperBlock>,
}

impl Meta {
    /// Decode the header stream against its body buffer.
    ///
    /// `n` is the caller-declared BWT length; the decoded frequencies must
    /// add up to it.
    pub(crate) fn decode(hdr: &[u8], body: &[u8], n: usize, dict: &Dictionary) -> Result<Meta, Error> {
        if hdr.len() < 4 {
            return Err(Error::Truncated { expected: 4, got: hdr.len() });
        }
        let declared = u32::from_le_bytes(hdr[..4].try_into().expect("length checked")) as usize;

        let nblocks = n.div_ceil(SZ);
        let mut meta = Meta {
            eob: Vec::new(),
            ioe: [ABSENT; 256],
            blocks: Vec::with_capacity(nblocks),
            bsz: Vec::with_capacity(nblocks),
            chars: Vec::with_capacity(declared),
            freqs: Vec::with_capacity(declared),
            supers: Vec::with_capacity(nblocks / SBSZ),
        };

        let mut rank = [0usize; 256];
        let mut blens: Vec<usize> = Vec::with_capacity(nblocks);
        let mut end = 0usize;
        let mut i = 4usize;
        let mut j = 0usize;

        let byte_at = |i: usize| -> Result<u8, Error> {
            hdr.get(i)
                .copied()
                .ok_or(Error::Truncated { expected: i + 1, got: hdr.len() })
        };

        while i < hdr.len() {
            let record_start = i;
            let b0 = hdr[i];
            let (tag, cnt) = if b0 & MSB != 0 {
                if b0 == MSB {
                    (CodecTag::Single, 1)
                } else {
                    let cnt = (b0 & CNT_MASK) as usize;
                    (
                        CodecTag::from_bits(b0 >> HTP),
                        if cnt == 0 { 32 } else { cnt },
                    )
                }
            } else {
                let tag = CodecTag::from_bits(b0 >> HTP);
                i += 1;
                (tag, byte_at(i)? as usize)
            };

            // the encoder never produces these shapes
            if cnt == 0 || (tag == CodecTag::Single) != (cnt == 1) {
                return Err(Error::InvalidRecord(record_start));
            }

            let mut bv = 0..0;
            if cnt > 1 {
                let beg = end;
                i += 1;
                end += byte_at(i)? as usize;
                if end == beg {
                    end += 256;
                }
                if end > body.len() {
                    return Err(Error::BodyOverrun { end, len: body.len() });
                }
                bv = beg..end;
            }

            for _ in 0..cnt {
                i += 1;
                let raw = byte_at(i)?;
                i += 1;
                let freq = match byte_at(i)? {
                    0 => 256u16,
                    f => f as u16,
                };
                let dense = dict.forward(raw);
                if dict.is_absent(raw) {
                    return Err(Error::InvalidRecord(record_start));
                }
                meta.chars.push(dense);
                meta.freqs.push(freq);
                rank[dense as usize] += freq as usize;
            }

            let next = j + cnt;
            let blen: usize = meta.freqs[j..next].iter().map(|&f| f as usize).sum();
            // every block holds at most SZ positions, and only the last
            // may hold fewer; a packed LWC body must match its width
            if blen > SZ || (!blens.is_empty() && blens[blens.len() - 1] != SZ) {
                return Err(Error::InvalidRecord(record_start));
            }
            if tag == CodecTag::Lwc && bv.len() != lwc::packed_len(cnt, blen) {
                return Err(Error::InvalidRecord(record_start));
            }
            blens.push(blen);

            let codec = match tag {
                CodecTag::Single => BlockCodec::Single { c: meta.chars[j] },
                CodecTag::RunLen => BlockCodec::RunLen { body: bv },
                CodecTag::Sparse => BlockCodec::Sparse {
                    mfc: most_frequent(&meta.chars[j..next], &meta.freqs[j..next]),
                    body: bv,
                },
                CodecTag::Lwc => BlockCodec::Lwc { body: bv, chars: j..next },
            };
            meta.blocks.push(codec);
            meta.bsz.push(cnt as u16);
            j = next;

            if meta.blocks.len() % SBSZ == 0 {
                meta.supers.push(SuperBlock { rank, offset: j });
            }

            i += 1;
        }

        if j != declared {
            return Err(Error::RecordCountMismatch { declared, decoded: j });
        }
        if end != body.len() {
            return Err(Error::BodyOverrun { end, len: body.len() });
        }
        let total: usize = rank.iter().sum();
        if total != n {
            return Err(Error::LengthMismatch { declared: n, decoded: total });
        }

        meta.build_buckets(&rank);
        debug!(
            "decoded {} blocks, {} symbol records, {} super-blocks, {} buckets",
            meta.blocks.len(),
            j,
            meta.supers.len(),
            meta.eob.len()
        );
        Ok(meta)
    }

    /// Derive the end-of-bucket table from final cumulative ranks. The
    /// sentinel bucket is seeded first; remaining symbols follow in
    /// ascending order, which makes `eob` positions strictly increasing.
    fn build_buckets(&mut self, rank: &[usize; 256]) {
        let mut offset = rank[0];
        self.eob.push(BucketEnd { v: offset, b: 0 });

        let mut idx = 1u8;
        for (sym, &cnt) in rank.iter().enumerate().skip(1) {
            if cnt == 0 {
                continue;
            }
            offset += cnt;
            self.eob.push(BucketEnd { v: offset, b: sym as u8 });
            self.ioe[sym] = idx;
            idx = idx.wrapping_add(1);
        }
    }

    /// Bucket bounds `(start, end]` of dense symbol `b` in BWT sort
    /// order: rows `start+1 ..= end` hold `b` in the F-column.
    pub(crate) fn get_block_range(&self, b: u8) -> Option<(usize, usize)> {
        if b == 0 {
            let v = self.eob.first()?.v;
            return Some((0, v.checked_sub(1)?));
        }
        let i = self.ioe[b as usize];
        if i == ABSENT {
            return None;
        }
        let i = i as usize;
        Some((self.eob[i - 1].v - 1, self.eob[i].v - 1))
    }

    /// Occurrences of dense symbol `b` in all positions strictly before
    /// block `e`: the nearest super-block snapshot plus a walk over the
    /// record spans of the remaining blocks.
    pub(crate) fn block_rank(&self, b: u8, e: usize) -> usize {
        let mut i = e / SBSZ;
        let mut r = 0usize;
        let mut j = 0usize;
        if i > 0 {
            let snap = &self.supers[i - 1];
            r = snap.rank[b as usize];
            j = snap.offset;
            i *= SBSZ;
        }

        if e > i {
            let span: usize = self.bsz[i..e].iter().map(|&v| v as usize).sum();
            for k in j..j + span {
                // equality weight keeps the scan branch-free
                r += usize::from(self.chars[k] == b) * self.freqs[k] as usize;
            }
        }

        r
    }

    /// Symbol at BWT position `p` and its rank over the whole prefix
    /// `0..=p`.
    pub(crate) fn access(&self, body: &[u8], p: usize) -> (u8, usize) {
        let (bi, off) = (p / SZ, p % SZ);
        let (b, r) = match &self.blocks[bi] {
            BlockCodec::Single { c } => (*c, off + 1),
            BlockCodec::RunLen { body: bv } => runlen::access(off, &body[bv.clone()]),
            BlockCodec::Sparse { mfc, body: bv } => sparse::access(*mfc, off, &body[bv.clone()]),
            BlockCodec::Lwc { body: bv, chars } => {
                lwc::with_expanded(&body[bv.clone()], &self.chars[chars.clone()], |ex| {
                    lwc::access(off, ex)
                })
            }
        };
        (b, r + self.block_rank(b, bi))
    }

    /// Rank of dense symbol `b` over the prefix `0..=p`.
    pub(crate) fn rank(&self, body: &[u8], b: u8, p: usize) -> usize {
        let (bi, off) = (p / SZ, p % SZ);
        let intra = match &self.blocks[bi] {
            BlockCodec::Single { c } => {
                if b == *c {
                    off + 1
                } else {
                    0
                }
            }
            BlockCodec::RunLen { body: bv } => runlen::rank(b, off, &body[bv.clone()]),
            BlockCodec::Sparse { mfc, body: bv } => sparse::rank(*mfc, b, off, &body[bv.clone()]),
            BlockCodec::Lwc { body: bv, chars } => {
                lwc::with_expanded(&body[bv.clone()], &self.chars[chars.clone()], |ex| {
                    lwc::rank(b, off, ex)
                })
            }
        };
        self.block_rank(b, bi) + intra
    }
}

/// First symbol carrying the maximum frequency in a record span.
fn most_frequent(chars: &[u8], freqs: &[u16]) -> u8 {
    let mut best = 0usize;
    for (i, &f) in freqs.iter().enumerate().skip(1) {
        if f > freqs[best] {
            best = i;
        }
    }
    chars[best]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::block_histogram;

    fn dict_for(raw: &[u8]) -> Dictionary {
        let mut alphabet: Vec<u8> = raw.to_vec();
        alphabet.push(0);
        alphabet.sort_unstable();
        alphabet.dedup();
        Dictionary::new(&alphabet)
    }

    #[test]
    fn single_block_record_is_three_bytes() {
        let dict = dict_for(&[b'x']);
        let block = vec![dict.forward(b'x'); 256];
        let h = block_histogram(&block);
        let mut out = Vec::new();
        encode_record(&mut out, &h, CodecTag::Single, 0, &dict);
        assert_eq!(out, vec![MSB, b'x', 0]); // frequency 256 wraps to 0
    }

    #[test]
    fn short_and_long_tag_bytes() {
        let dict = dict_for(&[1, 2, 3]);
        let block = [dict.forward(1), dict.forward(2), dict.forward(3)];
        let h = block_histogram(&block);
        let mut out = Vec::new();
        encode_record(&mut out, &h, CodecTag::RunLen, 6, &dict);
        // MSB | runlen<<5 | count 3
        assert_eq!(out[0], MSB | (1 << HTP) | 3);
        assert_eq!(out[1], 6);
        assert_eq!(out.len(), 2 + 2 * 3);

        // 33 distinct symbols forces the long form
        let raw: Vec<u8> = (10..43).collect();
        let dict = dict_for(&raw);
        let block: Vec<u8> = raw.iter().map(|&b| dict.forward(b)).collect();
        let h = block_histogram(&block);
        let mut out = Vec::new();
        encode_record(&mut out, &h, CodecTag::Lwc, 17, &dict);
        assert_eq!(out[0], 3 << HTP);
        assert_eq!(out[1], 33);
        assert_eq!(out[2], 17);
    }

    #[test]
    fn count_of_exactly_32_wraps_to_zero() {
        let raw: Vec<u8> = (50..82).collect();
        let dict = dict_for(&raw);
        let block: Vec<u8> = raw.iter().map(|&b| dict.forward(b)).collect();
        let h = block_histogram(&block);
        let mut out = Vec::new();
        encode_record(&mut out, &h, CodecTag::Lwc, 16, &dict);
        assert_eq!(out[0], MSB | (3 << HTP)); // count bits all zero
    }

    #[test]
    fn decode_rejects_garbage() {
        let dict = dict_for(b"ab");
        // truncated prelude
        assert!(matches!(
            Meta::decode(&[1, 0], &[], 0, &dict),
            Err(Error::Truncated { .. })
        ));
        // record count mismatch: prelude says 2 records, stream has 1
        let hdr = [2, 0, 0, 0, MSB, b'a', 5];
        assert!(matches!(
            Meta::decode(&hdr, &[], 5, &dict),
            Err(Error::RecordCountMismatch { declared: 2, decoded: 1 })
        ));
        // frequency total disagrees with n
        let hdr = [1, 0, 0, 0, MSB, b'a', 5];
        assert!(matches!(
            Meta::decode(&hdr, &[], 9, &dict),
            Err(Error::LengthMismatch { declared: 9, decoded: 5 })
        ));
    }

    #[test]
    fn decode_rejects_mismatched_lwc_width() {
        let dict = dict_for(b"ab");
        // LWC block, 2 distinct symbols, 8 positions: the packed body must
        // be exactly 1 byte, not the 10 the record claims
        let hdr = [2, 0, 0, 0, MSB | (3 << HTP) | 2, 10, b'a', 4, b'b', 4];
        let body = [0u8; 10];
        assert!(matches!(
            Meta::decode(&hdr, &body, 8, &dict),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn decode_rejects_short_non_final_blocks() {
        let dict = dict_for(b"ab");
        // first block holds only 5 positions but another block follows
        let hdr = [2, 0, 0, 0, MSB, b'a', 5, MSB, b'b', 3];
        assert!(matches!(
            Meta::decode(&hdr, &[], 8, &dict),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn decode_rebuilds_buckets_in_order() {
        let dict = dict_for(b"ab");
        // two single blocks: 256 sentinels would be odd, use a + b
        let hdr = [2, 0, 0, 0, MSB, b'a', 0, MSB, b'b', 3];
        let meta = Meta::decode(&hdr, &[], 259, &dict).unwrap();
        assert_eq!(meta.blocks.len(), 2);
        assert_eq!(meta.bsz, vec![1, 1]);
        // no sentinel occurrences: bucket 0 is empty
        assert_eq!(meta.eob[0].v, 0);
        let ends: Vec<usize> = meta.eob.iter().map(|p| p.v).collect();
        assert_eq!(ends, vec![0, 256, 259]);
        assert!(ends.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(meta.get_block_range(dict.forward(b'b')), Some((255, 258)));
    }
}
