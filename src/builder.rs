// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index construction: remap, split, encode, assemble.
//!
//! Blocks are independent: each one yields its header record, its body
//! bytes, and its record count from nothing but its own 256 positions, so
//! encoding fans out with rayon under the `parallel` feature and falls
//! back to a serial pass without it. Assembly is sequential either way and
//! the output bytes are identical.

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::codec::{self, lwc, runlen, sparse};
use crate::dict::Dictionary;
use crate::error::Error;
use crate::header::{self, Meta};
use crate::histogram::block_histogram;
use crate::index::HybridIndex;
use crate::types::{CodecTag, SZ};

/// One encoded block, ready for in-order assembly.
struct EncodedBlock {
    hdr: Vec<u8>,
    body: Vec<u8>,
    records: usize,
    tag: CodecTag,
}

fn encode_block(block: &[u8], dict: &Dictionary) -> EncodedBlock {
    let h = block_histogram(block);

    let mut body = Vec::new();
    let mut tag = CodecTag::Single;
    let mut body_sz = 0usize;
    if h.runs > 1 {
        tag = codec::choose(&h);
        body_sz = match tag {
            CodecTag::RunLen => runlen::encode(&mut body, block),
            CodecTag::Sparse => sparse::encode(&mut body, block, h.mfc),
            CodecTag::Lwc => lwc::encode(&mut body, block, &h.symbols),
            CodecTag::Single => unreachable!("multiple runs imply multiple symbols"),
        };
    }

    let mut hdr = Vec::with_capacity(2 + 2 * h.symbols.len());
    header::encode_record(&mut hdr, &h, tag, body_sz, dict);

    EncodedBlock { hdr, body, records: h.symbols.len(), tag }
}

/// Build a queryable index from a BWT over raw bytes and its dictionary.
/// The BWT is remapped to dense symbols in place.
pub(crate) fn from_bwt(mut bwt: Vec<u8>, dict: Dictionary) -> Result<HybridIndex, Error> {
    let n = bwt.len();
    for b in bwt.iter_mut() {
        *b = dict.forward(*b);
    }

    #[cfg(feature = "parallel")]
    let encoded: Vec<EncodedBlock> = bwt.par_chunks(SZ).map(|blk| encode_block(blk, &dict)).collect();
    #[cfg(not(feature = "parallel"))]
    let encoded: Vec<EncodedBlock> = bwt.chunks(SZ).map(|blk| encode_block(blk, &dict)).collect();

    let records: usize = encoded.iter().map(|e| e.records).sum();
    if u32::try_from(records).is_err() {
        return Err(Error::TooLarge(records));
    }

    let hdr_len: usize = encoded.iter().map(|e| e.hdr.len()).sum();
    let body_len: usize = encoded.iter().map(|e| e.body.len()).sum();
    let mut hdr = Vec::with_capacity(4 + hdr_len);
    let mut body = Vec::with_capacity(body_len);
    hdr.extend_from_slice(&(records as u32).to_le_bytes());
    for e in &encoded {
        hdr.extend_from_slice(&e.hdr);
        body.extend_from_slice(&e.body);
    }

    if log::log_enabled!(log::Level::Debug) {
        let mut by_tag = [0usize; 4];
        for e in &encoded {
            by_tag[e.tag as usize] += 1;
        }
        debug!(
            "encoded {} blocks: {} single, {} runlen, {} sparse, {} lwc",
            encoded.len(),
            by_tag[0],
            by_tag[1],
            by_tag[2],
            by_tag[3]
        );
    }

    let meta = Meta::decode(&hdr, &body, n, &dict)?;
    info!(
        "built hybrid index: n={}, header={}B, body={}B",
        n,
        hdr.len(),
        body.len()
    );
    Ok(HybridIndex::from_parts(n, hdr, body, dict, meta))
}
