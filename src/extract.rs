// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text extraction: walking the BWT forward via LF-mapping.
//!
//! Every operation here is a loop over one step: `access` a row, emit the
//! raw byte, move to `bucket_start + rank`. Because the index covers the
//! reversed text, that step advances through the *original* text, so
//! extraction reads naturally left to right.
//!
//! Bytes 0 and 1 are structural. 0 terminates a record; 1 separates
//! fields. [`HybridIndex::restore`] turns separators into spaces and
//! emits a NUL between records; the field extractors slice records into
//! columns by walking the separator bucket.
//!
//! The backward walkers need `select` to step against LF order. Select is
//! not implemented, so they fail fast with `None` for anything that would
//! need a real step; they are kept for surface compatibility.

use std::io::{self, Write};

use crate::index::HybridIndex;

/// Restore output is flushed in page-sized chunks.
const PAGE: usize = 4096;

impl HybridIndex {
    /// Walk forward from BWT position `p`, emitting raw bytes until the
    /// terminator `t` or the end of the record. Returns the bytes and the
    /// position holding the terminator. A terminator that never occurs in
    /// the text degrades to end-of-record.
    pub fn forward_extract_to_char(&self, p: usize, t: u8) -> Option<(Vec<u8>, usize)> {
        let mut nt = self.dict().forward(t);
        if self.dict().is_absent(t) {
            nt = 0;
        }

        let mut p = p;
        let mut buf = Vec::new();
        loop {
            if p >= self.len() {
                return None;
            }
            let (b, r) = self.meta().access(self.body(), p);
            if b == nt || b == 0 {
                return Some((buf, p));
            }
            let (base, _) = self.meta().get_block_range(b)?;
            p = base + r;
            buf.push(self.dict().reverse(b));
        }
    }

    /// Stream the indexed text into `sink`: records in sentinel-bucket
    /// order, separators as spaces, a NUL between records.
    pub fn restore<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        let Some((zero, one)) = self.meta().get_block_range(0) else {
            return Ok(());
        };
        let mut next_zero = zero;
        let mut next_one = one + 1;
        let eod = next_one;

        let mut np = next_zero;
        let mut buf = [0u8; PAGE];
        let mut j = 0usize;
        loop {
            let (b, r) = self.meta().access(self.body(), np);
            match b {
                0 => {
                    next_zero += 1;
                    if next_zero == eod {
                        break;
                    }
                    np = next_zero;
                    buf[j] = 0;
                }
                1 => {
                    np = next_one;
                    next_one += 1;
                    buf[j] = b' ';
                }
                _ => {
                    buf[j] = self.dict().reverse(b);
                    let Some((base, _)) = self.meta().get_block_range(b) else {
                        break;
                    };
                    np = base + r;
                }
            }

            j += 1;
            if j == PAGE {
                sink.write_all(&buf)?;
                j = 0;
            }
        }

        if j > 0 {
            sink.write_all(&buf[..j])?;
        }
        Ok(())
    }

    /// The record's fields around position `p`, which must lie in the
    /// separator bucket. `fc` is the fields-per-record count.
    pub fn extract_fields(&self, sep: u8, p: usize, fc: usize) -> Option<Vec<Vec<u8>>> {
        if fc == 0 {
            return None;
        }
        let (fbuf, _) = self.forward_extract_to_char(p, sep)?;

        let (bucket, _) = self.locate(p)?;
        if bucket > sep {
            // reaching the row's own field start would need a backward
            // extract, which needs select
            return None;
        }

        if self.dict().is_absent(sep) {
            return None;
        }
        let (start, _) = self.meta().get_block_range(self.dict().forward(sep))?;
        let r = p.checked_sub(start)?;

        let mut fields = vec![Vec::new(); fc];
        fields[r % fc] = fbuf;
        let ith = r / fc;
        for s in ith * fc..(ith + 1) * fc {
            if s == r {
                continue;
            }
            let (f, _) = self.forward_extract_to_char(start + s, sep)?;
            fields[s % fc] = f;
        }
        Some(fields)
    }

    /// Every record's fields, in record order. `fc` is the
    /// fields-per-record count; rows that fail to extract come back
    /// empty.
    pub fn extract_all_fields(&self, sep: u8, fc: usize) -> Option<Vec<Vec<Vec<u8>>>> {
        if fc == 0 || self.dict().is_absent(sep) {
            return None;
        }
        let (start, end) = self.meta().get_block_range(self.dict().forward(sep))?;

        let rows = (end - start) / fc;
        let mut out = Vec::with_capacity(rows);
        for ith in 0..rows {
            let mut record = Vec::with_capacity(fc);
            for k in 0..fc {
                let p = start + ith * fc + k;
                record.push(
                    self.forward_extract_to_char(p, sep)
                        .map(|(f, _)| f)
                        .unwrap_or_default(),
                );
            }
            out.push(record);
        }
        Some(out)
    }

    /// Raw bytes from BWT position `from` forward until position `to` has
    /// been emitted or a structural byte (< 2) ends the walk.
    pub fn extract_range(&self, from: usize, to: usize) -> Option<Vec<u8>> {
        let mut p = from;
        let mut buf = Vec::new();
        loop {
            if p >= self.len() {
                return None;
            }
            let (b, r) = self.meta().access(self.body(), p);
            if b < 2 {
                return Some(buf);
            }
            buf.push(self.dict().reverse(b));
            if p == to {
                return Some(buf);
            }
            let (base, _) = self.meta().get_block_range(b)?;
            p = base + r;
        }
    }

    /// Walk against LF order from `p` until `t`. Requires select;
    /// anything past an immediate hit returns `None`.
    pub fn backward_extract_to_char(&self, p: usize, t: u8) -> Option<(Vec<u8>, usize)> {
        let mut p = p;
        let mut buf = Vec::new();
        loop {
            let (b, r) = self.locate(p)?;
            if b == t {
                break;
            }
            if b == 0 {
                p = 0;
                break;
            }
            buf.push(b);
            p = self.select(b, r)?;
        }
        buf.reverse();
        Some((buf, p))
    }

    /// Jump against LF order from `p` to the previous `t`. Requires
    /// select; anything past an immediate hit returns `None`.
    pub fn backward_jump_to_char(&self, p: usize, t: u8) -> Option<usize> {
        let mut p = p;
        loop {
            let (b, r) = self.locate(p)?;
            if b == t {
                return Some(p);
            }
            if b == 0 {
                return Some(0);
            }
            p = self.select(b, r)?;
        }
    }
}
