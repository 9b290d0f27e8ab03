// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types for index construction and deserialization.
//!
//! Queries never return errors; a failed lookup is `None` (out-of-range
//! position, unknown byte, empty or absent pattern). `Error` covers the two
//! fallible entry points: building from text and restoring from bytes.

use thiserror::Error;

/// Errors raised while building or decoding an index.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The input text contains the reserved end-of-text byte 0.
    #[error("input text contains the reserved sentinel byte 0")]
    SentinelInInput,

    /// The text produces more per-block symbol records than the 32-bit
    /// count field of the serialized header can hold.
    #[error("index too large: {0} symbol records exceed the u32 header count")]
    TooLarge(usize),

    /// The serialized buffer ended in the middle of a structure.
    #[error("truncated input: expected at least {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    /// A block header carried a codec tag or symbol count that the encoder
    /// never produces.
    #[error("invalid block record at header offset {0}")]
    InvalidRecord(usize),

    /// A block body range points past the end of the body buffer.
    #[error("block body overruns the body buffer ({end} > {len})")]
    BodyOverrun { end: usize, len: usize },

    /// The decoded records do not add up to the count declared in the
    /// header prelude.
    #[error("record count mismatch: header declares {declared}, decoded {decoded}")]
    RecordCountMismatch { declared: usize, decoded: usize },

    /// The decoded frequencies do not add up to the declared BWT length.
    #[error("length mismatch: declared BWT length {declared}, frequencies sum to {decoded}")]
    LengthMismatch { declared: usize, decoded: usize },
}
