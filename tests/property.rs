//! Property-based tests: the compressed index against naive oracles.
//!
//! Texts are drawn without the reserved byte 0 and sized to cross block
//! and super-block boundaries, so every codec and both rank levels get
//! exercised.

mod common;

use common::{oracle_bwt, oracle_count, oracle_rank};
use proptest::prelude::*;
use talpa::HybridIndex;

/// Texts over the full sentinel-free alphabet, long enough to span
/// multiple super-blocks (8 blocks = 2048 positions).
fn any_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1u8..=255, 0..2600)
}

/// Texts over a handful of symbols: long runs and dominant symbols push
/// blocks into the single, run-length and sparse codecs.
fn narrow_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(b'a'), Just(b'a'), Just(b'a'), Just(b'b'), Just(b'c')], 0..1200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn access_matches_oracle(text in any_text()) {
        let idx = HybridIndex::new(&text).unwrap();
        let bwt = oracle_bwt(&text);
        prop_assert_eq!(idx.len(), bwt.len());

        let mut ranks = [0usize; 256];
        for (p, &c) in bwt.iter().enumerate() {
            ranks[c as usize] += 1;
            prop_assert_eq!(idx.access(p), Some((c, ranks[c as usize])));
        }
    }

    #[test]
    fn rank_matches_oracle(text in narrow_text(), probe in any::<u8>()) {
        let idx = HybridIndex::new(&text).unwrap();
        let bwt = oracle_bwt(&text);

        for p in 0..bwt.len() {
            prop_assert_eq!(idx.rank(probe, p), Some(oracle_rank(&bwt, probe, p)));
            prop_assert_eq!(idx.rank(bwt[p], p), Some(oracle_rank(&bwt, bwt[p], p)));
        }
    }

    #[test]
    fn count_matches_oracle(text in any_text(), start in 0usize..2600, len in 1usize..12) {
        prop_assume!(!text.is_empty());
        let start = start % text.len();
        let len = len.min(text.len() - start);
        let pattern = &text[start..start + len];

        let idx = HybridIndex::new(&text).unwrap();
        prop_assert_eq!(idx.count(pattern), oracle_count(&text, pattern));
    }

    #[test]
    fn absent_patterns_are_not_found(text in narrow_text(), pattern in prop::collection::vec(1u8..=255, 1..6)) {
        let idx = HybridIndex::new(&text).unwrap();
        let expected = oracle_count(&text, &pattern);
        match idx.search(&pattern) {
            Some((s, e)) => prop_assert_eq!(e - s, expected),
            None => prop_assert_eq!(expected, 0),
        }
    }

    #[test]
    fn serialization_round_trips(text in narrow_text()) {
        let idx = HybridIndex::new(&text).unwrap();
        let blob = idx.to_bytes();
        let back = HybridIndex::from_bytes(idx.len(), idx.dictionary(), &blob).unwrap();

        prop_assert_eq!(back.to_bytes(), blob);
        for p in 0..idx.len() {
            prop_assert_eq!(back.access(p), idx.access(p));
        }
        for probe in [b'a', b'b', b'c', b'z', 0u8] {
            for p in (0..idx.len()).step_by(7) {
                prop_assert_eq!(back.rank(probe, p), idx.rank(probe, p));
            }
        }
    }

    #[test]
    fn bounds_partition_the_index(text in any_text()) {
        let idx = HybridIndex::new(&text).unwrap();

        // bucket ends strictly increase in byte order and tile the BWT
        let mut prev_end = idx.get_bound(0).unwrap().1;
        let mut covered = prev_end + 1;
        for b in 1..=255u8 {
            if let Some((s, e)) = idx.get_bound(b) {
                prop_assert_eq!(s, prev_end);
                prop_assert!(e > s);
                covered += e - s;
                prev_end = e;
            }
        }
        prop_assert_eq!(covered, idx.len());

        // bucket widths are occurrence counts
        let mut counts = [0usize; 256];
        for &b in &text {
            counts[b as usize] += 1;
        }
        for b in 1..=255u8 {
            let width = idx.get_bound(b).map_or(0, |(s, e)| e - s);
            prop_assert_eq!(width, counts[b as usize]);
        }
    }

    #[test]
    fn restore_inverts_construction(text in prop::collection::vec(2u8..=255, 0..800)) {
        // separator-free text restores byte for byte
        let idx = HybridIndex::new(&text).unwrap();
        let mut out = Vec::new();
        idx.restore(&mut out).unwrap();
        prop_assert_eq!(out, text);
    }

    #[test]
    fn histogram_counts_every_byte(text in narrow_text()) {
        let idx = HybridIndex::new(&text).unwrap();
        let hist = idx.histogram();
        let mut counts = [0usize; 256];
        counts[0] = 1;
        for &b in &text {
            counts[b as usize] += 1;
        }
        prop_assert_eq!(hist, counts);
    }
}
