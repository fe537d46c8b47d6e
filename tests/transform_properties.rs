//! Property-based tests for the LRG → genomic transformation
//!
//! Exon tables are generated inside a mapping of random size and placement;
//! the properties hold for both strands.

use lrg2bed::core::{
    exon_to_genomic, to_genomic_intervals, transform, ExonTable, GenomeMapping, LrgRange, Strand,
    TransformError,
};
use proptest::prelude::*;

/// Generate a strand
fn arb_strand() -> impl Strategy<Value = Strand> {
    prop_oneof![Just(Strand::Forward), Just(Strand::Reverse)]
}

/// Generate a mapping span of at least 7001 bases (5000 upstream + 2000 downstream flank)
fn arb_mapping() -> impl Strategy<Value = GenomeMapping> {
    (1u64..250_000_000, 7_001u64..2_000_000, arb_strand()).prop_map(|(start, len, strand)| {
        GenomeMapping {
            chromosome: "chr7".to_string(),
            genomic_start: start,
            genomic_end: start + len - 1,
            strand,
        }
    })
}

/// Generate an exon table that fits inside an LRG of `lrg_len` bases
fn arb_table(lrg_len: u64) -> impl Strategy<Value = ExonTable> {
    prop::collection::vec((1u64..=lrg_len, 0u64..5_000), 1..20).prop_map(move |raw| {
        let mut table = ExonTable::new();
        for (i, (start, size)) in raw.into_iter().enumerate() {
            let end = (start + size).min(lrg_len);
            table
                .insert(format!("exon_{}", i + 1), LrgRange::new(start, end).unwrap())
                .unwrap();
        }
        table
    })
}

fn arb_case() -> impl Strategy<Value = (GenomeMapping, ExonTable)> {
    arb_mapping().prop_flat_map(|m| {
        let lrg_len = m.genomic_end - m.genomic_start + 1;
        (Just(m), arb_table(lrg_len))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every output interval has start <= end, whatever the strand
    #[test]
    fn prop_output_ordered((m, table) in arb_case()) {
        let intervals = transform(&table, &m).unwrap();
        prop_assert_eq!(intervals.len(), table.len());
        for interval in &intervals {
            prop_assert!(interval.start <= interval.end,
                "{} has start {} > end {}", interval.label, interval.start, interval.end);
        }
    }

    /// Exons inside the LRG land inside the mapping and keep their length
    #[test]
    fn prop_within_mapping_and_length_preserved((m, table) in arb_case()) {
        let intervals = transform(&table, &m).unwrap();
        for (interval, (_, range)) in intervals.iter().zip(table.iter()) {
            prop_assert!(interval.start >= m.genomic_start);
            prop_assert!(interval.end <= m.genomic_end);
            prop_assert_eq!(interval.end - interval.start + 1, range.length());
        }
    }

    /// Output order is the table order
    #[test]
    fn prop_order_preserved((m, table) in arb_case()) {
        let intervals = transform(&table, &m).unwrap();
        let labels: Vec<&str> = intervals.iter().map(|i| i.label.as_str()).collect();
        prop_assert_eq!(labels, table.labels());
    }

    /// Pure function: same inputs, same outputs
    #[test]
    fn prop_idempotent((m, table) in arb_case()) {
        prop_assert_eq!(transform(&table, &m).unwrap(), transform(&table, &m).unwrap());
    }

    /// Forward strand: LRG base 5001 is genomic_start + 5000
    #[test]
    fn prop_forward_transcript_start(m in arb_mapping()) {
        let range = LrgRange::new(5001, 5001).unwrap();
        let (start, end) = exon_to_genomic(range, m.genomic_start, m.genomic_end, Strand::Forward).unwrap();
        prop_assert_eq!(start, m.genomic_start + 5000);
        prop_assert_eq!(end, start);
    }

    /// The two strands mirror each other around the mapping
    #[test]
    fn prop_strands_mirror((m, table) in arb_case()) {
        let forward = GenomeMapping { strand: Strand::Forward, ..m.clone() };
        let reverse = GenomeMapping { strand: Strand::Reverse, ..m.clone() };
        let fwd = transform(&table, &forward).unwrap();
        let rev = transform(&table, &reverse).unwrap();
        for (f, r) in fwd.iter().zip(rev.iter()) {
            prop_assert_eq!(f.start - m.genomic_start, m.genomic_end - r.end);
            prop_assert_eq!(f.end - m.genomic_start, m.genomic_end - r.start);
        }
    }

    /// Any strand string other than "1" / "-1" is rejected
    #[test]
    fn prop_unresolvable_strand(raw in "[-+0-9a-zA-Z ]{0,4}") {
        prop_assume!(raw != "1" && raw != "-1");
        let mut table = ExonTable::new();
        table.insert("exon_1", LrgRange::new(5001, 5188).unwrap()).unwrap();
        let result = to_genomic_intervals(&table, "chr13", 32884617, 32975809, Some(raw.as_str()));
        prop_assert!(matches!(result, Err(TransformError::Strand(_))));
    }
}

#[test]
fn test_named_unresolvable_strands() {
    let mut table = ExonTable::new();
    table.insert("exon_1", LrgRange::new(5001, 5188).unwrap()).unwrap();
    for raw in [Some("2"), Some(""), Some("+1"), None] {
        assert!(matches!(
            to_genomic_intervals(&table, "chr13", 32884617, 32975809, raw),
            Err(TransformError::Strand(_))
        ));
    }
}
