//! Integration tests against LRG record excerpts
//!
//! Fixtures live in `tests/data/`:
//! - LRG_293 (BRCA2), forward strand on chr13
//! - LRG_5 (POMGNT1), reverse strand on chr1
//! - LRG_293 with its mapping section removed

use lrg2bed::core::{
    extract_exons, resolve_mapping, transform, ExonError, GenomeBuild, GenomeMapping,
    GenomicInterval, InputError, Lrg2BedError, LrgDocument, MappingError, MemorySink, NullSink,
    Strand,
};
use lrg2bed::formats::BedHeader;
use lrg2bed::pipeline::{convert_document, write_report, ConvertOptions, FailurePolicy};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn load(name: &str) -> LrgDocument {
    LrgDocument::from_path(fixture(name)).unwrap()
}

fn mapping(chrom: &str, start: u64, end: u64, strand: Strand) -> GenomeMapping {
    GenomeMapping {
        chromosome: chrom.to_string(),
        genomic_start: start,
        genomic_end: end,
        strand,
    }
}

// ============================================================================
// Mapping resolution
// ============================================================================

#[test]
fn test_resolve_mapping_both_builds() {
    let lrg_5 = load("LRG_5.xml");
    assert_eq!(
        resolve_mapping(&lrg_5, "GRCh37").unwrap(),
        mapping("chr1", 43210006, 43237755, Strand::Reverse)
    );
    assert_eq!(
        resolve_mapping(&lrg_5, "GRCh38").unwrap(),
        mapping("chr1", 42744335, 42772084, Strand::Reverse)
    );

    let lrg_293 = load("LRG_293.xml");
    assert_eq!(
        resolve_mapping(&lrg_293, "GRCh37").unwrap(),
        mapping("chr13", 32884617, 32975809, Strand::Forward)
    );
    assert_eq!(
        resolve_mapping(&lrg_293, "GRCh38").unwrap(),
        mapping("chr13", 32310480, 32401672, Strand::Forward)
    );
}

#[test]
fn test_mapping_removed_fails_for_every_build() {
    let doc = load("LRG_293_mapping_removed.xml");
    for build in [GenomeBuild::GRCh37, GenomeBuild::GRCh38] {
        let err = resolve_mapping(&doc, build.as_str()).unwrap_err();
        assert!(
            matches!(err, MappingError::MappingNotFound { ref build } if build.starts_with("GRCh")),
            "unexpected error: {}",
            err
        );
    }
}

// ============================================================================
// Exon extraction
// ============================================================================

#[test]
fn test_fixed_transcript_only() {
    let doc = load("LRG_293.xml");
    assert_eq!(doc.lrg_id(), "LRG_293");
    // The RefSeq transcript in the updatable annotation is not a fixed transcript
    assert_eq!(doc.transcript_names(), vec!["t1"]);

    let exons = extract_exons(&doc, "t1").unwrap();
    assert_eq!(exons.labels(), vec!["exon_1", "exon_2", "exon_3"]);
    let first = exons.get("exon_1").unwrap();
    assert_eq!((first.start(), first.end()), (5001, 5188));
}

#[test]
fn test_transcript_not_found() {
    let doc = load("LRG_293.xml");
    let err = extract_exons(&doc, "t2").unwrap_err();
    assert!(matches!(err, ExonError::TranscriptNotFound(ref t) if t == "t2"));
}

// ============================================================================
// Transformation
// ============================================================================

#[test]
fn test_forward_strand_golden() {
    let doc = load("LRG_293.xml");
    let exons = extract_exons(&doc, "t1").unwrap();
    let intervals = transform(&exons, &resolve_mapping(&doc, "GRCh37").unwrap()).unwrap();

    let rows: Vec<(u64, u64, &str)> = intervals
        .iter()
        .map(|i| (i.start, i.end, i.label.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (32889617, 32889804, "exon_1"),
            (32890598, 32890664, "exon_2"),
            (32893214, 32893462, "exon_3"),
        ]
    );
    assert!(intervals.iter().all(|i| i.chrom == "chr13"));
}

#[test]
fn test_reverse_strand_golden() {
    let doc = load("LRG_5.xml");
    let exons = extract_exons(&doc, "t1").unwrap();
    let intervals = transform(&exons, &resolve_mapping(&doc, "GRCh37").unwrap()).unwrap();
    assert_eq!(
        intervals,
        vec![GenomicInterval {
            chrom: "chr1".to_string(),
            start: 43232178,
            end: 43232755,
            label: "exon_1".to_string(),
        }]
    );
}

#[test]
fn test_transform_is_repeatable() {
    let doc = load("LRG_5.xml");
    let exons = extract_exons(&doc, "t1").unwrap();
    let m = resolve_mapping(&doc, "GRCh38").unwrap();
    assert_eq!(transform(&exons, &m).unwrap(), transform(&exons, &m).unwrap());
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_input_validation() {
    assert!(matches!(
        LrgDocument::from_path(fixture("LRG_404.xml")),
        Err(InputError::FileNotFound(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let renamed = dir.path().join("LRG_5.txt");
    std::fs::copy(fixture("LRG_5.xml"), &renamed).unwrap();
    assert!(matches!(LrgDocument::from_path(&renamed), Err(InputError::NotXml(_))));

    let not_lrg = dir.path().join("other.xml");
    std::fs::write(&not_lrg, "<chain><id>LRG_5</id></chain>").unwrap();
    assert!(matches!(
        LrgDocument::from_path(&not_lrg),
        Err(InputError::NotLrg { .. })
    ));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_pipeline_writes_bed_files() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load("LRG_293.xml");
    let options = ConvertOptions::for_build(GenomeBuild::GRCh37).with_transcripts(["t1"]);
    let sink = MemorySink::new();

    let report = convert_document(&doc, &options, &sink).unwrap();
    let header = BedHeader::now().with_build("GRCh37");
    let written = write_report(&report, dir.path(), &header, &sink).unwrap();

    assert_eq!(written, vec![dir.path().join("LRG_293_t1.bed")]);
    let text = std::fs::read_to_string(&written[0]).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("#BED file generated at: "));
    assert_eq!(lines.next().unwrap(), "#Genome build: GRCh37");
    assert_eq!(lines.next().unwrap(), "chr13\t32889617\t32889804\texon_1");
    assert_eq!(lines.count(), 2);
    assert!(sink.contains("LRG_293_t1.bed"));
}

#[test]
fn test_pipeline_abort_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load("LRG_293.xml");
    let mut options = ConvertOptions::for_build(GenomeBuild::GRCh37).with_transcripts(["t1", "t5"]);
    options.failure_policy = FailurePolicy::AbortOnError;

    let err = convert_document(&doc, &options, &NullSink).unwrap_err();
    assert!(matches!(err, Lrg2BedError::Exon(ExonError::TranscriptNotFound(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_pipeline_missing_mapping() {
    let doc = load("LRG_293_mapping_removed.xml");
    let options = ConvertOptions::for_build(GenomeBuild::GRCh38);
    let err = convert_document(&doc, &options, &NullSink).unwrap_err();
    assert!(matches!(err, Lrg2BedError::Mapping(MappingError::MappingNotFound { .. })));
}
