//! lrg2bed - LRG exon coordinates as genomic BED intervals
//!
//! Reads a Locus Reference Genomic (LRG) XML record and writes the exons of
//! selected transcripts as BED rows on GRCh37 or GRCh38.
//!
//! # Features
//!
//! - Strand-aware LRG → genome arithmetic with checked overflow
//! - Typed errors for every failure (missing build, missing exon coordinates,
//!   unknown transcript, unresolvable strand)
//! - Per-transcript failure isolation in batch runs
//! - Optional LRG registry lookup by LRG id, HGNC symbol or transcript accession
//!
//! # Example
//!
//! ```ignore
//! use lrg2bed::{LrgDocument, extract_exons, resolve_mapping, transform};
//!
//! let doc = LrgDocument::from_path("LRG_293.xml")?;
//! let mapping = resolve_mapping(&doc, "GRCh37")?;
//! let exons = extract_exons(&doc, "t1")?;
//! let intervals = transform(&exons, &mapping)?;
//! ```

pub mod core;
pub mod formats;
pub mod pipeline;
pub mod web;

// Re-export commonly used types
pub use core::{
    extract_exons, resolve_mapping, to_genomic_intervals, transform, ExonError, ExonTable,
    GenomeBuild, GenomeMapping, GenomicInterval, InputError, Lrg2BedError, LrgDocument,
    LrgRange, MappingError, MappingResolver, SpanPolicy, Strand, TransformError,
};
pub use formats::bed;
pub use pipeline::{convert_document, convert_file, BatchReport, ConvertOptions, FailurePolicy};
