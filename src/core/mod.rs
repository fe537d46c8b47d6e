//! Core coordinate conversion functionality
//!
//! This module contains the LRG document model, the exon table extractor,
//! the genome mapping resolver and the coordinate transformer.

pub mod document;
mod error;
pub mod exons;
pub mod mapping;
pub mod sink;
pub mod transform;

pub use document::{is_lrg_id, LrgDocument, MappingEntry, TranscriptNode};
pub use error::{
    ConversionError, ConversionResult, ExonError, ExonResult, InputError, InputResult,
    Lrg2BedError, MappingError, MappingResult, RegistryError, RegistryResult, Result,
    TransformError, TransformResult, UnresolvableStrand,
};
pub use exons::{exon_key, extract_exons, extract_exons_from, ExonTable, LrgRange};
pub use mapping::{resolve_mapping, GenomeBuild, GenomeMapping, MappingResolver, SpanPolicy, Strand};
pub use sink::{FacadeSink, LogSink, MemorySink, NullSink};
pub use transform::{exon_to_genomic, to_genomic_intervals, transform, GenomicInterval};
