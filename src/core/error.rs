//! Error types for lrg2bed
//!
//! Defines all error types used throughout the library. Each failure listed
//! for the conversion pipeline has its own variant so callers can tell a
//! missing genome build apart from a missing exon coordinate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lrg2bed operations
#[derive(Debug, Error)]
pub enum Lrg2BedError {
    /// Input file / document validation errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Genome build mapping errors
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Exon table extraction errors
    #[error("Exon error: {0}")]
    Exon(#[from] ExonError),

    /// Coordinate transformation errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// BED output errors
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// LRG registry (network) errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised before any genomic content is read
#[derive(Debug, Error)]
pub enum InputError {
    /// Path does not exist or is not a regular file
    #[error("Input is not a file: {0}")]
    FileNotFound(PathBuf),

    /// Path does not carry the `.xml` extension
    #[error("Input file is not an xml file: {0}")]
    NotXml(PathBuf),

    /// Root element is not `LRG`
    #[error("Input is not an LRG document (root element '{root}')")]
    NotLrg { root: String },

    /// XML could not be parsed at all
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// `fixed_annotation/id` is absent
    #[error("LRG document has no fixed_annotation id")]
    MissingLrgId,

    /// Identifier is not of the form `LRG_<digits>`
    #[error("Invalid LRG identifier '{0}': expected LRG_<number>")]
    InvalidLrgId(String),

    /// I/O error while reading the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Strand field that is neither `1` nor `-1`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot determine strand from {}", describe_strand(.0))]
pub struct UnresolvableStrand(pub Option<String>);

fn describe_strand(raw: &Option<String>) -> String {
    match raw {
        Some(s) => format!("'{}'", s),
        None => "a missing strand attribute".to_string(),
    }
}

/// Errors that can occur while resolving a genome build mapping
#[derive(Debug, Error)]
pub enum MappingError {
    /// No mapping entry starts with the requested build identifier
    #[error("No mapping found for genome build {build}")]
    MappingNotFound { build: String },

    /// The selected mapping has no mapping_span children
    #[error("Mapping for genome build {build} has no mapping spans")]
    NoMappingSpans { build: String },

    /// Strict span policy saw more than one candidate
    #[error("Mapping for genome build {build} is ambiguous: {count} {what} matched")]
    AmbiguousMapping {
        build: String,
        what: &'static str,
        count: usize,
    },

    /// Required attribute missing on a mapping element
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Attribute present but not an integer
    #[error("Invalid integer '{value}' for attribute '{attribute}'")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },

    /// Genomic start after genomic end
    #[error("Invalid genomic range: start ({start}) > end ({end})")]
    InvalidRange { start: u64, end: u64 },

    /// Strand attribute could not be resolved
    #[error(transparent)]
    Strand(#[from] UnresolvableStrand),
}

/// Errors that can occur while extracting an exon table
#[derive(Debug, Error)]
pub enum ExonError {
    /// Requested transcript is not in the fixed annotation
    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),

    /// Selection names no transcript, or the record has no fixed transcripts
    #[error("No transcripts selected from {0}")]
    NoTranscriptsSelected(String),

    /// Transcript has no exon children
    #[error("Transcript {0} has no exons")]
    NoExons(String),

    /// Exon has no coordinates in the document's own LRG coordinate system
    #[error("Exon {exon} has no coordinates for coordinate system {lrg_id}")]
    MissingCoordinate { exon: String, lrg_id: String },

    /// Required attribute missing on an exon or coordinates element
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Attribute present but not an integer
    #[error("Invalid integer '{value}' for attribute '{attribute}' of exon {exon}")]
    InvalidNumber {
        exon: String,
        attribute: &'static str,
        value: String,
    },

    /// LRG-local range violates 1 <= start <= end
    #[error("Invalid LRG range for exon {exon}: {start}-{end}")]
    InvalidRange { exon: String, start: u64, end: u64 },

    /// The same exon label appears twice in one transcript
    #[error("Duplicate exon label: {0}")]
    DuplicateLabel(String),
}

/// Errors that can occur while converting LRG positions to genomic positions
#[derive(Debug, Error)]
pub enum TransformError {
    /// Strand could not be resolved
    #[error(transparent)]
    Strand(#[from] UnresolvableStrand),

    /// Exon falls outside the representable genomic range
    #[error("Exon {label} ({lrg_start}-{lrg_end}) falls outside the genomic mapping {genomic_start}-{genomic_end}")]
    CoordinateOutOfRange {
        label: String,
        lrg_start: u64,
        lrg_end: u64,
        genomic_start: u64,
        genomic_end: u64,
    },
}

/// Errors that can occur while writing BED output
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Output write error
    #[error("Failed to write output {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the LRG registry web services
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Non-success HTTP status
    #[error("Could not query {url} (HTTP {status}), check your connection and try again")]
    Http { url: String, status: u16 },

    /// Connection / transport level failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Search returned zero hits
    #[error("There were no hits for {0}, check the input")]
    NoHits(String),

    /// Search returned more than one hit
    #[error("Expected one hit for {query} but there were {count}, check the input")]
    MultipleHits { query: String, count: usize },

    /// Response body could not be interpreted
    #[error("Malformed registry response: {0}")]
    MalformedResponse(String),

    /// Status is neither public nor pending
    #[error("The LRG status could not be resolved as public or pending: '{0}'")]
    UnknownStatus(String),
}

/// Result type alias for lrg2bed operations
pub type Result<T> = std::result::Result<T, Lrg2BedError>;

/// Result type alias for document loading
pub type InputResult<T> = std::result::Result<T, InputError>;

/// Result type alias for mapping resolution
pub type MappingResult<T> = std::result::Result<T, MappingError>;

/// Result type alias for exon extraction
pub type ExonResult<T> = std::result::Result<T, ExonError>;

/// Result type alias for coordinate transformation
pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Result type alias for BED output
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
