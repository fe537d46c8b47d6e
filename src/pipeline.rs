//! Batch conversion of one LRG record
//!
//! Resolves the genome mapping once, then extracts and transforms every
//! requested transcript. Each transcript gets its own outcome so a missing
//! exon coordinate in one transcript does not hide the others, unless
//! [`FailurePolicy::AbortOnError`] is selected.

use crate::core::{
    extract_exons, transform, ExonError, GenomeBuild, GenomeMapping, GenomicInterval, LogSink, Lrg2BedError,
    LrgDocument, MappingResolver, Result, SpanPolicy,
};
use crate::formats::bed::{bed_file_name, sort_intervals, write_bed_file, BedHeader};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// What to do when one transcript of a batch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and carry on with the remaining transcripts
    #[default]
    Isolate,
    /// Stop at the first failing transcript and write nothing
    AbortOnError,
}

/// Options for [`convert_document`]
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Genome build prefix matched against mapping coordinate systems
    pub build: String,
    /// Transcript names; `None` converts every fixed transcript
    pub transcripts: Option<Vec<String>>,
    pub span_policy: SpanPolicy,
    pub failure_policy: FailurePolicy,
    /// Worker threads (1 = sequential)
    pub threads: usize,
    /// Sort intervals by position instead of exon order
    pub sort: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            build: GenomeBuild::default().to_string(),
            transcripts: None,
            span_policy: SpanPolicy::default(),
            failure_policy: FailurePolicy::default(),
            threads: 1,
            sort: false,
        }
    }
}

impl ConvertOptions {
    pub fn for_build(build: GenomeBuild) -> Self {
        Self {
            build: build.to_string(),
            ..Self::default()
        }
    }

    pub fn with_transcripts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transcripts = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Split a comma-separated transcript list, dropping blanks and repeats
///
/// ```
/// use lrg2bed::pipeline::parse_transcript_list;
/// assert_eq!(parse_transcript_list("t1, t2,,t1"), vec!["t1", "t2"]);
/// ```
pub fn parse_transcript_list(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Result for one transcript
#[derive(Debug)]
pub struct TranscriptOutcome {
    pub transcript: String,
    pub result: Result<Vec<GenomicInterval>>,
}

/// Conversion statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub intervals: usize,
}

/// Everything computed for one document
#[derive(Debug)]
pub struct BatchReport {
    pub lrg_id: String,
    pub mapping: GenomeMapping,
    pub outcomes: Vec<TranscriptOutcome>,
}

impl BatchReport {
    pub fn stats(&self) -> ConversionStats {
        let mut stats = ConversionStats::default();
        for outcome in &self.outcomes {
            stats.total += 1;
            match &outcome.result {
                Ok(intervals) => {
                    stats.success += 1;
                    stats.intervals += intervals.len();
                }
                Err(_) => stats.failed += 1,
            }
        }
        stats
    }

    /// Successful transcripts with their intervals
    pub fn successes(&self) -> impl Iterator<Item = (&str, &[GenomicInterval])> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(intervals) => Some((o.transcript.as_str(), intervals.as_slice())),
            Err(_) => None,
        })
    }

    /// Failed transcripts with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Lrg2BedError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(e) => Some((o.transcript.as_str(), e)),
        })
    }
}

/// Convert one transcript against an already-resolved mapping
pub fn convert_transcript(
    document: &LrgDocument,
    transcript: &str,
    mapping: &GenomeMapping,
    sort: bool,
) -> Result<Vec<GenomicInterval>> {
    let exons = extract_exons(document, transcript)?;
    let mut intervals = transform(&exons, mapping)?;
    if sort {
        sort_intervals(&mut intervals);
    }
    Ok(intervals)
}

/// Convert the requested transcripts of `document`
///
/// An empty selection or a missing genome build fails the whole call.
/// Transcript failures are handled according to `options.failure_policy`.
pub fn convert_document(
    document: &LrgDocument,
    options: &ConvertOptions,
    sink: &dyn LogSink,
) -> Result<BatchReport> {
    let names: Vec<String> = match &options.transcripts {
        Some(names) => names.clone(),
        None => document
            .transcript_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    if names.is_empty() {
        return Err(ExonError::NoTranscriptsSelected(document.lrg_id().to_string()).into());
    }

    let mapping = MappingResolver::new(options.span_policy).resolve(document, &options.build, sink)?;
    sink.info(&format!(
        "Converting {} transcript(s) of {} on {}",
        names.len(),
        document.lrg_id(),
        options.build
    ));

    let run = |name: &String| TranscriptOutcome {
        transcript: name.clone(),
        result: convert_transcript(document, name, &mapping, options.sort),
    };

    let outcomes: Vec<TranscriptOutcome> = if options.threads > 1 && names.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .map_err(|e| {
                Lrg2BedError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to create thread pool: {}", e),
                ))
            })?;
        pool.install(|| names.par_iter().map(run).collect())
    } else {
        names.iter().map(run).collect()
    };

    let mut kept = Vec::with_capacity(outcomes.len());
    for TranscriptOutcome { transcript, result } in outcomes {
        match &result {
            Ok(intervals) => sink.debug(&format!(
                "{}: {} exon interval(s)",
                transcript,
                intervals.len()
            )),
            Err(e) => sink.error(&format!("{}: {}", transcript, e)),
        }
        match result {
            Err(e) if options.failure_policy == FailurePolicy::AbortOnError => return Err(e),
            result => kept.push(TranscriptOutcome { transcript, result }),
        }
    }

    Ok(BatchReport {
        lrg_id: document.lrg_id().to_string(),
        mapping,
        outcomes: kept,
    })
}

/// Load the LRG file at `path` and convert it
pub fn convert_file<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
    sink: &dyn LogSink,
) -> Result<BatchReport> {
    let path = path.as_ref();
    sink.info(&format!("Reading LRG file: {}", path.display()));
    let document = LrgDocument::from_path(path)?;
    convert_document(&document, options, sink)
}

/// Write one BED file per successful transcript into `outdir`
///
/// Returns the paths written, in transcript order.
pub fn write_report<P: AsRef<Path>>(
    report: &BatchReport,
    outdir: P,
    header: &BedHeader,
    sink: &dyn LogSink,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (transcript, intervals) in report.successes() {
        let path = outdir.as_ref().join(bed_file_name(&report.lrg_id, transcript));
        let path = write_bed_file(&path, header, intervals)?;
        sink.info(&format!("Wrote {} interval(s) to {}", intervals.len(), path.display()));
        written.push(path);
    }
    Ok(written)
}
