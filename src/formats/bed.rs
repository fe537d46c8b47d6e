//! BED format writer
//!
//! Writes genomic exon intervals as tab-separated rows
//! `chrom<TAB>start<TAB>end<TAB>label`, preceded by `#` comment lines that
//! record when the file was generated and, for registry downloads, the LRG
//! release status at fetch time.
//!
//! Coordinates are written 1-based inclusive, as LRG numbers them.

use crate::core::{ConversionError, ConversionResult, GenomicInterval};
use crate::web::LrgStatus;
use chrono::{DateTime, Local};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Comment lines written before the intervals
#[derive(Debug, Clone)]
pub struct BedHeader {
    pub generated_at: DateTime<Local>,
    /// Registry status, only known when the record was fetched from the web
    pub registry_status: Option<LrgStatus>,
    pub genome_build: Option<String>,
}

impl BedHeader {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            registry_status: None,
            genome_build: None,
        }
    }

    /// Header stamped with the current local time
    pub fn now() -> Self {
        Self::new(Local::now())
    }

    pub fn with_status(mut self, status: Option<LrgStatus>) -> Self {
        self.registry_status = status;
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.genome_build = Some(build.into());
        self
    }

    /// Rendered comment lines, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "#BED file generated at: {}",
            self.generated_at.format("%Y-%m-%d %H:%M")
        )];
        if let Some(build) = &self.genome_build {
            lines.push(format!("#Genome build: {}", build));
        }
        if let Some(status) = self.registry_status {
            lines.push(format!("#LRG status at fetch time: {}", status));
            lines.push(format!("#{}", status.message()));
        }
        lines
    }
}

/// Output file name for one transcript: `<lrgId>_<transcript>.bed`
pub fn bed_file_name(lrg_id: &str, transcript: &str) -> String {
    format!("{}_{}.bed", lrg_id, transcript)
}

/// Sort intervals by position, ties broken by label
pub fn sort_intervals(intervals: &mut [GenomicInterval]) {
    intervals.sort_by(|a, b| {
        (a.chrom.as_str(), a.start, a.end, a.label.as_str())
            .cmp(&(b.chrom.as_str(), b.start, b.end, b.label.as_str()))
    });
}

/// Write header and intervals to any writer
pub fn write_bed<W: Write>(
    mut writer: W,
    header: &BedHeader,
    intervals: &[GenomicInterval],
) -> ConversionResult<()> {
    for line in header.lines() {
        writeln!(writer, "{}", line)?;
    }
    for interval in intervals {
        writeln!(writer, "{}", interval)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render header and intervals into memory
pub fn render_bed(header: &BedHeader, intervals: &[GenomicInterval]) -> ConversionResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(64 * (intervals.len() + 2));
    write_bed(&mut buf, header, intervals)?;
    Ok(buf)
}

/// Write a BED file
///
/// The whole file is rendered before the destination is created, so a
/// failure never leaves a truncated file behind.
pub fn write_bed_file<P: AsRef<Path>>(
    path: P,
    header: &BedHeader,
    intervals: &[GenomicInterval],
) -> ConversionResult<PathBuf> {
    let path = path.as_ref();
    let rendered = render_bed(header, intervals)?;

    let write_err = |source: std::io::Error| ConversionError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(write_err)?;
    let mut out = BufWriter::with_capacity(64 * 1024, file);
    out.write_all(&rendered).map_err(write_err)?;
    out.flush().map_err(write_err)?;

    Ok(path.to_path_buf())
}
