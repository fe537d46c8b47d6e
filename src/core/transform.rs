//! LRG → genomic coordinate transformation
//!
//! Converts the LRG-local exon boundaries of one transcript into genomic
//! intervals using the mapping of the LRG on a genome build:
//!
//! - Forward strand: `g_start = genomic_start + lrg_start - 1`,
//!   `g_end = genomic_start + lrg_end - 1`
//! - Reverse strand: `g_end = genomic_end - lrg_end + 1`,
//!   `g_start = g_end + (lrg_end - lrg_start)`; the pair is emitted as
//!   `(g_end, g_start)` so the smaller value is always first
//!
//! All arithmetic is checked; an exon that would land before base 1 or past
//! `u64::MAX` is reported instead of wrapping.

use crate::core::error::{TransformError, TransformResult};
use crate::core::exons::{ExonTable, LrgRange};
use crate::core::mapping::{GenomeMapping, Strand};
use std::fmt;

/// One output row: 1-based inclusive, `start <= end`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicInterval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub label: String,
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.chrom, self.start, self.end, self.label)
    }
}

/// Transform using an already-resolved mapping
pub fn transform(table: &ExonTable, mapping: &GenomeMapping) -> TransformResult<Vec<GenomicInterval>> {
    table
        .iter()
        .map(|(label, range)| {
            let (start, end) = exon_to_genomic(
                range,
                mapping.genomic_start,
                mapping.genomic_end,
                mapping.strand,
            )
            .ok_or_else(|| TransformError::CoordinateOutOfRange {
                label: label.to_string(),
                lrg_start: range.start(),
                lrg_end: range.end(),
                genomic_start: mapping.genomic_start,
                genomic_end: mapping.genomic_end,
            })?;
            Ok(GenomicInterval {
                chrom: mapping.chromosome.clone(),
                start,
                end,
                label: label.to_string(),
            })
        })
        .collect()
}

/// Transform from the raw mapping fields
///
/// `strand` is the LRG attribute value; it is checked before any exon is
/// looked at, so an unresolvable strand fails even for an empty table.
///
/// # Arguments
/// * `table` - Exon table in LRG numbering
/// * `chromosome` - Output chromosome name (already `chr`-prefixed)
/// * `genomic_start`, `genomic_end` - LRG placement on the build
/// * `strand` - `"1"` or `"-1"`
pub fn to_genomic_intervals(
    table: &ExonTable,
    chromosome: &str,
    genomic_start: u64,
    genomic_end: u64,
    strand: Option<&str>,
) -> TransformResult<Vec<GenomicInterval>> {
    let strand = Strand::from_lrg(strand)?;
    let mapping = GenomeMapping {
        chromosome: chromosome.to_string(),
        genomic_start,
        genomic_end,
        strand,
    };
    transform(table, &mapping)
}

/// Genomic `(start, end)` for one exon, `None` on under/overflow
#[inline]
pub fn exon_to_genomic(
    range: LrgRange,
    genomic_start: u64,
    genomic_end: u64,
    strand: Strand,
) -> Option<(u64, u64)> {
    match strand {
        Strand::Forward => {
            let start = genomic_start.checked_add(range.start())?.checked_sub(1)?;
            let end = genomic_start.checked_add(range.end())?.checked_sub(1)?;
            Some((start, end))
        }
        Strand::Reverse => {
            let exon_length = range.end() - range.start();
            let g_end = genomic_end.checked_add(1)?.checked_sub(range.end())?;
            if g_end == 0 {
                return None;
            }
            let g_start = g_end.checked_add(exon_length)?;
            // LRG order runs against the genome here, so the end becomes the BED start
            Some((g_end, g_start))
        }
    }
}
