//! Exon table extraction
//!
//! Reads the LRG-local boundaries of every exon of one fixed transcript. Only
//! the `coordinates` entry whose `coord_system` equals the document's own LRG
//! id is used; transcript- and protein-relative entries are ignored.

use crate::core::document::{ExonNode, LrgDocument, TranscriptNode};
use crate::core::error::{ExonError, ExonResult};

/// 1-based inclusive range in LRG-local numbering
///
/// Always satisfies `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LrgRange {
    start: u64,
    end: u64,
}

impl LrgRange {
    /// Returns `None` unless `1 <= start <= end`
    pub fn new(start: u64, end: u64) -> Option<Self> {
        if start >= 1 && start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bases covered
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Exon label → LRG range, in document order
///
/// Keys are `exon_<label>`. Labels are not assumed to sort by position
/// (`14a`, `14c`), so iteration order is the order exons were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExonTable {
    entries: Vec<(String, LrgRange)>,
}

impl ExonTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exon; labels must be unique within the table
    pub fn insert(&mut self, label: impl Into<String>, range: LrgRange) -> ExonResult<()> {
        let label = label.into();
        if self.get(&label).is_some() {
            return Err(ExonError::DuplicateLabel(label));
        }
        self.entries.push((label, range));
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<LrgRange> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, r)| *r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LrgRange)> + '_ {
        self.entries.iter().map(|(l, r)| (l.as_str(), *r))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output key for an exon label
pub fn exon_key(label: &str) -> String {
    format!("exon_{}", label)
}

/// Extract the exon table of the named fixed transcript
///
/// Fails with [`ExonError::TranscriptNotFound`] when the document has no such
/// transcript, never with an empty table.
pub fn extract_exons(document: &LrgDocument, transcript: &str) -> ExonResult<ExonTable> {
    let node = document.transcript(transcript)?;
    extract_exons_from(node, document.lrg_id())
}

/// Extract the exon table from a transcript node
///
/// # Arguments
/// * `transcript` - Fixed-annotation transcript
/// * `lrg_id` - Coordinate system to read boundaries from (e.g. `LRG_293`)
pub fn extract_exons_from(transcript: &TranscriptNode, lrg_id: &str) -> ExonResult<ExonTable> {
    if transcript.exons.is_empty() {
        return Err(ExonError::NoExons(transcript.name.clone()));
    }

    let mut table = ExonTable::new();
    for exon in &transcript.exons {
        let label = exon.label.as_deref().ok_or(ExonError::MissingAttribute {
            element: "exon",
            attribute: "label",
        })?;
        let range = lrg_range(exon, label, lrg_id)?;
        table.insert(exon_key(label), range)?;
    }
    Ok(table)
}

fn lrg_range(exon: &ExonNode, label: &str, lrg_id: &str) -> ExonResult<LrgRange> {
    // Several entries for the same system would be malformed; the last one is kept.
    let coords = exon
        .coordinates
        .iter()
        .filter(|c| c.coord_system.as_deref() == Some(lrg_id))
        .last()
        .ok_or_else(|| ExonError::MissingCoordinate {
            exon: label.to_string(),
            lrg_id: lrg_id.to_string(),
        })?;

    let start = parse_position(coords.start.as_deref(), label, "start")?;
    let end = parse_position(coords.end.as_deref(), label, "end")?;

    LrgRange::new(start, end).ok_or_else(|| ExonError::InvalidRange {
        exon: label.to_string(),
        start,
        end,
    })
}

fn parse_position(raw: Option<&str>, label: &str, attribute: &'static str) -> ExonResult<u64> {
    let raw = raw.ok_or(ExonError::MissingAttribute {
        element: "coordinates",
        attribute,
    })?;
    raw.trim().parse::<u64>().map_err(|_| ExonError::InvalidNumber {
        exon: label.to_string(),
        attribute,
        value: raw.to_string(),
    })
}
