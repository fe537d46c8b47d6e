//! LRG XML document loading
//!
//! Parses an LRG record into an owned, read-only tree holding only the parts
//! the converter needs: the fixed annotation id, the fixed transcripts with
//! their exon coordinate entries, and every genome `mapping` element.
//!
//! # LRG layout
//!
//! ```text
//! <lrg>
//!   <fixed_annotation>
//!     <id>LRG_293</id>
//!     <transcript name="t1">
//!       <exon label="1">
//!         <coordinates coord_system="LRG_293" start="5001" end="5188" strand="1"/>
//!         <coordinates coord_system="LRG_293t1" start="1" end="188" strand="1"/>
//!       </exon>
//!     </transcript>
//!   </fixed_annotation>
//!   <updatable_annotation>
//!     <annotation_set type="lrg">
//!       <mapping coord_system="GRCh37.p13" other_name="13" type="main_assembly">
//!         <mapping_span other_start="32884617" other_end="32975809" strand="1"/>
//!       </mapping>
//!     </annotation_set>
//!   </updatable_annotation>
//! </lrg>
//! ```
//!
//! Attribute values are kept as raw strings; numeric validation happens in the
//! extractor and resolver so each reports its own error kind.

use crate::core::error::{ExonError, ExonResult, InputError, InputResult};
use roxmltree::Node;
use std::path::Path;

/// One `<coordinates>` element inside an exon
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinateEntry {
    pub coord_system: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// One `<exon>` element of a fixed transcript
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExonNode {
    pub label: Option<String>,
    pub coordinates: Vec<CoordinateEntry>,
}

/// One `<transcript>` element of the fixed annotation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptNode {
    pub name: String,
    pub exons: Vec<ExonNode>,
}

/// One `<mapping_span>` element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingSpanNode {
    pub other_start: Option<String>,
    pub other_end: Option<String>,
    pub strand: Option<String>,
}

/// One `<mapping>` element, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingEntry {
    pub coord_system: Option<String>,
    pub other_name: Option<String>,
    pub mapping_type: Option<String>,
    pub spans: Vec<MappingSpanNode>,
}

/// Immutable parsed LRG record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrgDocument {
    lrg_id: String,
    schema_version: Option<String>,
    transcripts: Vec<TranscriptNode>,
    mappings: Vec<MappingEntry>,
}

impl LrgDocument {
    /// Load an LRG file from disk
    ///
    /// The path must exist and end in `.xml` (checked before reading).
    pub fn from_path<P: AsRef<Path>>(path: P) -> InputResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(InputError::FileNotFound(path.to_path_buf()));
        }
        let is_xml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "xml")
            .unwrap_or(false);
        if !is_xml {
            return Err(InputError::NotXml(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Parse an LRG record from text (local file contents or a registry download)
    pub fn parse_str(text: &str) -> InputResult<Self> {
        let xml = roxmltree::Document::parse(text)
            .map_err(|e| InputError::MalformedXml(e.to_string()))?;
        let root = xml.root_element();

        let root_tag = root.tag_name().name();
        if !root_tag.eq_ignore_ascii_case("lrg") {
            return Err(InputError::NotLrg {
                root: root_tag.to_string(),
            });
        }

        let fixed = root
            .descendants()
            .filter(|n| n.has_tag_name("fixed_annotation"))
            .last()
            .ok_or(InputError::MissingLrgId)?;

        let lrg_id = fixed
            .children()
            .find(|n| n.has_tag_name("id"))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(InputError::MissingLrgId)?;
        if !is_lrg_id(&lrg_id) {
            return Err(InputError::InvalidLrgId(lrg_id));
        }

        let transcripts = fixed
            .children()
            .filter(|n| n.has_tag_name("transcript"))
            .map(parse_transcript)
            .collect();

        let mappings = root
            .descendants()
            .filter(|n| n.has_tag_name("mapping"))
            .map(parse_mapping)
            .collect();

        Ok(Self {
            lrg_id,
            schema_version: root.attribute("schema_version").map(str::to_string),
            transcripts,
            mappings,
        })
    }

    /// Stable identifier, `LRG_<digits>`
    pub fn lrg_id(&self) -> &str {
        &self.lrg_id
    }

    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    pub fn transcript_names(&self) -> Vec<&str> {
        self.transcripts.iter().map(|t| t.name.as_str()).collect()
    }

    /// Look up a fixed transcript by its `name` attribute (e.g. `t1`)
    pub fn transcript(&self, name: &str) -> ExonResult<&TranscriptNode> {
        self.transcripts
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ExonError::TranscriptNotFound(name.to_string()))
    }

    /// Every `mapping` element anywhere in the record, in document order
    pub fn mappings(&self) -> &[MappingEntry] {
        &self.mappings
    }
}

/// Check the `LRG_<digits>` identifier format
pub fn is_lrg_id(s: &str) -> bool {
    match s.strip_prefix("LRG_") {
        Some(num) => !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn attr(node: &Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn parse_transcript(node: Node) -> TranscriptNode {
    let exons = node
        .descendants()
        .filter(|n| n.has_tag_name("exon"))
        .map(|exon| ExonNode {
            label: attr(&exon, "label"),
            coordinates: exon
                .descendants()
                .filter(|n| n.has_tag_name("coordinates"))
                .map(|c| CoordinateEntry {
                    coord_system: attr(&c, "coord_system"),
                    start: attr(&c, "start"),
                    end: attr(&c, "end"),
                })
                .collect(),
        })
        .collect();

    TranscriptNode {
        name: node.attribute("name").unwrap_or_default().to_string(),
        exons,
    }
}

fn parse_mapping(node: Node) -> MappingEntry {
    MappingEntry {
        coord_system: attr(&node, "coord_system"),
        other_name: attr(&node, "other_name"),
        mapping_type: attr(&node, "type"),
        spans: node
            .descendants()
            .filter(|n| n.has_tag_name("mapping_span"))
            .map(|s| MappingSpanNode {
                other_start: attr(&s, "other_start"),
                other_end: attr(&s, "other_end"),
                strand: attr(&s, "strand"),
            })
            .collect(),
    }
}
