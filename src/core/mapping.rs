//! Genome build mapping resolution
//!
//! Finds where an LRG record sits on a genome assembly. The record's
//! `mapping` elements carry a `coord_system` such as `GRCh37.p13`; the
//! requested build only has to be a prefix of it.
//!
//! Selection rule: among mappings whose `coord_system` starts with the build,
//! the last one in document order is used, and within it the last
//! `mapping_span` supplies start, end and strand. [`SpanPolicy::Strict`]
//! turns any such overwrite into an error instead.

use crate::core::document::{LrgDocument, MappingEntry, MappingSpanNode};
use crate::core::error::{MappingError, MappingResult, UnresolvableStrand};
use crate::core::sink::{LogSink, NullSink};
use std::fmt;
use std::str::FromStr;

/// Strand orientation of the LRG on the genome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse an LRG strand attribute
    ///
    /// Only `"1"` and `"-1"` are accepted; anything else (including an
    /// absent attribute or an empty string) is unresolvable.
    ///
    /// # Examples
    /// ```
    /// use lrg2bed::core::Strand;
    /// assert_eq!(Strand::from_lrg(Some("1")), Ok(Strand::Forward));
    /// assert_eq!(Strand::from_lrg(Some("-1")), Ok(Strand::Reverse));
    /// assert!(Strand::from_lrg(Some("2")).is_err());
    /// assert!(Strand::from_lrg(None).is_err());
    /// ```
    pub fn from_lrg(raw: Option<&str>) -> Result<Self, UnresolvableStrand> {
        match raw {
            Some("1") => Ok(Strand::Forward),
            Some("-1") => Ok(Strand::Reverse),
            other => Err(UnresolvableStrand(other.map(str::to_string))),
        }
    }

    /// LRG attribute form
    pub fn as_lrg(&self) -> &'static str {
        match self {
            Strand::Forward => "1",
            Strand::Reverse => "-1",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_lrg())
    }
}

/// Supported genome assemblies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenomeBuild {
    #[default]
    GRCh37,
    GRCh38,
}

impl GenomeBuild {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenomeBuild::GRCh37 => "GRCh37",
            GenomeBuild::GRCh38 => "GRCh38",
        }
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenomeBuild {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GRCh37" => Ok(GenomeBuild::GRCh37),
            "GRCh38" => Ok(GenomeBuild::GRCh38),
            _ => Err(format!("unsupported genome build '{}': expected GRCh37 or GRCh38", s)),
        }
    }
}

/// Placement of an LRG on one genome build
///
/// 1-based inclusive, `genomic_start <= genomic_end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeMapping {
    pub chromosome: String,
    pub genomic_start: u64,
    pub genomic_end: u64,
    pub strand: Strand,
}

/// How to treat several matching mappings or spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanPolicy {
    /// Later entries overwrite earlier ones; the last one wins
    #[default]
    LastWins,
    /// More than one matching mapping or span is an error
    Strict,
}

/// Resolver with an explicit span selection policy
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingResolver {
    policy: SpanPolicy,
}

impl MappingResolver {
    pub fn new(policy: SpanPolicy) -> Self {
        Self { policy }
    }

    /// Resolve the mapping of `document` on `build`
    ///
    /// `build` is matched as a prefix of each mapping's `coord_system`.
    pub fn resolve(
        &self,
        document: &LrgDocument,
        build: &str,
        sink: &dyn LogSink,
    ) -> MappingResult<GenomeMapping> {
        let matches: Vec<&MappingEntry> = document
            .mappings()
            .iter()
            .filter(|m| {
                m.coord_system
                    .as_deref()
                    .map(|cs| cs.starts_with(build))
                    .unwrap_or(false)
            })
            .collect();

        let mapping = self.select(&matches, build, "mappings", sink)?.ok_or_else(|| {
            MappingError::MappingNotFound {
                build: build.to_string(),
            }
        })?;

        let other_name = mapping.other_name.as_deref().ok_or(MappingError::MissingAttribute {
            element: "mapping",
            attribute: "other_name",
        })?;

        let spans: Vec<&MappingSpanNode> = mapping.spans.iter().collect();
        let span = self.select(&spans, build, "mapping spans", sink)?.ok_or_else(|| {
            MappingError::NoMappingSpans {
                build: build.to_string(),
            }
        })?;

        let genomic_start = parse_span_field(span.other_start.as_deref(), "other_start")?;
        let genomic_end = parse_span_field(span.other_end.as_deref(), "other_end")?;
        if genomic_start > genomic_end {
            return Err(MappingError::InvalidRange {
                start: genomic_start,
                end: genomic_end,
            });
        }
        let strand = Strand::from_lrg(span.strand.as_deref())?;

        let resolved = GenomeMapping {
            chromosome: format!("chr{}", other_name),
            genomic_start,
            genomic_end,
            strand,
        };
        sink.debug(&format!(
            "{} {} maps to {}:{}-{} (strand {})",
            document.lrg_id(),
            build,
            resolved.chromosome,
            resolved.genomic_start,
            resolved.genomic_end,
            resolved.strand
        ));
        Ok(resolved)
    }

    fn select<'a, T>(
        &self,
        candidates: &[&'a T],
        build: &str,
        what: &'static str,
        sink: &dyn LogSink,
    ) -> MappingResult<Option<&'a T>> {
        if candidates.len() > 1 {
            match self.policy {
                SpanPolicy::Strict => {
                    return Err(MappingError::AmbiguousMapping {
                        build: build.to_string(),
                        what,
                        count: candidates.len(),
                    });
                }
                SpanPolicy::LastWins => sink.warn(&format!(
                    "{} {} matched {}; using the last one",
                    candidates.len(),
                    what,
                    build
                )),
            }
        }
        Ok(candidates.last().copied())
    }
}

/// Resolve with the default last-wins policy and no logging
pub fn resolve_mapping(document: &LrgDocument, build: &str) -> MappingResult<GenomeMapping> {
    MappingResolver::default().resolve(document, build, &NullSink)
}

fn parse_span_field(raw: Option<&str>, attribute: &'static str) -> MappingResult<u64> {
    let raw = raw.ok_or(MappingError::MissingAttribute {
        element: "mapping_span",
        attribute,
    })?;
    raw.trim().parse::<u64>().map_err(|_| MappingError::InvalidNumber {
        attribute,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::MemorySink;

    fn doc_with_mappings(mappings: &str) -> LrgDocument {
        let xml = format!(
            r#"<lrg>
  <fixed_annotation><id>LRG_9</id></fixed_annotation>
  <updatable_annotation><annotation_set type="lrg">{}</annotation_set></updatable_annotation>
</lrg>"#,
            mappings
        );
        LrgDocument::parse_str(&xml).unwrap()
    }

    const TWO_BUILDS: &str = r#"
<mapping coord_system="GRCh37.p13" other_name="11" type="main_assembly">
  <mapping_span lrg_start="1" lrg_end="39783" other_start="111952571" other_end="111992353" strand="1"/>
</mapping>
<mapping coord_system="GRCh38.p14" other_name="11" type="main_assembly">
  <mapping_span lrg_start="1" lrg_end="39784" other_start="112081847" other_end="112121630" strand="1"/>
</mapping>"#;

    #[test]
    fn test_strand_from_lrg() {
        assert_eq!(Strand::from_lrg(Some("1")), Ok(Strand::Forward));
        assert_eq!(Strand::from_lrg(Some("-1")), Ok(Strand::Reverse));
        for bad in ["2", "", "+", "-", " 1", "+1", "forward"] {
            assert_eq!(
                Strand::from_lrg(Some(bad)),
                Err(UnresolvableStrand(Some(bad.to_string())))
            );
        }
        assert_eq!(Strand::from_lrg(None), Err(UnresolvableStrand(None)));
    }

    #[test]
    fn test_genome_build_parse() {
        assert_eq!("GRCh37".parse::<GenomeBuild>(), Ok(GenomeBuild::GRCh37));
        assert_eq!("GRCh38".parse::<GenomeBuild>(), Ok(GenomeBuild::GRCh38));
        assert!("hg19".parse::<GenomeBuild>().is_err());
        assert_eq!(GenomeBuild::default().to_string(), "GRCh37");
    }

    #[test]
    fn test_resolve_each_build() {
        let doc = doc_with_mappings(TWO_BUILDS);
        assert_eq!(
            resolve_mapping(&doc, "GRCh37").unwrap(),
            GenomeMapping {
                chromosome: "chr11".to_string(),
                genomic_start: 111952571,
                genomic_end: 111992353,
                strand: Strand::Forward,
            }
        );
        let grch38 = resolve_mapping(&doc, "GRCh38").unwrap();
        assert_eq!(grch38.genomic_start, 112081847);
        assert_eq!(grch38.genomic_end, 112121630);
    }

    #[test]
    fn test_prefix_match_on_coord_system() {
        let doc = doc_with_mappings(TWO_BUILDS);
        // A bare prefix still matches a versioned system
        assert!(resolve_mapping(&doc, "GRCh3").is_ok());
        assert!(matches!(
            resolve_mapping(&doc, "GRCh37.p9"),
            Err(MappingError::MappingNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_build_fails() {
        let doc = doc_with_mappings("");
        let err = resolve_mapping(&doc, "GRCh37").unwrap_err();
        assert!(matches!(err, MappingError::MappingNotFound { ref build } if build == "GRCh37"));
    }

    #[test]
    fn test_mapping_without_spans_fails() {
        let doc = doc_with_mappings(r#"<mapping coord_system="GRCh37.p13" other_name="1"/>"#);
        assert!(matches!(
            resolve_mapping(&doc, "GRCh37"),
            Err(MappingError::NoMappingSpans { .. })
        ));
    }

    const MULTI_SPAN: &str = r#"
<mapping coord_system="GRCh37.p13" other_name="1">
  <mapping_span other_start="100" other_end="200" strand="1"/>
  <mapping_span other_start="300" other_end="400" strand="-1"/>
</mapping>"#;

    #[test]
    fn test_last_span_wins() {
        let doc = doc_with_mappings(MULTI_SPAN);
        let sink = MemorySink::new();
        let m = MappingResolver::default()
            .resolve(&doc, "GRCh37", &sink)
            .unwrap();
        assert_eq!((m.genomic_start, m.genomic_end, m.strand), (300, 400, Strand::Reverse));
        assert!(sink.contains("2 mapping spans matched GRCh37"));
    }

    #[test]
    fn test_last_mapping_wins() {
        let doc = doc_with_mappings(
            r#"
<mapping coord_system="GRCh37.p13" other_name="1">
  <mapping_span other_start="100" other_end="200" strand="1"/>
</mapping>
<mapping coord_system="GRCh37.p13" other_name="HSCHR1_1_CTG3">
  <mapping_span other_start="5000" other_end="6000" strand="1"/>
</mapping>"#,
        );
        let m = resolve_mapping(&doc, "GRCh37").unwrap();
        assert_eq!(m.chromosome, "chrHSCHR1_1_CTG3");
        assert_eq!(m.genomic_start, 5000);
    }

    #[test]
    fn test_strict_policy_rejects_multiple_spans() {
        let doc = doc_with_mappings(MULTI_SPAN);
        let err = MappingResolver::new(SpanPolicy::Strict)
            .resolve(&doc, "GRCh37", &NullSink)
            .unwrap_err();
        assert!(matches!(
            err,
            MappingError::AmbiguousMapping { what: "mapping spans", count: 2, .. }
        ));
    }

    #[test]
    fn test_bad_strand_is_fatal() {
        let doc = doc_with_mappings(
            r#"<mapping coord_system="GRCh37" other_name="1">
  <mapping_span other_start="100" other_end="200" strand="2"/>
</mapping>"#,
        );
        assert!(matches!(
            resolve_mapping(&doc, "GRCh37"),
            Err(MappingError::Strand(UnresolvableStrand(Some(ref s)))) if s == "2"
        ));
    }

    #[test]
    fn test_bad_span_fields() {
        let doc = doc_with_mappings(
            r#"<mapping coord_system="GRCh37" other_name="1">
  <mapping_span other_start="200" other_end="100" strand="1"/>
</mapping>"#,
        );
        assert!(matches!(
            resolve_mapping(&doc, "GRCh37"),
            Err(MappingError::InvalidRange { start: 200, end: 100 })
        ));

        let doc = doc_with_mappings(
            r#"<mapping coord_system="GRCh37" other_name="1">
  <mapping_span other_end="100" strand="1"/>
</mapping>"#,
        );
        assert!(matches!(
            resolve_mapping(&doc, "GRCh37"),
            Err(MappingError::MissingAttribute { attribute: "other_start", .. })
        ));
    }
}
