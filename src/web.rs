//! LRG registry client
//!
//! Resolves a user query (LRG id, HGNC symbol, Ensembl or RefSeq accession)
//! to an LRG id through the EBI search service, checks the record exists,
//! reads its public/pending status and downloads the XML from the LRG FTP
//! area that matches the status.
//!
//! Response parsing is kept in plain functions so it can be tested without a
//! network; [`EbiRegistry`] (feature `web`) performs the HTTP requests.

use crate::core::{is_lrg_id, LogSink, RegistryError, RegistryResult};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// EBI search endpoint for the LRG domain
pub const SEARCH_BASE_URL: &str = "https://www.ebi.ac.uk/ebisearch/ws/rest/lrg";

/// LRG FTP area for public records
pub const PUBLIC_XML_BASE_URL: &str = "http://ftp.ebi.ac.uk/pub/databases/lrgex";

/// LRG FTP area for pending records
pub const PENDING_XML_BASE_URL: &str = "http://ftp.ebi.ac.uk/pub/databases/lrgex/pending";

/// Release status of an LRG record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LrgStatus {
    /// Fixed annotation is final
    Public,
    /// Fixed annotation may still change
    Pending,
}

impl LrgStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LrgStatus::Public => "public",
            LrgStatus::Pending => "pending",
        }
    }

    /// Explanation suitable for logs and BED headers
    pub fn message(&self) -> &'static str {
        match self {
            LrgStatus::Public => {
                "The LRG is marked 'public' on the LRG website: the fixed annotation is final"
            }
            LrgStatus::Pending => {
                "The LRG is marked 'pending' on the LRG website: the fixed annotation is not yet \
                 finalised, so it should be interpreted with caution"
            }
        }
    }

    /// Base URL of the FTP area holding records with this status
    pub fn xml_base_url(&self) -> &'static str {
        match self {
            LrgStatus::Public => PUBLIC_XML_BASE_URL,
            LrgStatus::Pending => PENDING_XML_BASE_URL,
        }
    }
}

impl fmt::Display for LrgStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LrgStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(LrgStatus::Public),
            "pending" => Ok(LrgStatus::Pending),
            other => Err(RegistryError::UnknownStatus(other.to_string())),
        }
    }
}

/// Search URL restricted to the gene-name field
pub fn name_search_url(query: &str) -> String {
    format!("{}?query=name:{}", SEARCH_BASE_URL, urlencoding::encode(query))
}

/// Free-text search URL (accessions, LRG ids)
pub fn search_url(query: &str) -> String {
    format!("{}?query={}", SEARCH_BASE_URL, urlencoding::encode(query))
}

/// Status lookup URL for one LRG id
pub fn status_url(lrg_id: &str) -> String {
    format!(
        "{}/entry/{}?fields=status&format=json",
        SEARCH_BASE_URL,
        urlencoding::encode(lrg_id)
    )
}

/// XML download URL for one LRG id
pub fn xml_url(lrg_id: &str, status: LrgStatus) -> String {
    format!("{}/{}.xml", status.xml_base_url(), urlencoding::encode(lrg_id))
}

/// Hits reported by an EBI search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHits {
    pub hit_count: usize,
    pub ids: Vec<String>,
}

impl SearchHits {
    /// The single hit, or an error naming `query`
    pub fn single(self, query: &str) -> RegistryResult<String> {
        match (self.hit_count, self.ids.len()) {
            (0, _) | (_, 0) => Err(RegistryError::NoHits(query.to_string())),
            (1, 1) => Ok(self.ids.into_iter().next().unwrap_or_default()),
            (count, ids) => Err(RegistryError::MultipleHits {
                query: query.to_string(),
                count: count.max(ids),
            }),
        }
    }
}

/// Parse the XML body returned by the EBI search service
///
/// ```text
/// <result><hitCount>1</hitCount><entries><entry id="LRG_1" source="lrg"/></entries></result>
/// ```
pub fn parse_search_response(body: &str) -> RegistryResult<SearchHits> {
    let xml = roxmltree::Document::parse(body)
        .map_err(|e| RegistryError::MalformedResponse(format!("search response: {}", e)))?;

    let count_text = xml
        .descendants()
        .find(|n| n.has_tag_name("hitCount"))
        .and_then(|n| n.text())
        .ok_or_else(|| RegistryError::MalformedResponse("search response has no hitCount".to_string()))?;
    let hit_count = count_text.trim().parse::<usize>().map_err(|_| {
        RegistryError::MalformedResponse(format!("invalid hitCount '{}'", count_text))
    })?;

    let ids = xml
        .descendants()
        .filter(|n| n.has_tag_name("entry"))
        .filter_map(|n| n.attribute("id"))
        .map(str::to_string)
        .collect();

    Ok(SearchHits { hit_count, ids })
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    entries: Vec<StatusEntry>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    fields: StatusFields,
}

#[derive(Debug, Deserialize)]
struct StatusFields {
    #[serde(default)]
    status: Vec<String>,
}

/// Parse the JSON body of a status lookup
///
/// ```text
/// {"entries":[{"id":"LRG_5","source":"lrg","fields":{"status":["public"]}}]}
/// ```
pub fn parse_status_response(body: &str) -> RegistryResult<LrgStatus> {
    let parsed: StatusResponse = serde_json::from_str(body)
        .map_err(|e| RegistryError::MalformedResponse(format!("status response: {}", e)))?;
    let status = parsed
        .entries
        .first()
        .and_then(|e| e.fields.status.first())
        .ok_or_else(|| RegistryError::MalformedResponse("status response has no entries".to_string()))?;
    status.parse()
}

/// Access to an LRG registry
pub trait LrgRegistry {
    /// Resolve a query to an `LRG_<n>` id
    fn resolve_id(&self, query: &str, sink: &dyn LogSink) -> RegistryResult<String>;

    /// Fail unless exactly one record has this id
    fn check_exists(&self, lrg_id: &str) -> RegistryResult<()>;

    fn status(&self, lrg_id: &str) -> RegistryResult<LrgStatus>;

    fn fetch_xml(&self, lrg_id: &str, status: LrgStatus) -> RegistryResult<String>;
}

/// Record downloaded from a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedLrg {
    pub lrg_id: String,
    pub status: LrgStatus,
    pub xml: String,
}

/// Resolve, verify, look up status and download in one go
pub fn fetch_lrg(
    registry: &dyn LrgRegistry,
    query: &str,
    sink: &dyn LogSink,
) -> RegistryResult<FetchedLrg> {
    sink.info(&format!("Web query input: {}", query));
    let lrg_id = registry.resolve_id(query, sink)?;
    registry.check_exists(&lrg_id)?;

    let status = registry.status(&lrg_id)?;
    sink.info(&format!("LRG status is: {}", status));
    match status {
        LrgStatus::Public => sink.info(status.message()),
        LrgStatus::Pending => sink.warn(status.message()),
    }

    let xml = registry.fetch_xml(&lrg_id, status)?;
    sink.info(&format!("Downloaded {} ({} bytes)", lrg_id, xml.len()));
    Ok(FetchedLrg { lrg_id, status, xml })
}

/// Shared query resolution: LRG ids pass through, anything else is searched
/// by gene name first and then as free text
#[cfg_attr(not(feature = "web"), allow(dead_code))]
fn resolve_with<F>(query: &str, sink: &dyn LogSink, search: F) -> RegistryResult<String>
where
    F: Fn(&str) -> RegistryResult<SearchHits>,
{
    let query = query.trim();
    if query.starts_with("LRG_") {
        return Ok(query.to_string());
    }

    sink.info("Querying webservices to get LRG ID and check that it is valid");
    let by_name = search(&name_search_url(query)).and_then(|hits| hits.single(query));
    let lrg_id = match by_name {
        Ok(id) => id,
        Err(e) => {
            sink.debug(&format!("Name search for {} failed ({}); trying free text", query, e));
            search(&search_url(query))
                .and_then(|hits| hits.single(query))
                .map_err(|e| {
                    sink.error(&format!("Cannot find the LRG from the given input: {}", e));
                    e
                })?
        }
    };

    if !is_lrg_id(&lrg_id) {
        return Err(RegistryError::MalformedResponse(format!(
            "search returned '{}', not an LRG id",
            lrg_id
        )));
    }
    sink.info(&format!("Found LRG ID for {}: {}", query, lrg_id));
    Ok(lrg_id)
}

#[cfg(feature = "web")]
pub use http::EbiRegistry;

#[cfg(feature = "web")]
mod http {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// HTTP client for the EBI search service and LRG FTP area
    pub struct EbiRegistry {
        client: Client,
    }

    impl EbiRegistry {
        /// Create a client with the given request timeout
        pub fn new(timeout: Duration) -> RegistryResult<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| RegistryError::Transport {
                    url: SEARCH_BASE_URL.to_string(),
                    message: format!("Failed to create HTTP client: {}", e),
                })?;
            Ok(Self { client })
        }

        fn get_text(&self, url: &str) -> RegistryResult<String> {
            let response = self.client.get(url).send().map_err(|e| RegistryError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            if !response.status().is_success() {
                return Err(RegistryError::Http {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                });
            }

            response.text().map_err(|e| RegistryError::Transport {
                url: url.to_string(),
                message: format!("Failed to read response: {}", e),
            })
        }

        fn search(&self, url: &str) -> RegistryResult<SearchHits> {
            parse_search_response(&self.get_text(url)?)
        }
    }

    impl LrgRegistry for EbiRegistry {
        fn resolve_id(&self, query: &str, sink: &dyn LogSink) -> RegistryResult<String> {
            resolve_with(query, sink, |url| self.search(url))
        }

        fn check_exists(&self, lrg_id: &str) -> RegistryResult<()> {
            self.search(&search_url(lrg_id))?.single(lrg_id).map(|_| ())
        }

        fn status(&self, lrg_id: &str) -> RegistryResult<LrgStatus> {
            parse_status_response(&self.get_text(&status_url(lrg_id))?)
        }

        fn fetch_xml(&self, lrg_id: &str, status: LrgStatus) -> RegistryResult<String> {
            self.get_text(&xml_url(lrg_id, status))
        }
    }
}
