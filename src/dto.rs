use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DataFile {
    pub bucket: String,
    pub key: String,
}

/// A center row as exported from the record store. Read-only to detection.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CenterRecord {
    pub id: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub lga: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Optional case-insensitive substring filters applied by the record loader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CenterFilters {
    pub state: Option<String>,
    pub lga: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateType {
    Name,
    Address,
    Both,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_similarity(similarity: u8) -> Self {
        match similarity {
            95..=u8::MAX => Confidence::High,
            85..=94 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

/// A set of centers believed to be the same real-world institution.
#[derive(Clone, Debug, Serialize)]
pub struct DuplicateGroup<'a> {
    pub id: String,
    pub centers: Vec<&'a CenterRecord>,
    pub similarity: u8,
    #[serde(rename = "type")]
    pub duplicate_type: DuplicateType,
    pub reason: String,
    pub confidence: Confidence,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct TypeBreakdown {
    pub name: usize,
    pub address: usize,
    pub both: usize,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ConfidenceBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub total_groups: usize,
    pub total_centers: usize,
    pub by_type: TypeBreakdown,
    pub by_confidence: ConfidenceBreakdown,
}

#[derive(Clone, Debug, Serialize)]
pub struct DetectionReport<'a> {
    pub duplicates: Vec<DuplicateGroup<'a>>,
    pub summary: DetectionSummary,
}

/// Parsed query string of a detection request, echoed back as `filters`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionQuery {
    pub state: Option<String>,
    pub lga: Option<String>,
    pub min_similarity: u8,
    pub max_results: usize,
}

impl DetectionQuery {
    pub fn filters(&self) -> CenterFilters {
        CenterFilters {
            state: self.state.clone(),
            lga: self.lga.clone(),
        }
    }
}

///
/// The subset of an API Gateway REST proxy event the service reads.
///
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl ApiGatewayRequest {
    /// Header lookup ignoring case, as API Gateway forwards headers verbatim.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(|value| value.as_str())
    }
}
