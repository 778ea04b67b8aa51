use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const NOTE_JSON: &str = "application/vnd.olrapi.note+json";
pub const JSONLOGIC: &str = "application/vnd.olrapi.jsonlogic+json";
pub const DATAVIEW_DQL: &str = "application/vnd.olrapi.dataview.dql+txt";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    pub ctime: i64,
    pub mtime: i64,
    pub size: u64,
}

/// A note as returned by the vault in its note-JSON representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileContents {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    pub frontmatter: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stat: FileStat,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

// The vault omits or nulls fields it has nothing for, e.g. `content` when
// includeContent=false.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl FileContents {
    /// JSON rendering for logs, with the body replaced by its byte count.
    pub fn summary(&self) -> String {
        let summary = Self {
            content: format!("({} bytes)", self.content.len()),
            ..self.clone()
        };
        serde_json::to_string(&summary).unwrap_or_else(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileList {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "match")]
    pub span: MatchSpan,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub filename: String,
    pub score: f64,
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
}

/// One hit from a structured query. `result` is whatever the query engine produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexResult {
    pub filename: String,
    #[serde(default)]
    pub result: Value,
}

/// Error body the REST API sends with 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub error_code: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::Quarterly,
        Period::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Period::as_str).collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period: {0}, must be one of daily, weekly, monthly, quarterly, yearly")]
pub struct ParsePeriodError(pub String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePeriodError(s.to_string()))
    }
}

/// Query dialect for `POST /search/`, selected through the request content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryType {
    JsonLogic,
    DataviewDql,
    Other(String),
}

impl QueryType {
    pub fn content_type(&self) -> &str {
        match self {
            QueryType::JsonLogic => JSONLOGIC,
            QueryType::DataviewDql => DATAVIEW_DQL,
            QueryType::Other(content_type) => content_type,
        }
    }
}
