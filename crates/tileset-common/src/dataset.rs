//! Dataset records, requester identity and catalog filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container format of a dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    /// Multi-resolution contact matrix pyramid.
    MatrixPyramid,
    /// Multi-resolution dense vector pyramid.
    VectorPyramid,
    /// 1D interval annotation database.
    AnnotationDb,
    /// 2D (paired interval) annotation database.
    Annotation2dDb,
    /// Interval database laid out in stacked tracks.
    StackedInterval,
    /// Chromosome name/length table.
    ChromSizes,
    /// Anything the server stores but cannot tile.
    Other(String),
}

impl FileType {
    /// Parse a wire name, accepting the legacy aliases.
    pub fn parse(s: &str) -> Self {
        match s {
            "matrix" | "cooler" => FileType::MatrixPyramid,
            "vector" | "hitile" => FileType::VectorPyramid,
            "beddb" => FileType::AnnotationDb,
            "bed2ddb" => FileType::Annotation2dDb,
            "stacked-interval" | "hibed" => FileType::StackedInterval,
            "chromsizes" | "chromsizes-tsv" | "chromsizes-csv" => FileType::ChromSizes,
            other => FileType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileType::MatrixPyramid => "matrix",
            FileType::VectorPyramid => "vector",
            FileType::AnnotationDb => "beddb",
            FileType::Annotation2dDb => "bed2ddb",
            FileType::StackedInterval => "stacked-interval",
            FileType::ChromSizes => "chromsizes",
            FileType::Other(name) => name,
        }
    }

    /// True for file types whose features can be searched by name.
    pub fn is_annotation(&self) -> bool {
        matches!(
            self,
            FileType::AnnotationDb | FileType::Annotation2dDb | FileType::StackedInterval
        )
    }
}

impl From<String> for FileType {
    fn from(s: String) -> Self {
        FileType::parse(&s)
    }
}

impl From<FileType> for String {
    fn from(ft: FileType) -> Self {
        ft.as_str().to_string()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored description of an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "datafile")]
    pub file_path: String,
    #[serde(rename = "filetype")]
    pub file_type: FileType,
    #[serde(rename = "datatype")]
    pub data_type: String,
    #[serde(rename = "coordSystem")]
    pub coord_system: String,
    #[serde(rename = "coordSystem2")]
    pub coord_system_2: String,
    pub owner: Option<String>,
    pub private: bool,
    pub created: DateTime<Utc>,
}

impl DatasetRecord {
    /// Final path component of the data file.
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.file_path)
    }
}

/// Input for registering a new dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDataset {
    /// Explicit id; generated when absent.
    #[serde(default, alias = "uid")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "datafile")]
    pub file_path: String,
    #[serde(rename = "filetype")]
    pub file_type: String,
    #[serde(rename = "datatype", default)]
    pub data_type: Option<String>,
    #[serde(rename = "coordSystem", default)]
    pub coord_system: Option<String>,
    #[serde(rename = "coordSystem2", default)]
    pub coord_system_2: Option<String>,
    /// Defaults to private when not given.
    #[serde(default)]
    pub private: Option<bool>,
}

/// Identity of the caller, as established by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Requester(Option<String>);

impl Requester {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    /// Build from an optional header value; blank values are anonymous.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(id) if !id.is_empty() => Self::user(id),
            _ => Self::anonymous(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id().unwrap_or("<anonymous>"))
    }
}

/// Record-store level filter for dataset lookups.
///
/// Visibility is not part of the filter; callers apply the access gate.
#[derive(Debug, Clone, Default)]
pub struct DatasetFilter {
    /// Match any of these data types (empty matches all).
    pub data_types: Vec<String>,
    pub file_type: Option<FileType>,
    /// Case-insensitive substring of the dataset name.
    pub name_contains: Option<String>,
    /// Exact basename of the data file.
    pub file_name: Option<String>,
}

impl DatasetFilter {
    /// Whether `name` passes the `name_contains` filter, ignoring case.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name_contains {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// A stored view configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConf {
    pub uuid: String,
    pub document: serde_json::Value,
    pub created: DateTime<Utc>,
}
