//! Wire models for the bridge API
//!
//! Field names follow the server's snake_case JSON contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Source-field name to target-field name
pub type FieldMap = BTreeMap<String, String>;

/// Native message format of a PMS feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    #[default]
    Json,
    Xml,
    Graphql,
}

impl MessageFormat {
    pub const ALL: [MessageFormat; 3] = [MessageFormat::Json, MessageFormat::Xml, MessageFormat::Graphql];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Json => "json",
            MessageFormat::Xml => "xml",
            MessageFormat::Graphql => "graphql",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageFormat::Json => "JSON",
            MessageFormat::Xml => "XML",
            MessageFormat::Graphql => "GraphQL",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(MessageFormat::Json),
            "xml" => Ok(MessageFormat::Xml),
            "graphql" => Ok(MessageFormat::Graphql),
            other => Err(format!("Unknown message format '{}'", other)),
        }
    }
}

/// Which of the two mapping dictionaries a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingKind {
    #[default]
    Availability,
    Rate,
}

impl MappingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingKind::Availability => "availability",
            MappingKind::Rate => "rate",
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /wizard/analyze` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub pms_code: String,
    pub message_format: MessageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs_document_content: Option<String>,
}

/// `POST /wizard/analyze` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub availability_mappings: FieldMap,
    #[serde(default)]
    pub rate_mappings: FieldMap,
    #[serde(default)]
    pub unmapped_fields: Vec<String>,
}

/// `POST /wizard/suggest-mapping` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub field: String,
    pub sample_message: String,
    pub rgbridge_fields: Vec<String>,
    #[serde(rename = "type")]
    pub kind: MappingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs_document_content: Option<String>,
}

/// `POST /wizard/suggest-mapping` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// `POST /wizard/generate` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub pms_code: String,
    pub pms_name: String,
    pub availability_mappings: FieldMap,
    pub rate_mappings: FieldMap,
    pub custom_conversions: FieldMap,
    pub message_format: MessageFormat,
}

/// `POST /wizard/generate` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub translator_code: String,
    pub mapping_yaml: String,
}

/// Form body of `POST /pms`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmsRegistration {
    pub code: String,
    pub name: String,
    pub description: String,
    pub combined_avail_rate: bool,
}

impl PmsRegistration {
    /// Form-encoded field pairs in the order the registry expects them
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("code", self.code.clone()),
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("combined_avail_rate", self.combined_avail_rate.to_string()),
        ]
    }
}

/// An entry returned by `GET /pms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmsRecord {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub combined_avail_rate: Option<bool>,
}
