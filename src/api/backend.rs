//! Backend seam over the bridge endpoints consumed by the wizard

use super::models::{
    AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse, PmsRecord, PmsRegistration,
    SuggestRequest, SuggestResponse,
};
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to one of the bridge endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// The external services the wizard orchestrates
///
/// `BridgeClient` talks HTTP; tests substitute an in-memory double.
#[async_trait]
pub trait BridgeBackend: Send + Sync {
    /// Analysis Service: infer initial mappings from sample messages
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError>;

    /// Suggestion Service: propose a canonical field for one source field
    async fn suggest_mapping(&self, request: &SuggestRequest) -> Result<SuggestResponse, ApiError>;

    /// Generation Service: render the translator artifact and mapping document
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError>;

    /// PMS Registry: create (or overwrite) a PMS entity
    async fn register_pms(&self, registration: &PmsRegistration) -> Result<(), ApiError>;

    /// Mapping Store: upload the mapping document for a PMS code
    async fn upload_mapping(&self, code: &str, document: &str) -> Result<(), ApiError>;

    /// Translator Store: upload the translator artifact for a PMS code
    async fn upload_translator(&self, code: &str, artifact: &str) -> Result<(), ApiError>;

    /// PMS Registry: list registered PMS
    async fn list_pms(&self) -> Result<Vec<PmsRecord>, ApiError>;
}
