//! Single-field mapping suggestions from the Suggestion Service

use crate::api::{BridgeBackend, MappingKind, SuggestRequest, SuggestResponse};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionMethod {
    Ai,
    Heuristic,
}

impl SuggestionMethod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ai" => Some(SuggestionMethod::Ai),
            "heuristic" => Some(SuggestionMethod::Heuristic),
            _ => None,
        }
    }
}

impl fmt::Display for SuggestionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionMethod::Ai => write!(f, "AI"),
            SuggestionMethod::Heuristic => write!(f, "heuristic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggestion {
    pub suggestion: Option<String>,
    pub method: Option<SuggestionMethod>,
}

impl Suggestion {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.suggestion.is_some()
    }
}

/// Thin delegation to the Suggestion Service. Failures never surface as
/// errors: the caller just gets no suggestion.
#[derive(Clone)]
pub struct SuggestionClient {
    backend: Arc<dyn BridgeBackend>,
}

impl SuggestionClient {
    pub fn new(backend: Arc<dyn BridgeBackend>) -> Self {
        Self { backend }
    }

    pub fn request_for(
        source_field: &str,
        sample_message: &str,
        candidates: &[String],
        kind: MappingKind,
        specs_text: Option<&str>,
    ) -> SuggestRequest {
        SuggestRequest {
            field: source_field.to_string(),
            sample_message: sample_message.to_string(),
            rgbridge_fields: candidates.to_vec(),
            kind,
            specs_document_content: specs_text.map(str::to_string),
        }
    }

    pub async fn suggest(
        &self,
        source_field: &str,
        sample_message: &str,
        candidates: &[String],
        kind: MappingKind,
        specs_text: Option<&str>,
    ) -> Suggestion {
        let request = Self::request_for(source_field, sample_message, candidates, kind, specs_text);
        self.suggest_request(&request).await
    }

    pub async fn suggest_request(&self, request: &SuggestRequest) -> Suggestion {
        match self.backend.suggest_mapping(request).await {
            Ok(response) => Self::interpret(response),
            Err(e) => {
                warn!("No suggestion for '{}': {}", request.field, e);
                Suggestion::none()
            }
        }
    }

    /// Blank suggestions count as none; unknown methods are dropped
    pub fn interpret(response: SuggestResponse) -> Suggestion {
        let suggestion = response
            .suggestion
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let method = response.method.as_deref().and_then(|raw| {
            let parsed = SuggestionMethod::parse(raw);
            if parsed.is_none() {
                debug!("Unknown suggestion method '{}'", raw);
            }
            parsed
        });

        Suggestion { suggestion, method }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_known_method() {
        let suggestion = SuggestionClient::interpret(SuggestResponse {
            suggestion: Some("InvCode".to_string()),
            method: Some("AI".to_string()),
        });

        assert_eq!(suggestion.suggestion.as_deref(), Some("InvCode"));
        assert_eq!(suggestion.method, Some(SuggestionMethod::Ai));
    }

    #[test]
    fn test_interpret_blank_and_unknown() {
        let suggestion = SuggestionClient::interpret(SuggestResponse {
            suggestion: Some("  ".to_string()),
            method: Some("oracle".to_string()),
        });

        assert_eq!(suggestion, Suggestion::none());
        assert!(!suggestion.is_available());
    }

    #[test]
    fn test_request_for_carries_specs_text() {
        let candidates = vec!["HotelCode".to_string()];
        let request =
            SuggestionClient::request_for("hotel", "{}", &candidates, MappingKind::Availability, Some("spec"));

        assert_eq!(request.field, "hotel");
        assert_eq!(request.rgbridge_fields, candidates);
        assert_eq!(request.specs_document_content.as_deref(), Some("spec"));
    }
}
