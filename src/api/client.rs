use super::backend::{ApiError, BridgeBackend};
use super::constants::{self, headers};
use super::models::{
    AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse, PmsRecord, PmsRegistration,
    SuggestRequest, SuggestResponse,
};
use crate::config::ApiSettings;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// HTTP client for the RGBridge onboarding API
#[derive(Clone)]
pub struct BridgeClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::from_settings(&ApiSettings {
            base_url: base_url.into(),
            ..ApiSettings::default()
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(constants::USER_AGENT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self::with_custom_client(settings.base_url.clone(), http_client))
    }

    /// Create a client around an already configured `reqwest::Client`
    pub fn with_custom_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request with a fresh correlation id; non-2xx becomes `ApiError::Status`
    async fn send(
        &self,
        method: &str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        debug!("{} {} [{}]", method, url, correlation_id);

        let started = Instant::now();
        let response = request
            .header(headers::X_CORRELATION_ID, &correlation_id)
            .send()
            .await
            .map_err(|source| {
                warn!("{} {} failed after {:?} [{}]: {}", method, url, started.elapsed(), correlation_id, source);
                ApiError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        info!("{} {} -> {} in {:?} [{}]", method, url, status.as_u16(), started.elapsed(), correlation_id);

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn read_json<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = constants::endpoint(&self.base_url, path);
        let request = self
            .http_client
            .post(&url)
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .json(body);

        let response = self.send("POST", &url, request).await?;
        Self::read_json(&url, response).await
    }

    /// Multipart upload of a text artifact under `{collection}/{code}`
    async fn upload(
        &self,
        collection: &str,
        code: &str,
        filename: String,
        content_type: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        let url = constants::keyed_endpoint(&self.base_url, collection, code);

        let part = Part::text(content.to_string())
            .file_name(filename)
            .mime_str(content_type)
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let form = Form::new().part(constants::UPLOAD_PART_NAME, part);

        self.send("POST", &url, self.http_client.post(&url).multipart(form)).await?;
        Ok(())
    }
}

#[async_trait]
impl BridgeBackend for BridgeClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        self.post_json(constants::ANALYZE_ENDPOINT, request).await
    }

    async fn suggest_mapping(&self, request: &SuggestRequest) -> Result<SuggestResponse, ApiError> {
        self.post_json(constants::SUGGEST_ENDPOINT, request).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        self.post_json(constants::GENERATE_ENDPOINT, request).await
    }

    async fn register_pms(&self, registration: &PmsRegistration) -> Result<(), ApiError> {
        let url = constants::endpoint(&self.base_url, constants::PMS_COLLECTION);
        let request = self.http_client.post(&url).form(&registration.form_fields());

        self.send("POST", &url, request).await?;
        Ok(())
    }

    async fn upload_mapping(&self, code: &str, document: &str) -> Result<(), ApiError> {
        self.upload(
            constants::MAPPINGS_COLLECTION,
            code,
            constants::mapping_filename(code),
            headers::CONTENT_TYPE_YAML,
            document,
        )
        .await
    }

    async fn upload_translator(&self, code: &str, artifact: &str) -> Result<(), ApiError> {
        self.upload(
            constants::TRANSLATORS_COLLECTION,
            code,
            constants::translator_filename(code),
            headers::CONTENT_TYPE_PYTHON,
            artifact,
        )
        .await
    }

    async fn list_pms(&self) -> Result<Vec<PmsRecord>, ApiError> {
        let url = constants::endpoint(&self.base_url, constants::PMS_COLLECTION);
        let request = self
            .http_client
            .get(&url)
            .header("Accept", headers::CONTENT_TYPE_JSON);

        let response = self.send("GET", &url, request).await?;
        Self::read_json(&url, response).await
    }
}
