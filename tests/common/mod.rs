//! In-memory bridge backend recording every call

#![allow(dead_code)]

use async_trait::async_trait;
use pms_wizard::api::{
    AnalyzeRequest, AnalyzeResponse, ApiError, BridgeBackend, FieldMap, GenerateRequest, GenerateResponse,
    PmsRecord, PmsRegistration, SuggestRequest, SuggestResponse,
};
use pms_wizard::wizard::WizardConfiguration;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Analyze,
    Suggest,
    Generate,
    Register,
    UploadMapping,
    UploadTranslator,
    ListPms,
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Call>>,
    pub analyze_response: Mutex<AnalyzeResponse>,
    pub suggest_response: Mutex<SuggestResponse>,
    pub generate_response: Mutex<GenerateResponse>,
    pub registry: Mutex<Vec<PmsRecord>>,
    pub last_analyze: Mutex<Option<AnalyzeRequest>>,
    pub last_suggest: Mutex<Option<SuggestRequest>>,
    pub last_generate: Mutex<Option<GenerateRequest>>,
    pub registrations: Mutex<Vec<PmsRegistration>>,
    pub uploads: Mutex<Vec<(Call, String, String)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            generate_response: Mutex::new(GenerateResponse {
                translator_code: "class Translator:\n    pass\n".to_string(),
                mapping_yaml: "pms_code: cb\n".to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn fail(&self, call: Call) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn succeed(&self, call: Call) {
        self.failing.lock().unwrap().remove(&call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&call) {
            return Err(ApiError::Status {
                url: format!("http://bridge.test/{:?}", call),
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BridgeBackend for FakeBackend {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        *self.last_analyze.lock().unwrap() = Some(request.clone());
        self.record(Call::Analyze)?;
        Ok(self.analyze_response.lock().unwrap().clone())
    }

    async fn suggest_mapping(&self, request: &SuggestRequest) -> Result<SuggestResponse, ApiError> {
        *self.last_suggest.lock().unwrap() = Some(request.clone());
        self.record(Call::Suggest)?;
        Ok(self.suggest_response.lock().unwrap().clone())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        *self.last_generate.lock().unwrap() = Some(request.clone());
        self.record(Call::Generate)?;
        Ok(self.generate_response.lock().unwrap().clone())
    }

    async fn register_pms(&self, registration: &PmsRegistration) -> Result<(), ApiError> {
        self.record(Call::Register)?;
        self.registrations.lock().unwrap().push(registration.clone());
        self.registry.lock().unwrap().push(PmsRecord {
            code: registration.code.clone(),
            name: registration.name.clone(),
            description: Some(registration.description.clone()),
            status: Some("active".to_string()),
            combined_avail_rate: Some(registration.combined_avail_rate),
        });
        Ok(())
    }

    async fn upload_mapping(&self, code: &str, document: &str) -> Result<(), ApiError> {
        self.record(Call::UploadMapping)?;
        self.uploads
            .lock()
            .unwrap()
            .push((Call::UploadMapping, code.to_string(), document.to_string()));
        Ok(())
    }

    async fn upload_translator(&self, code: &str, artifact: &str) -> Result<(), ApiError> {
        self.record(Call::UploadTranslator)?;
        self.uploads
            .lock()
            .unwrap()
            .push((Call::UploadTranslator, code.to_string(), artifact.to_string()));
        Ok(())
    }

    async fn list_pms(&self) -> Result<Vec<PmsRecord>, ApiError> {
        self.record(Call::ListPms)?;
        Ok(self.registry.lock().unwrap().clone())
    }
}

pub fn field_map(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Identity filled in and artifacts generated, ready to commit
pub fn ready_configuration() -> WizardConfiguration {
    let mut config = WizardConfiguration::new();
    config.pms_code = "cb".to_string();
    config.pms_name = "Cloudbeds".to_string();
    config.description = "Cloud PMS".to_string();
    config.store_generated(GenerateResponse {
        translator_code: "class Translator:\n    pass\n".to_string(),
        mapping_yaml: "pms_code: cb\n".to_string(),
    });
    config
}
