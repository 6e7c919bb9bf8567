//! The wizard's single mutable configuration aggregate

use super::commit::CommitSaga;
use crate::api::{
    AnalyzeRequest, FieldMap, GenerateRequest, GenerateResponse, MappingKind, MessageFormat, PmsRegistration,
};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Vendor specification attached as extra context for analysis and suggestions.
/// Never parsed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecsDocument {
    pub filename: String,
    pub content: Vec<u8>,
}

impl SpecsDocument {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).with_context(|| format!("Failed to read specs document: {:?}", path))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "specs".to_string());

        Ok(Self::new(filename, content))
    }

    /// Text sent as `specs_document_content`
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Everything the operator has entered or the services have returned so far.
///
/// Mapping dictionaries, the unmapped-field set and the generated artifacts
/// are only mutable through `MappingEditor` and `store_generated`, so their
/// invariants hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardConfiguration {
    pub pms_code: String,
    pub pms_name: String,
    pub description: String,
    pub message_format: MessageFormat,
    pub combined_mode: bool,
    pub sample_availability_message: String,
    pub sample_rate_message: String,
    pub specs_document: Option<SpecsDocument>,
    /// Dictionary `add_mapping` targets in separate mode
    pub mapping_focus: MappingKind,

    pub(crate) availability_mappings: FieldMap,
    pub(crate) rate_mappings: FieldMap,
    pub(crate) custom_conversions: FieldMap,
    pub(crate) unmapped_fields: BTreeSet<String>,
    pub(crate) manual_edits: bool,

    pub(crate) generated_translator_code: String,
    pub(crate) generated_mapping_document: String,

    pub(crate) commit_saga: CommitSaga,
}

impl WizardConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// PMS code as it is sent to every endpoint
    pub fn pms_code(&self) -> &str {
        self.pms_code.trim()
    }

    pub fn availability_mappings(&self) -> &FieldMap {
        &self.availability_mappings
    }

    /// Stored rate mappings, including any left over from separate mode
    pub fn rate_mappings(&self) -> &FieldMap {
        &self.rate_mappings
    }

    pub fn mappings(&self, kind: MappingKind) -> &FieldMap {
        match kind {
            MappingKind::Availability => &self.availability_mappings,
            MappingKind::Rate => &self.rate_mappings,
        }
    }

    /// Rate mappings as they take effect: always empty in combined mode
    pub fn effective_rate_mappings(&self) -> FieldMap {
        if self.combined_mode {
            FieldMap::new()
        } else {
            self.rate_mappings.clone()
        }
    }

    pub fn custom_conversions(&self) -> &FieldMap {
        &self.custom_conversions
    }

    pub fn unmapped_fields(&self) -> &BTreeSet<String> {
        &self.unmapped_fields
    }

    /// Whether mappings were edited by hand since the last analysis merge
    pub fn has_manual_edits(&self) -> bool {
        self.manual_edits
    }

    pub fn generated_translator_code(&self) -> &str {
        &self.generated_translator_code
    }

    pub fn generated_mapping_document(&self) -> &str {
        &self.generated_mapping_document
    }

    pub fn has_generated_artifacts(&self) -> bool {
        !self.generated_translator_code.is_empty() && !self.generated_mapping_document.is_empty()
    }

    pub fn commit_saga(&self) -> &CommitSaga {
        &self.commit_saga
    }

    /// Dictionary that `add_mapping` writes to
    pub fn relevant_kind(&self) -> MappingKind {
        if self.combined_mode {
            MappingKind::Availability
        } else {
            self.mapping_focus
        }
    }

    /// Dictionaries whose keys count as "mapped" for the unmapped-field set
    pub(crate) fn active_kinds(&self) -> &'static [MappingKind] {
        if self.combined_mode {
            &[MappingKind::Availability]
        } else {
            &[MappingKind::Availability, MappingKind::Rate]
        }
    }

    pub(crate) fn is_mapped(&self, source_field: &str) -> bool {
        self.active_kinds()
            .iter()
            .any(|kind| self.mappings(*kind).contains_key(source_field))
    }

    /// Labels of the identity fields that are still blank
    pub fn missing_identity_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.pms_code().is_empty() {
            missing.push("PMS code");
        }
        if self.pms_name.trim().is_empty() {
            missing.push("PMS name");
        }
        missing
    }

    pub fn has_identity(&self) -> bool {
        self.missing_identity_fields().is_empty()
    }

    /// Sample message used for a dictionary; combined mode has only one
    pub fn sample_for(&self, kind: MappingKind) -> &str {
        match kind {
            _ if self.combined_mode => &self.sample_availability_message,
            MappingKind::Availability => &self.sample_availability_message,
            MappingKind::Rate => &self.sample_rate_message,
        }
    }

    /// Labels of the samples analysis still needs
    pub fn missing_samples(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.combined_mode {
            if self.sample_availability_message.trim().is_empty() {
                missing.push("combined sample message");
            }
        } else {
            if self.sample_availability_message.trim().is_empty() {
                missing.push("availability sample message");
            }
            if self.sample_rate_message.trim().is_empty() {
                missing.push("rate sample message");
            }
        }
        missing
    }

    pub fn specs_text(&self) -> Option<String> {
        self.specs_document.as_ref().map(SpecsDocument::as_text)
    }

    pub fn analyze_request(&self) -> AnalyzeRequest {
        let (availability_message, rate_message, combined_message) = if self.combined_mode {
            (None, None, Some(self.sample_availability_message.clone()))
        } else {
            (
                Some(self.sample_availability_message.clone()),
                Some(self.sample_rate_message.clone()),
                None,
            )
        };

        AnalyzeRequest {
            pms_code: self.pms_code().to_string(),
            message_format: self.message_format,
            availability_message,
            rate_message,
            combined_message,
            specs_document_content: self.specs_text(),
        }
    }

    pub fn generate_request(&self) -> GenerateRequest {
        GenerateRequest {
            pms_code: self.pms_code().to_string(),
            pms_name: self.pms_name.clone(),
            availability_mappings: self.availability_mappings.clone(),
            rate_mappings: self.effective_rate_mappings(),
            custom_conversions: self.custom_conversions.clone(),
            message_format: self.message_format,
        }
    }

    pub fn registration(&self) -> PmsRegistration {
        PmsRegistration {
            code: self.pms_code().to_string(),
            name: self.pms_name.clone(),
            description: self.description.clone(),
            combined_avail_rate: self.combined_mode,
        }
    }

    /// Store fresh generator output; the uploads must run again for it
    pub fn store_generated(&mut self, generated: GenerateResponse) {
        self.generated_translator_code = generated.translator_code;
        self.generated_mapping_document = generated.mapping_yaml;
        self.commit_saga.reset_uploads();
    }
}
