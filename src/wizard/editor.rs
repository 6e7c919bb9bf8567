//! Mutations of the mapping dictionaries and the unmapped-field set

use super::state::WizardConfiguration;
use crate::api::{FieldMap, MappingKind};
use log::debug;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("source field must not be blank")]
    BlankSourceField,
    #[error("canonical field for '{0}' must not be blank")]
    BlankCanonicalField(String),
}

/// Whether an analysis merge may overwrite edits made by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Refuse to overwrite manual edits
    #[default]
    IfUnedited,
    /// The operator confirmed that manual edits may be discarded
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    /// Manual edits exist; nothing was changed
    NeedsConfirmation,
}

pub struct MappingEditor<'a> {
    config: &'a mut WizardConfiguration,
}

impl<'a> MappingEditor<'a> {
    pub fn new(config: &'a mut WizardConfiguration) -> Self {
        Self { config }
    }

    fn map_mut(&mut self, kind: MappingKind) -> &mut FieldMap {
        match kind {
            MappingKind::Availability => &mut self.config.availability_mappings,
            MappingKind::Rate => &mut self.config.rate_mappings,
        }
    }

    /// Insert or overwrite one mapping. Several source fields may share a
    /// canonical field.
    pub fn set_mapping(&mut self, kind: MappingKind, source_field: &str, canonical_field: &str) {
        self.map_mut(kind)
            .insert(source_field.to_string(), canonical_field.to_string());

        if self.config.active_kinds().contains(&kind) {
            self.config.unmapped_fields.remove(source_field);
        }
        self.config.manual_edits = true;
    }

    /// Map `source_field` in the currently relevant dictionary and take it
    /// off the unmapped list
    pub fn add_mapping(&mut self, source_field: &str, canonical_field: &str) -> Result<MappingKind, EditError> {
        let source_field = source_field.trim();
        let canonical_field = canonical_field.trim();

        if source_field.is_empty() {
            return Err(EditError::BlankSourceField);
        }
        if canonical_field.is_empty() {
            return Err(EditError::BlankCanonicalField(source_field.to_string()));
        }

        let kind = self.config.relevant_kind();
        self.set_mapping(kind, source_field, canonical_field);
        debug!("Mapped {} -> {} ({})", source_field, canonical_field, kind);
        Ok(kind)
    }

    /// Drop a mapping; returns the canonical field it pointed to
    pub fn remove_mapping(&mut self, kind: MappingKind, source_field: &str) -> Option<String> {
        let removed = self.map_mut(kind).remove(source_field);
        if removed.is_some() {
            self.config.manual_edits = true;
        }
        removed
    }

    /// Store a conversion expression verbatim
    pub fn set_conversion(&mut self, source_field: &str, expression: &str) {
        self.config
            .custom_conversions
            .insert(source_field.to_string(), expression.to_string());
    }

    pub fn remove_conversion(&mut self, source_field: &str) -> Option<String> {
        self.config.custom_conversions.remove(source_field)
    }

    /// Replace both dictionaries and the unmapped set with an analysis result.
    ///
    /// Unmapped names already present in a counted dictionary are dropped so
    /// the set never overlaps the mappings.
    pub fn merge_analysis_result(
        &mut self,
        availability: FieldMap,
        rate: FieldMap,
        unmapped: Vec<String>,
        policy: MergePolicy,
    ) -> MergeOutcome {
        if self.config.manual_edits && policy != MergePolicy::Confirmed {
            debug!("Analysis merge deferred: manual edits present");
            return MergeOutcome::NeedsConfirmation;
        }

        self.config.availability_mappings = availability;
        self.config.rate_mappings = rate;

        let unmapped = unmapped
            .into_iter()
            .filter(|field| !self.config.is_mapped(field))
            .collect();
        self.config.unmapped_fields = unmapped;
        self.config.manual_edits = false;

        debug!(
            "Merged analysis: {} availability, {} rate, {} unmapped",
            self.config.availability_mappings.len(),
            self.config.rate_mappings.len(),
            self.config.unmapped_fields.len()
        );
        MergeOutcome::Applied
    }
}

impl WizardConfiguration {
    pub fn editor(&mut self) -> MappingEditor<'_> {
        MappingEditor::new(self)
    }
}
