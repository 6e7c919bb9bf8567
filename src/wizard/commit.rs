//! Three-phase registration and upload of a finished configuration

use super::state::WizardConfiguration;
use crate::api::{ApiError, BridgeBackend, PmsRegistration};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitPhase {
    Registration,     // Step 1
    MappingUpload,    // Step 2
    TranslatorUpload, // Step 3
}

impl CommitPhase {
    pub const ALL: [CommitPhase; 3] = [
        CommitPhase::Registration,
        CommitPhase::MappingUpload,
        CommitPhase::TranslatorUpload,
    ];

    pub fn step_number(&self) -> usize {
        match self {
            CommitPhase::Registration => 1,
            CommitPhase::MappingUpload => 2,
            CommitPhase::TranslatorUpload => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommitPhase::Registration => "PMS registration",
            CommitPhase::MappingUpload => "mapping upload",
            CommitPhase::TranslatorUpload => "translator upload",
        }
    }
}

impl fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseStatus {
    #[default]
    Pending,
    Done,
    Failed(String),
}

/// Per-phase progress of the commit, kept across attempts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitSaga {
    registration: PhaseStatus,
    mapping_upload: PhaseStatus,
    translator_upload: PhaseStatus,
    /// Registration body the registry accepted, if phase 1 succeeded
    registered: Option<PmsRegistration>,
}

impl CommitSaga {
    pub fn status(&self, phase: CommitPhase) -> &PhaseStatus {
        match phase {
            CommitPhase::Registration => &self.registration,
            CommitPhase::MappingUpload => &self.mapping_upload,
            CommitPhase::TranslatorUpload => &self.translator_upload,
        }
    }

    pub(crate) fn mark(&mut self, phase: CommitPhase, status: PhaseStatus) {
        let slot = match phase {
            CommitPhase::Registration => &mut self.registration,
            CommitPhase::MappingUpload => &mut self.mapping_upload,
            CommitPhase::TranslatorUpload => &mut self.translator_upload,
        };
        *slot = status;
    }

    pub fn registered(&self) -> Option<&PmsRegistration> {
        self.registered.as_ref()
    }

    pub(crate) fn record_registration(&mut self, registration: PmsRegistration) {
        self.registration = PhaseStatus::Done;
        self.registered = Some(registration);
    }

    /// Registry entry no longer matches what would be sent now
    fn is_stale(&self, registration: &PmsRegistration) -> bool {
        self.registered.as_ref().is_some_and(|previous| previous != registration)
    }

    pub fn is_complete(&self) -> bool {
        CommitPhase::ALL
            .iter()
            .all(|phase| *self.status(*phase) == PhaseStatus::Done)
    }

    /// First phase that failed on the last attempt
    pub fn failed_phase(&self) -> Option<CommitPhase> {
        CommitPhase::ALL
            .into_iter()
            .find(|phase| matches!(self.status(*phase), PhaseStatus::Failed(_)))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn reset_uploads(&mut self) {
        self.mapping_upload = PhaseStatus::Pending;
        self.translator_upload = PhaseStatus::Pending;
    }
}

/// What a repeated commit does with phases that already succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReplayPolicy {
    /// Skip phases recorded as done
    #[default]
    #[serde(rename = "resume")]
    ResumeFromFailure,
    /// Run all three phases again from registration
    #[serde(rename = "replay_all")]
    ReplayAll,
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("cannot commit: missing {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    #[error("{phase} failed: {source}")]
    PhaseFailed {
        phase: CommitPhase,
        #[source]
        source: ApiError,
    },
}

impl CommitError {
    pub fn phase(&self) -> Option<CommitPhase> {
        match self {
            CommitError::PhaseFailed { phase, .. } => Some(*phase),
            CommitError::Incomplete { .. } => None,
        }
    }
}

/// Phases run and phases skipped by one successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub executed: Vec<CommitPhase>,
    pub skipped: Vec<CommitPhase>,
}

/// Runs registration, mapping upload and translator upload in order.
///
/// Not transactional: a failing phase aborts the commit and nothing already
/// persisted is rolled back.
#[derive(Clone)]
pub struct CommitCoordinator {
    backend: Arc<dyn BridgeBackend>,
    policy: ReplayPolicy,
}

impl CommitCoordinator {
    pub fn new(backend: Arc<dyn BridgeBackend>, policy: ReplayPolicy) -> Self {
        Self { backend, policy }
    }

    fn check_ready(config: &WizardConfiguration) -> Result<(), CommitError> {
        let mut missing = config.missing_identity_fields();
        if config.generated_mapping_document().is_empty() {
            missing.push("mapping document");
        }
        if config.generated_translator_code().is_empty() {
            missing.push("translator code");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommitError::Incomplete { missing })
        }
    }

    pub async fn commit(&self, config: &mut WizardConfiguration) -> Result<CommitReport, CommitError> {
        Self::check_ready(config)?;

        let registration = config.registration();
        let code = registration.code.clone();

        if self.policy == ReplayPolicy::ReplayAll {
            config.commit_saga.reset();
        } else if config.commit_saga.is_stale(&registration) {
            info!("Registration details for {} changed, running every phase again", code);
            config.commit_saga.reset();
        }

        let mut report = CommitReport::default();

        for phase in CommitPhase::ALL {
            if *config.commit_saga.status(phase) == PhaseStatus::Done {
                info!("Skipping {} for {} (already done)", phase, code);
                report.skipped.push(phase);
                continue;
            }

            info!("Step {}/3: {} for {}", phase.step_number(), phase, code);
            let result = match phase {
                CommitPhase::Registration => self.backend.register_pms(&registration).await,
                CommitPhase::MappingUpload => {
                    self.backend
                        .upload_mapping(&code, config.generated_mapping_document())
                        .await
                }
                CommitPhase::TranslatorUpload => {
                    self.backend
                        .upload_translator(&code, config.generated_translator_code())
                        .await
                }
            };

            match result {
                Ok(()) => {
                    info!("Completed {} for {}", phase, code);
                    match phase {
                        CommitPhase::Registration => config.commit_saga.record_registration(registration.clone()),
                        _ => config.commit_saga.mark(phase, PhaseStatus::Done),
                    }
                    report.executed.push(phase);
                }
                Err(source) => {
                    error!("{} failed for {}: {}", phase, code, source);
                    config
                        .commit_saga
                        .mark(phase, PhaseStatus::Failed(source.to_string()));
                    return Err(CommitError::PhaseFailed { phase, source });
                }
            }
        }

        info!("Commit for {} complete", code);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        let names: Vec<_> = CommitPhase::ALL.iter().map(CommitPhase::name).collect();
        assert_eq!(names, vec!["PMS registration", "mapping upload", "translator upload"]);
    }

    #[test]
    fn test_saga_tracks_failure_and_completion() {
        let mut saga = CommitSaga::default();
        saga.mark(CommitPhase::Registration, PhaseStatus::Done);
        saga.mark(CommitPhase::MappingUpload, PhaseStatus::Failed("503".to_string()));

        assert_eq!(saga.failed_phase(), Some(CommitPhase::MappingUpload));
        assert!(!saga.is_complete());

        saga.mark(CommitPhase::MappingUpload, PhaseStatus::Done);
        saga.mark(CommitPhase::TranslatorUpload, PhaseStatus::Done);
        assert!(saga.is_complete());
        assert_eq!(saga.failed_phase(), None);
    }

    #[test]
    fn test_saga_goes_stale_when_registration_changes() {
        let registration = PmsRegistration {
            code: "cb".to_string(),
            name: "Cloudbeds".to_string(),
            description: String::new(),
            combined_avail_rate: false,
        };
        let mut saga = CommitSaga::default();
        assert!(!saga.is_stale(&registration));

        saga.record_registration(registration.clone());
        assert_eq!(saga.status(CommitPhase::Registration), &PhaseStatus::Done);
        assert!(!saga.is_stale(&registration));

        let combined = PmsRegistration {
            combined_avail_rate: true,
            ..registration
        };
        assert!(saga.is_stale(&combined));

        saga.reset();
        assert!(saga.registered().is_none());
    }

    #[test]
    fn test_replay_policy_wire_names() -> anyhow::Result<()> {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ReplayPolicy,
        }

        let parsed: Wrapper = toml::from_str("policy = \"replay_all\"")?;
        assert_eq!(parsed.policy, ReplayPolicy::ReplayAll);
        assert_eq!(ReplayPolicy::default(), ReplayPolicy::ResumeFromFailure);
        Ok(())
    }

    #[test]
    fn test_incomplete_configuration_rejected() {
        let config = WizardConfiguration {
            pms_code: "cb".to_string(),
            ..WizardConfiguration::default()
        };

        let err = CommitCoordinator::check_ready(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot commit: missing PMS name, mapping document, translator code"
        );
        assert_eq!(err.phase(), None);
    }
}
