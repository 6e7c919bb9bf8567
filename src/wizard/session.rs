//! The wizard session: one configuration, one step controller and the
//! per-action status the operator sees.
//!
//! Every network action has a `begin_*` half that validates and marks the
//! action in flight, and a `complete_*` half that applies the response. The
//! async convenience methods run both around a single backend call. Keeping
//! the halves separate lets a driver complete requests out of order.

use super::canonical;
use super::commit::{CommitCoordinator, CommitError, CommitReport, ReplayPolicy};
use super::editor::{MappingEditor, MergeOutcome, MergePolicy};
use super::sequence::{RequestSequencer, RequestTag};
use super::state::WizardConfiguration;
use super::step::{Step, StepAction, StepController, StepRejection, Transition};
use super::suggest::{Suggestion, SuggestionClient};
use crate::api::{AnalyzeRequest, AnalyzeResponse, ApiError, BridgeBackend, PmsRecord, SuggestRequest};
use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Analyze,
    Suggest,
    Generate,
    Commit,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Analyze,
        ActionKind::Suggest,
        ActionKind::Generate,
        ActionKind::Commit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Analyze => "analysis",
            ActionKind::Suggest => "suggestion",
            ActionKind::Generate => "code generation",
            ActionKind::Commit => "registration",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inline state of one action: a busy flag plus at most one error and one
/// success message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionStatus {
    pub in_flight: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl ActionStatus {
    fn start(&mut self) {
        self.in_flight = true;
        self.error = None;
        self.success = None;
    }

    fn succeed(&mut self, message: impl Into<String>) {
        self.in_flight = false;
        self.success = Some(message.into());
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.in_flight = false;
        self.error = Some(message.into());
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0} is already in progress")]
    Busy(ActionKind),

    #[error("{action} needs {}", .missing.join(", "))]
    NotReady {
        action: ActionKind,
        missing: Vec<&'static str>,
    },

    #[error("{action} failed: {source}")]
    Api {
        action: ActionKind,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Step(#[from] StepRejection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    Applied,
    /// Manual edits would be overwritten; held until `confirm_analysis`
    NeedsConfirmation,
    /// A newer request was issued (or the wizard was reset) meanwhile
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Moved(Step),
    Committed {
        report: CommitReport,
        /// Registry listing after the commit; `None` if it could not be fetched
        registry: Option<Vec<PmsRecord>>,
    },
}

#[derive(Default)]
struct Statuses {
    analyze: ActionStatus,
    suggest: ActionStatus,
    generate: ActionStatus,
    commit: ActionStatus,
}

impl Statuses {
    fn get(&self, kind: ActionKind) -> &ActionStatus {
        match kind {
            ActionKind::Analyze => &self.analyze,
            ActionKind::Suggest => &self.suggest,
            ActionKind::Generate => &self.generate,
            ActionKind::Commit => &self.commit,
        }
    }
}

pub struct WizardSession {
    config: WizardConfiguration,
    steps: StepController,
    backend: Arc<dyn BridgeBackend>,
    suggestions: SuggestionClient,
    committer: CommitCoordinator,
    statuses: Statuses,
    analyze_sequence: RequestSequencer,
    suggest_sequence: RequestSequencer,
    pending_analysis: Option<AnalyzeResponse>,
}

impl WizardSession {
    pub fn new(backend: Arc<dyn BridgeBackend>, policy: ReplayPolicy) -> Self {
        Self {
            config: WizardConfiguration::new(),
            steps: StepController::new(),
            suggestions: SuggestionClient::new(backend.clone()),
            committer: CommitCoordinator::new(backend.clone(), policy),
            backend,
            statuses: Statuses::default(),
            analyze_sequence: RequestSequencer::new(),
            suggest_sequence: RequestSequencer::new(),
            pending_analysis: None,
        }
    }

    pub fn config(&self) -> &WizardConfiguration {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WizardConfiguration {
        &mut self.config
    }

    pub fn editor(&mut self) -> MappingEditor<'_> {
        self.config.editor()
    }

    pub fn current_step(&self) -> Step {
        self.steps.current()
    }

    pub fn status(&self, kind: ActionKind) -> &ActionStatus {
        self.statuses.get(kind)
    }

    /// Analysis result waiting for the operator to confirm overwriting edits
    pub fn pending_analysis(&self) -> Option<&AnalyzeResponse> {
        self.pending_analysis.as_ref()
    }

    /// Whether "Next" would be accepted right now
    pub fn can_advance(&self) -> bool {
        self.steps.current().transition(StepAction::Advance, &self.config).is_ok()
    }

    fn ensure_idle(&self, kind: ActionKind) -> Result<(), ActionError> {
        if self.statuses.get(kind).in_flight {
            debug!("Refusing {}: already in flight", kind);
            return Err(ActionError::Busy(kind));
        }
        Ok(())
    }

    pub fn begin_analyze(&mut self) -> Result<(RequestTag, AnalyzeRequest), ActionError> {
        self.ensure_idle(ActionKind::Analyze)?;

        let missing = self.config.missing_samples();
        if !missing.is_empty() {
            return Err(ActionError::NotReady {
                action: ActionKind::Analyze,
                missing,
            });
        }

        self.statuses.analyze.start();
        self.pending_analysis = None;
        let tag = self.analyze_sequence.issue();
        debug!("Analysis #{} started", tag.value());
        Ok((tag, self.config.analyze_request()))
    }

    pub fn complete_analyze(
        &mut self,
        tag: RequestTag,
        result: Result<AnalyzeResponse, ApiError>,
    ) -> Result<AnalyzeOutcome, ActionError> {
        let is_latest = self.analyze_sequence.is_latest(tag);
        if !self.analyze_sequence.accept(tag) {
            if is_latest {
                self.statuses.analyze.in_flight = false;
            }
            return Ok(AnalyzeOutcome::Discarded);
        }

        let response = match result {
            Ok(response) => response,
            Err(source) => {
                self.statuses.analyze.fail(source.to_string());
                return Err(ActionError::Api {
                    action: ActionKind::Analyze,
                    source,
                });
            }
        };

        Ok(self.merge_analysis(response, MergePolicy::IfUnedited))
    }

    fn merge_analysis(&mut self, response: AnalyzeResponse, policy: MergePolicy) -> AnalyzeOutcome {
        let outcome = self.config.editor().merge_analysis_result(
            response.availability_mappings.clone(),
            response.rate_mappings.clone(),
            response.unmapped_fields.clone(),
            policy,
        );

        match outcome {
            MergeOutcome::Applied => {
                info!(
                    "Analysis applied: {} availability, {} rate, {} unmapped",
                    self.config.availability_mappings().len(),
                    self.config.rate_mappings().len(),
                    self.config.unmapped_fields().len()
                );
                self.statuses.analyze.succeed("Message format analyzed successfully!");
                AnalyzeOutcome::Applied
            }
            MergeOutcome::NeedsConfirmation => {
                self.statuses.analyze.in_flight = false;
                self.pending_analysis = Some(response);
                AnalyzeOutcome::NeedsConfirmation
            }
        }
    }

    /// Apply the held analysis result over manual edits. False if none is held.
    pub fn confirm_analysis(&mut self) -> bool {
        match self.pending_analysis.take() {
            Some(response) => {
                self.merge_analysis(response, MergePolicy::Confirmed);
                true
            }
            None => false,
        }
    }

    /// Drop a held analysis result, keeping the manual edits
    pub fn discard_pending_analysis(&mut self) {
        self.pending_analysis = None;
    }

    pub async fn analyze(&mut self) -> Result<AnalyzeOutcome, ActionError> {
        let (tag, request) = self.begin_analyze()?;
        let result = self.backend.analyze(&request).await;
        self.complete_analyze(tag, result)
    }

    /// Start a suggestion for `source_field` against the relevant dictionary
    pub fn begin_suggest(&mut self, source_field: &str) -> Result<(RequestTag, SuggestRequest), ActionError> {
        self.ensure_idle(ActionKind::Suggest)?;

        let kind = self.config.relevant_kind();
        let candidates = canonical::candidates(kind, self.config.combined_mode);
        let specs = self.config.specs_text();
        let request = SuggestionClient::request_for(
            source_field,
            self.config.sample_for(kind),
            &candidates,
            kind,
            specs.as_deref(),
        );

        self.statuses.suggest.start();
        let tag = self.suggest_sequence.issue();
        Ok((tag, request))
    }

    /// Apply a suggestion; `None` when the response is stale
    pub fn complete_suggest(&mut self, tag: RequestTag, field: &str, suggestion: Suggestion) -> Option<Suggestion> {
        let is_latest = self.suggest_sequence.is_latest(tag);
        if !self.suggest_sequence.accept(tag) {
            if is_latest {
                self.statuses.suggest.in_flight = false;
            }
            return None;
        }

        match &suggestion.suggestion {
            Some(value) => self.statuses.suggest.succeed(format!("Suggested {} for {}", value, field)),
            None => self.statuses.suggest.succeed(format!("No suggestion available for {}", field)),
        }
        Some(suggestion)
    }

    pub async fn suggest(&mut self, source_field: &str) -> Result<Option<Suggestion>, ActionError> {
        let (tag, request) = self.begin_suggest(source_field)?;
        let suggestion = self.suggestions.suggest_request(&request).await;
        Ok(self.complete_suggest(tag, source_field, suggestion))
    }

    /// Render the translator and mapping document for the current mappings
    pub async fn generate(&mut self) -> Result<(), ActionError> {
        self.ensure_idle(ActionKind::Generate)?;

        let missing = self.config.missing_identity_fields();
        if !missing.is_empty() {
            return Err(ActionError::NotReady {
                action: ActionKind::Generate,
                missing,
            });
        }

        self.statuses.generate.start();
        let request = self.config.generate_request();
        match self.backend.generate(&request).await {
            Ok(generated) => {
                self.config.store_generated(generated);
                info!("Generated artifacts for {}", self.config.pms_code());
                self.statuses.generate.succeed("Code generated successfully!");
                Ok(())
            }
            Err(source) => {
                self.statuses.generate.fail(source.to_string());
                Err(ActionError::Api {
                    action: ActionKind::Generate,
                    source,
                })
            }
        }
    }

    /// "Next". On the last step this runs the commit and then re-lists the
    /// registry; the step never changes there.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, ActionError> {
        if self.steps.current().is_last() {
            self.ensure_idle(ActionKind::Commit)?;
        }

        match self.steps.advance(&self.config)? {
            Transition::MoveTo(step) => Ok(AdvanceOutcome::Moved(step)),
            Transition::Stay | Transition::Reset => Ok(AdvanceOutcome::Moved(self.steps.current())),
            Transition::Commit => self.commit().await,
        }
    }

    async fn commit(&mut self) -> Result<AdvanceOutcome, ActionError> {
        self.statuses.commit.start();

        let report = match self.committer.commit(&mut self.config).await {
            Ok(report) => report,
            Err(e) => {
                self.statuses.commit.fail(e.to_string());
                return Err(e.into());
            }
        };
        self.statuses.commit.succeed("PMS integration completed successfully!");

        let registry = match self.backend.list_pms().await {
            Ok(records) => {
                debug!("Registry now lists {} PMS", records.len());
                Some(records)
            }
            Err(e) => {
                warn!("Could not refresh PMS list after commit: {}", e);
                None
            }
        };

        Ok(AdvanceOutcome::Committed { report, registry })
    }

    pub fn retreat(&mut self) -> Transition {
        self.steps.retreat(&self.config)
    }

    /// Back to step 0 with an empty configuration. Outstanding analysis and
    /// suggestion responses become stale.
    pub fn reset(&mut self) {
        self.steps.reset(&mut self.config);
        self.analyze_sequence.invalidate();
        self.suggest_sequence.invalidate();
        self.statuses = Statuses::default();
        self.pending_analysis = None;
    }
}
