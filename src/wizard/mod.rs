//! PMS onboarding wizard
//!
//! `WizardConfiguration` holds everything entered so far, `MappingEditor`
//! mutates its mappings, `StepController` drives the four steps and
//! `CommitCoordinator` persists the result. `WizardSession` ties them to a
//! `BridgeBackend` and tracks per-action status.

pub mod canonical;
pub mod commit;
pub mod editor;
pub mod export;
pub mod sequence;
pub mod session;
pub mod state;
pub mod step;
pub mod suggest;

pub use commit::{CommitCoordinator, CommitError, CommitPhase, CommitReport, CommitSaga, PhaseStatus, ReplayPolicy};
pub use editor::{EditError, MappingEditor, MergeOutcome, MergePolicy};
pub use export::export_artifacts;
pub use sequence::{RequestSequencer, RequestTag};
pub use session::{ActionError, ActionKind, ActionStatus, AdvanceOutcome, AnalyzeOutcome, WizardSession};
pub use state::{SpecsDocument, WizardConfiguration};
pub use step::{Step, StepAction, StepController, StepRejection, Transition};
pub use suggest::{Suggestion, SuggestionClient, SuggestionMethod};
