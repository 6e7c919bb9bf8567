//! The four-step navigation machine

use super::state::WizardConfiguration;
use log::{debug, info};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    PmsInformation,
    MessageAnalysis,
    MappingConfiguration,
    CodeGeneration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Advance,
    Retreat,
    Reset,
}

/// Result of applying a `StepAction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MoveTo(Step),
    /// Boundary no-op
    Stay,
    /// Terminal advance: run the commit, stay on the last step
    Commit,
    /// Back to the first step with a fresh configuration
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepRejection {
    #[error("{step} is incomplete: missing {}", .missing.join(", "))]
    MissingFields { step: Step, missing: Vec<&'static str> },

    #[error("generate the translator and mapping document before finishing")]
    ArtifactsNotGenerated,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::PmsInformation,
        Step::MessageAnalysis,
        Step::MappingConfiguration,
        Step::CodeGeneration,
    ];

    pub fn index(&self) -> usize {
        match self {
            Step::PmsInformation => 0,
            Step::MessageAnalysis => 1,
            Step::MappingConfiguration => 2,
            Step::CodeGeneration => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::PmsInformation => "PMS Information",
            Step::MessageAnalysis => "Message Format Analysis",
            Step::MappingConfiguration => "Mapping Configuration",
            Step::CodeGeneration => "Code Generation & Registration",
        }
    }

    pub fn next(&self) -> Option<Step> {
        Step::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Step::ALL[i])
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Transition table. Only the current step's guard is evaluated; earlier
    /// steps are not re-validated.
    pub fn transition(&self, action: StepAction, config: &WizardConfiguration) -> Result<Transition, StepRejection> {
        match (self, action) {
            (_, StepAction::Reset) => Ok(Transition::Reset),
            (step, StepAction::Retreat) => Ok(step.previous().map_or(Transition::Stay, Transition::MoveTo)),
            (Step::PmsInformation, StepAction::Advance) => {
                let missing = config.missing_identity_fields();
                if missing.is_empty() {
                    Ok(Transition::MoveTo(Step::MessageAnalysis))
                } else {
                    Err(StepRejection::MissingFields {
                        step: Step::PmsInformation,
                        missing,
                    })
                }
            }
            (Step::CodeGeneration, StepAction::Advance) => {
                if config.has_generated_artifacts() {
                    Ok(Transition::Commit)
                } else {
                    Err(StepRejection::ArtifactsNotGenerated)
                }
            }
            (step, StepAction::Advance) => Ok(step.next().map_or(Transition::Stay, Transition::MoveTo)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.index() + 1, self.title())
    }
}

/// Current step plus the table-driven operations on it
#[derive(Debug, Clone, Default)]
pub struct StepController {
    current: Step,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Move forward. On the last step this returns `Transition::Commit` and
    /// leaves the step unchanged; running the commit is up to the caller.
    pub fn advance(&mut self, config: &WizardConfiguration) -> Result<Transition, StepRejection> {
        let transition = self.current.transition(StepAction::Advance, config)?;
        self.apply(transition);
        Ok(transition)
    }

    pub fn retreat(&mut self, config: &WizardConfiguration) -> Transition {
        // Retreat has no guards.
        let transition = self
            .current
            .transition(StepAction::Retreat, config)
            .unwrap_or(Transition::Stay);
        self.apply(transition);
        transition
    }

    /// Return to the first step and replace the configuration with an empty one
    pub fn reset(&mut self, config: &mut WizardConfiguration) -> Transition {
        let transition = self
            .current
            .transition(StepAction::Reset, config)
            .unwrap_or(Transition::Reset);
        if transition == Transition::Reset {
            *config = WizardConfiguration::new();
            info!("Wizard reset");
        }
        self.apply(transition);
        transition
    }

    fn apply(&mut self, transition: Transition) {
        let target = match transition {
            Transition::MoveTo(step) => step,
            Transition::Reset => Step::PmsInformation,
            Transition::Stay | Transition::Commit => return,
        };
        debug!("{} -> {}", self.current, target);
        self.current = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GenerateResponse;

    fn identified() -> WizardConfiguration {
        WizardConfiguration {
            pms_code: "cb".to_string(),
            pms_name: "Cloudbeds".to_string(),
            ..WizardConfiguration::default()
        }
    }

    #[test]
    fn test_step_zero_blocked_until_identity_present() {
        let mut controller = StepController::new();
        let mut config = WizardConfiguration::new();
        config.pms_code = "cb".to_string();

        let rejection = controller.advance(&config).unwrap_err();
        assert_eq!(
            rejection,
            StepRejection::MissingFields {
                step: Step::PmsInformation,
                missing: vec!["PMS name"],
            }
        );
        assert_eq!(controller.current(), Step::PmsInformation);

        config.pms_name = "Cloudbeds".to_string();
        assert_eq!(controller.advance(&config), Ok(Transition::MoveTo(Step::MessageAnalysis)));
    }

    #[test]
    fn test_middle_steps_advance_without_guards() {
        let mut controller = StepController::new();
        let mut config = identified();
        controller.advance(&config).unwrap();

        // Identity cleared after step 0 is not re-checked.
        config.pms_name.clear();
        assert_eq!(controller.advance(&config), Ok(Transition::MoveTo(Step::MappingConfiguration)));
        assert_eq!(controller.advance(&config), Ok(Transition::MoveTo(Step::CodeGeneration)));
    }

    #[test]
    fn test_last_step_requests_commit_and_stays() {
        let mut controller = StepController::new();
        let mut config = identified();
        for _ in 0..3 {
            controller.advance(&config).unwrap();
        }

        assert_eq!(controller.advance(&config), Err(StepRejection::ArtifactsNotGenerated));

        config.store_generated(GenerateResponse {
            translator_code: "code".to_string(),
            mapping_yaml: "yaml".to_string(),
        });
        assert_eq!(controller.advance(&config), Ok(Transition::Commit));
        assert_eq!(controller.current(), Step::CodeGeneration);
    }

    #[test]
    fn test_retreat_floors_at_zero() {
        let mut controller = StepController::new();
        let config = identified();

        assert_eq!(controller.retreat(&config), Transition::Stay);
        controller.advance(&config).unwrap();
        assert_eq!(controller.retreat(&config), Transition::MoveTo(Step::PmsInformation));
    }

    #[test]
    fn test_reset_replaces_configuration() {
        let mut controller = StepController::new();
        let mut config = identified();
        controller.advance(&config).unwrap();
        assert_eq!(
            controller.current().transition(StepAction::Reset, &config),
            Ok(Transition::Reset)
        );

        assert_eq!(controller.reset(&mut config), Transition::Reset);

        assert_eq!(controller.current(), Step::PmsInformation);
        assert_eq!(config, WizardConfiguration::new());
    }

    #[test]
    fn test_rejection_message_names_fields() {
        let rejection = Step::PmsInformation
            .transition(StepAction::Advance, &WizardConfiguration::new())
            .unwrap_err();

        assert_eq!(
            rejection.to_string(),
            "Step 1 (PMS Information) is incomplete: missing PMS code, PMS name"
        );
    }
}
