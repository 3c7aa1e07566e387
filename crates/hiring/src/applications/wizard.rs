//! The four-step application wizard as an explicit state machine.
//!
//! `Editing(step)` moves forward only through [`WizardState::next`], which validates the
//! current step. Passing the last step yields the frozen [`NewApplication`] and parks the
//! wizard in `Submitting` until the caller reports the store's answer.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{ApplicationDraft, ApplicationField, ApplicationId, CandidateApplication, NewApplication};
use super::validation::{validate_step, FieldErrors};

/// One page of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Identity,
    Diagnostic,
    Campaign,
    Challenge,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Identity,
        WizardStep::Diagnostic,
        WizardStep::Campaign,
        WizardStep::Challenge,
    ];

    pub const fn index(self) -> usize {
        match self {
            WizardStep::Identity => 0,
            WizardStep::Diagnostic => 1,
            WizardStep::Campaign => 2,
            WizardStep::Challenge => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::Identity => "Información personal",
            WizardStep::Diagnostic => "Diagnóstico rápido",
            WizardStep::Campaign => "Concepto de campaña",
            WizardStep::Challenge => "Reto final",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

/// Where the wizard currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    Editing(WizardStep),
    Submitting,
    Success { application_id: ApplicationId },
}

/// Result of a `next` request that was accepted by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// Validation failed; the error map now holds exactly this step's failures.
    Rejected(FieldErrors),
    Advanced(WizardStep),
    /// The last step passed; the caller must persist this and report back.
    ReadyToSubmit(NewApplication),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("the application is being submitted")]
    Submitting,
    #[error("the application was already submitted")]
    Completed,
    #[error("no submission is in flight")]
    NotSubmitting,
}

const SUBMISSION_ALERT: &str =
    "Hubo un error al enviar tu aplicación. Por favor intenta de nuevo.";

/// Transient wizard state for one candidate.
#[derive(Debug, Clone)]
pub struct WizardState {
    phase: WizardPhase,
    /// Step to return to when a submission fails.
    last_step: WizardStep,
    draft: ApplicationDraft,
    errors: FieldErrors,
    alert: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            phase: WizardPhase::Editing(WizardStep::Identity),
            last_step: WizardStep::Identity,
            draft: ApplicationDraft::default(),
            errors: FieldErrors::new(),
            alert: None,
        }
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// The step on screen. While submitting or after success this is the last step shown.
    pub fn step(&self) -> WizardStep {
        match self.phase {
            WizardPhase::Editing(step) => step,
            _ => self.last_step,
        }
    }

    fn ensure_editing(&self) -> Result<WizardStep, WizardError> {
        match self.phase {
            WizardPhase::Editing(step) => Ok(step),
            WizardPhase::Submitting => Err(WizardError::Submitting),
            WizardPhase::Success { .. } => Err(WizardError::Completed),
        }
    }

    /// Store a field value and drop that field's stale error, leaving other errors intact.
    pub fn edit(&mut self, field: ApplicationField, value: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editing()?;
        self.draft.set(field, value.into());
        self.errors.remove(&field);
        Ok(())
    }

    pub fn next(&mut self) -> Result<NextOutcome, WizardError> {
        let step = self.ensure_editing()?;

        let errors = validate_step(step, &self.draft);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Ok(NextOutcome::Rejected(errors));
        }

        self.errors.clear();
        self.alert = None;
        match step.next() {
            Some(next) => {
                self.phase = WizardPhase::Editing(next);
                Ok(NextOutcome::Advanced(next))
            }
            None => {
                self.last_step = step;
                self.phase = WizardPhase::Submitting;
                Ok(NextOutcome::ReadyToSubmit(self.draft.to_new_application()))
            }
        }
    }

    /// Go back one step without validating. A no-op on the first step.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.ensure_editing()?;
        let target = step.previous().unwrap_or(step);
        self.phase = WizardPhase::Editing(target);
        Ok(target)
    }

    pub fn submission_succeeded(&mut self, record: &CandidateApplication) -> Result<(), WizardError> {
        if self.phase != WizardPhase::Submitting {
            return Err(WizardError::NotSubmitting);
        }
        self.phase = WizardPhase::Success {
            application_id: record.id.clone(),
        };
        self.alert = None;
        Ok(())
    }

    /// Return to the last step with an alert so the candidate can retry.
    pub fn submission_failed(&mut self) -> Result<(), WizardError> {
        if self.phase != WizardPhase::Submitting {
            return Err(WizardError::NotSubmitting);
        }
        self.phase = WizardPhase::Editing(self.last_step);
        self.alert = Some(SUBMISSION_ALERT.to_string());
        Ok(())
    }

    pub fn view(&self) -> WizardView {
        WizardView::from_state(self)
    }
}

/// Remaining character budget for a capped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharCount {
    pub used: usize,
    pub limit: usize,
}

/// Everything a client needs to render the wizard, derived on demand from the state.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub step_index: usize,
    pub total_steps: usize,
    pub step_title: &'static str,
    pub progress_percent: u8,
    pub is_last_step: bool,
    pub can_go_back: bool,
    pub submitting: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    pub values: ApplicationDraft,
    pub errors: FieldErrors,
    pub char_counts: BTreeMap<ApplicationField, CharCount>,
}

impl WizardView {
    pub fn from_state(state: &WizardState) -> Self {
        let step = state.step();
        let total_steps = WizardStep::ALL.len();
        let (submitting, success, application_id) = match &state.phase {
            WizardPhase::Editing(_) => (false, false, None),
            WizardPhase::Submitting => (true, false, None),
            WizardPhase::Success { application_id } => (false, true, Some(application_id.clone())),
        };

        let char_counts = ApplicationField::ALL
            .into_iter()
            .filter_map(|field| {
                field.char_limit().map(|limit| {
                    let used = state.draft.get(field).chars().count();
                    (field, CharCount { used, limit })
                })
            })
            .collect();

        let progress_percent = if success {
            100
        } else {
            ((step.index() + 1) * 100 / total_steps) as u8
        };

        Self {
            step,
            step_index: step.index(),
            total_steps,
            step_title: step.title(),
            progress_percent,
            is_last_step: step.is_last(),
            can_go_back: !submitting && !success && step.previous().is_some(),
            submitting,
            success,
            application_id,
            alert: state.alert.clone(),
            values: state.draft.clone(),
            errors: state.errors.clone(),
            char_counts,
        }
    }
}
