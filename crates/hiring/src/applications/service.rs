use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{ApplicationDraft, ApplicationField, CandidateApplication};
use super::repository::{ApplicationStore, RepositoryError, ResumeStorage, StorageError, StoredObject};
use super::resume::{ResumeRejection, ResumeUpload};
use super::validation::{validate_all, ValidationErrors};
use super::wizard::{NextOutcome, WizardError, WizardPhase, WizardState, WizardView};
use crate::config::WizardConfig;

/// Handle for one in-progress wizard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardId(pub String);

impl WizardId {
    fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        Self(format!("wiz_{token}"))
    }
}

impl fmt::Display for WizardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a `next` request did to the wizard.
#[derive(Debug, Clone)]
pub enum WizardTransition {
    Stayed,
    Advanced,
    Submitted(CandidateApplication),
    SubmissionFailed,
}

#[derive(Debug, Clone)]
pub struct WizardResponse {
    pub transition: WizardTransition,
    pub view: WizardView,
}

struct WizardSession {
    state: WizardState,
    last_touched: DateTime<Utc>,
}

/// Service composing the wizard sessions, the application store, and resume storage.
///
/// A wizard lives until it submits, is closed, or sits untouched for longer than the idle
/// window. Idle wizards are swept whenever a new one is opened.
pub struct ApplicationService<S, R> {
    store: Arc<S>,
    resumes: Arc<R>,
    wizards: Mutex<HashMap<WizardId, WizardSession>>,
    idle_ttl: Duration,
}

impl<S, R> ApplicationService<S, R>
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    pub fn new(store: Arc<S>, resumes: Arc<R>) -> Self {
        Self {
            store,
            resumes,
            wizards: Mutex::new(HashMap::new()),
            idle_ttl: WizardConfig::default().idle_ttl,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn wizards(&self) -> MutexGuard<'_, HashMap<WizardId, WizardSession>> {
        self.wizards.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_wizard<T>(
        &self,
        id: &WizardId,
        apply: impl FnOnce(&mut WizardState) -> Result<T, ApplicationServiceError>,
    ) -> Result<T, ApplicationServiceError> {
        let mut wizards = self.wizards();
        let session = wizards
            .get_mut(id)
            .ok_or_else(|| ApplicationServiceError::UnknownWizard(id.clone()))?;
        session.last_touched = Utc::now();
        apply(&mut session.state)
    }

    /// Drop wizards untouched since `now - idle_ttl`. A wizard mid-submission is kept.
    fn sweep(&self, wizards: &mut HashMap<WizardId, WizardSession>, now: DateTime<Utc>) -> usize {
        let before = wizards.len();
        wizards.retain(|_, session| {
            matches!(session.state.phase(), WizardPhase::Submitting)
                || now.signed_duration_since(session.last_touched) < self.idle_ttl
        });
        let evicted = before - wizards.len();
        if evicted > 0 {
            debug!(evicted, remaining = wizards.len(), "idle wizards discarded");
        }
        evicted
    }

    /// Discard idle wizards as of `now`, returning how many were dropped.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut wizards = self.wizards();
        self.sweep(&mut wizards, now)
    }

    /// Number of wizards currently held in memory.
    pub fn open_wizards(&self) -> usize {
        self.wizards().len()
    }

    /// Validate every step and persist in one call, bypassing the wizard.
    pub fn submit(
        &self,
        draft: ApplicationDraft,
    ) -> Result<CandidateApplication, ApplicationServiceError> {
        validate_all(&draft)?;
        let record = self.store.insert(draft.to_new_application())?;
        info!(application_id = %record.id, "application submitted");
        Ok(record)
    }

    pub fn open_wizard(&self) -> (WizardId, WizardView) {
        let now = Utc::now();
        let id = WizardId::generate();
        let state = WizardState::new();
        let view = state.view();

        let mut wizards = self.wizards();
        self.sweep(&mut wizards, now);
        wizards.insert(
            id.clone(),
            WizardSession {
                state,
                last_touched: now,
            },
        );
        (id, view)
    }

    pub fn wizard_view(&self, id: &WizardId) -> Result<WizardView, ApplicationServiceError> {
        self.with_wizard(id, |state| Ok(state.view()))
    }

    /// Discard a wizard. Refused while its submission is in flight.
    pub fn close_wizard(&self, id: &WizardId) -> Result<(), ApplicationServiceError> {
        let mut wizards = self.wizards();
        let submitting = wizards
            .get(id)
            .map(|session| matches!(session.state.phase(), WizardPhase::Submitting));
        match submitting {
            None => Err(ApplicationServiceError::UnknownWizard(id.clone())),
            Some(true) => Err(WizardError::Submitting.into()),
            Some(false) => {
                wizards.remove(id);
                Ok(())
            }
        }
    }

    /// Apply edits in order; each one clears only its own field's error.
    pub fn edit_fields(
        &self,
        id: &WizardId,
        edits: BTreeMap<ApplicationField, String>,
    ) -> Result<WizardView, ApplicationServiceError> {
        self.with_wizard(id, |state| {
            for (field, value) in edits {
                state.edit(field, value)?;
            }
            Ok(state.view())
        })
    }

    pub fn back(&self, id: &WizardId) -> Result<WizardView, ApplicationServiceError> {
        self.with_wizard(id, |state| {
            state.back()?;
            Ok(state.view())
        })
    }

    /// Validate the current step and advance, submitting from the last step.
    ///
    /// The store call runs outside the session lock; the wizard sits in `Submitting`
    /// meanwhile, so repeated requests are refused rather than double-inserted. A wizard
    /// that submits is discarded; the returned view is its last.
    pub fn next(&self, id: &WizardId) -> Result<WizardResponse, ApplicationServiceError> {
        let pending = self.with_wizard(id, |state| match state.next()? {
            NextOutcome::Rejected(_) => Ok(Err(WizardResponse {
                transition: WizardTransition::Stayed,
                view: state.view(),
            })),
            NextOutcome::Advanced(_) => Ok(Err(WizardResponse {
                transition: WizardTransition::Advanced,
                view: state.view(),
            })),
            NextOutcome::ReadyToSubmit(application) => Ok(Ok(application)),
        })?;

        let application = match pending {
            Ok(application) => application,
            Err(response) => return Ok(response),
        };

        let stored = self.store.insert(application);
        let response = self.with_wizard(id, |state| match stored {
            Ok(record) => {
                state.submission_succeeded(&record)?;
                info!(application_id = %record.id, wizard = %id, "application submitted");
                Ok(WizardResponse {
                    transition: WizardTransition::Submitted(record),
                    view: state.view(),
                })
            }
            Err(err) => {
                warn!(wizard = %id, error = %err, "application submission failed");
                state.submission_failed()?;
                Ok(WizardResponse {
                    transition: WizardTransition::SubmissionFailed,
                    view: state.view(),
                })
            }
        })?;

        if matches!(response.transition, WizardTransition::Submitted(_)) {
            self.wizards().remove(id);
        }
        Ok(response)
    }

    /// Check, upload, and attach a resume to the wizard's `resume_url`.
    ///
    /// Rejected files never reach storage; storage failures leave the wizard untouched.
    /// If the wizard is closed or leaves editing while the upload runs, the object is removed.
    pub fn attach_resume(
        &self,
        id: &WizardId,
        upload: ResumeUpload,
    ) -> Result<WizardView, ApplicationServiceError> {
        self.with_wizard(id, |state| match state.phase() {
            WizardPhase::Editing(_) => Ok(()),
            WizardPhase::Submitting => Err(WizardError::Submitting.into()),
            WizardPhase::Success { .. } => Err(WizardError::Completed.into()),
        })?;

        let accepted = upload.accept(Utc::now())?;
        let url = self
            .resumes
            .upload(
                &accepted.object_name,
                accepted.content_type.essence_str(),
                &accepted.bytes,
            )
            .map_err(|err| {
                warn!(wizard = %id, error = %err, "resume upload failed");
                err
            })?;
        info!(wizard = %id, object = %accepted.object_name, "resume uploaded");

        let attached = self.with_wizard(id, |state| {
            state.edit(ApplicationField::ResumeUrl, url)?;
            Ok(state.view())
        });
        if attached.is_err() {
            match self.resumes.remove(&accepted.object_name) {
                Ok(()) => warn!(
                    wizard = %id,
                    object = %accepted.object_name,
                    "wizard changed during upload; resume discarded"
                ),
                Err(err) => warn!(
                    wizard = %id,
                    object = %accepted.object_name,
                    error = %err,
                    "wizard changed during upload; orphaned resume could not be removed"
                ),
            }
        }
        attached
    }

    pub fn open_resume(&self, object_name: &str) -> Result<StoredObject, ApplicationServiceError> {
        self.resumes
            .open(object_name)?
            .ok_or(ApplicationServiceError::Repository(RepositoryError::NotFound))
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("unknown wizard session {0}")]
    UnknownWizard(WizardId),
    #[error(transparent)]
    Resume(#[from] ResumeRejection),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
