//! Candidate intake: the application wizard, resume upload, and the store contracts
//! backing both.

pub mod domain;
pub mod repository;
pub mod resume;
pub mod router;
pub mod service;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationDraft, ApplicationField, ApplicationId, CandidateApplication, NewApplication,
    LONG_ANSWER_LIMIT, UNIVERSITIES,
};
pub use repository::{ApplicationStore, RepositoryError, ResumeStorage, StorageError, StoredObject};
pub use resume::{ResumeRejection, ResumeUpload, MAX_RESUME_BYTES};
pub use router::application_router;
pub use service::{
    ApplicationService, ApplicationServiceError, WizardId, WizardResponse, WizardTransition,
};
pub use validation::{is_valid_email, validate_all, validate_step, FieldErrors, ValidationErrors};
pub use wizard::{NextOutcome, WizardError, WizardPhase, WizardState, WizardStep, WizardView};
