use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{ApplicationDraft, ApplicationField};
use super::repository::{ApplicationStore, RepositoryError, ResumeStorage, StorageError};
use super::resume::{ResumeUpload, MAX_RESUME_BYTES};
use super::service::{ApplicationService, ApplicationServiceError, WizardId, WizardTransition};
use super::wizard::WizardView;

/// Multipart framing headroom on top of the resume ceiling, so oversize files still get
/// the friendly rejection instead of a bare 413.
const RESUME_BODY_LIMIT: usize = MAX_RESUME_BYTES + 3 * 1024 * 1024;

/// Router builder exposing the candidate-facing endpoints.
pub fn application_router<S, R>(service: Arc<ApplicationService<S, R>>) -> Router
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<S, R>))
        .route("/api/v1/wizards", post(open_wizard_handler::<S, R>))
        .route(
            "/api/v1/wizards/:wizard_id",
            get(wizard_view_handler::<S, R>).delete(close_wizard_handler::<S, R>),
        )
        .route(
            "/api/v1/wizards/:wizard_id/fields",
            patch(edit_fields_handler::<S, R>),
        )
        .route("/api/v1/wizards/:wizard_id/next", post(next_handler::<S, R>))
        .route("/api/v1/wizards/:wizard_id/back", post(back_handler::<S, R>))
        .route(
            "/api/v1/wizards/:wizard_id/resume",
            post(resume_handler::<S, R>).layer(DefaultBodyLimit::max(RESUME_BODY_LIMIT)),
        )
        .route("/resumes/:object_name", get(resume_download_handler::<S, R>))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct WizardOpened {
    wizard_id: WizardId,
    #[serde(flatten)]
    view: WizardView,
}

pub(crate) async fn submit_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Json(draft): Json<ApplicationDraft>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    match service.submit(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn open_wizard_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    let (wizard_id, view) = service.open_wizard();
    (StatusCode::CREATED, Json(WizardOpened { wizard_id, view })).into_response()
}

pub(crate) async fn wizard_view_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(wizard_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    view_response(service.wizard_view(&WizardId(wizard_id)))
}

pub(crate) async fn close_wizard_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(wizard_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    match service.close_wizard(&WizardId(wizard_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn edit_fields_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(wizard_id): Path<String>,
    Json(edits): Json<BTreeMap<ApplicationField, String>>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    view_response(service.edit_fields(&WizardId(wizard_id), edits))
}

pub(crate) async fn back_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(wizard_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    view_response(service.back(&WizardId(wizard_id)))
}

pub(crate) async fn next_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(wizard_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    match service.next(&WizardId(wizard_id)) {
        Ok(response) => {
            let status = match response.transition {
                WizardTransition::Stayed => StatusCode::UNPROCESSABLE_ENTITY,
                WizardTransition::Advanced => StatusCode::OK,
                WizardTransition::Submitted(_) => StatusCode::CREATED,
                WizardTransition::SubmissionFailed => StatusCode::BAD_GATEWAY,
            };
            (status, Json(response.view)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn resume_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(wizard_id): Path<String>,
    mut multipart: Multipart,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    let upload = match read_resume_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            let payload = json!({ "error": "missing 'resume' file field" });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
        Err(err) => return err.into_response(),
    };

    view_response(service.attach_resume(&WizardId(wizard_id), upload))
}

async fn read_resume_field(
    multipart: &mut Multipart,
) -> Result<Option<ResumeUpload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if !matches!(field.name(), Some("resume") | Some("file")) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Some(ResumeUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

pub(crate) async fn resume_download_handler<S, R>(
    State(service): State<Arc<ApplicationService<S, R>>>,
    Path(object_name): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    match service.open_resume(&object_name) {
        Ok(object) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, object.content_type)],
            object.bytes,
        )
            .into_response(),
        Err(err) => service_error_response(err),
    }
}

fn view_response(result: Result<WizardView, ApplicationServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) fn service_error_response(err: ApplicationServiceError) -> Response {
    let status = match &err {
        ApplicationServiceError::Validation(errors) => {
            let payload = json!({
                "error": err.to_string(),
                "errors": errors.errors,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
        ApplicationServiceError::Resume(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::Wizard(_) => StatusCode::CONFLICT,
        ApplicationServiceError::UnknownWizard(_) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Storage(StorageError::InvalidName(_)) => StatusCode::BAD_REQUEST,
        ApplicationServiceError::Storage(StorageError::AlreadyExists(_)) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_))
        | ApplicationServiceError::Storage(StorageError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
