use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::auth::{AuthError, SessionToken};
use super::service::{AdminService, AdminServiceError};
use crate::applications::{ApplicationId, ApplicationStore, RepositoryError};

/// Router builder exposing the admin console endpoints.
pub fn admin_router<S>(service: Arc<AdminService<S>>) -> Router
where
    S: ApplicationStore + 'static,
{
    Router::new()
        .route("/api/v1/admin/login", post(login_handler::<S>))
        .route("/api/v1/admin/logout", post(logout_handler::<S>))
        .route("/api/v1/admin/session", get(session_handler::<S>))
        .route("/api/v1/admin/applications", get(list_handler::<S>))
        .route("/api/v1/admin/applications/:id", get(detail_handler::<S>))
        .route("/api/v1/admin/applications/:id/pdf", get(pdf_handler::<S>))
        .route("/api/v1/admin/export.csv", get(csv_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.login(&request.email, &request.password, Utc::now()) {
        Ok(token) => {
            let payload = json!({ "token": token, "email": request.email.trim() });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => admin_error_response(err),
    }
}

pub(crate) async fn logout_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = bearer_token(&headers)
        .map_err(AdminServiceError::from)
        .and_then(|token| service.logout(&token));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => admin_error_response(err),
    }
}

pub(crate) async fn session_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let email = bearer_token(&headers)
        .ok()
        .and_then(|token| service.session_email(&token));
    let payload = json!({
        "authenticated": email.is_some(),
        "email": email,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = bearer_token(&headers)
        .map_err(AdminServiceError::from)
        .and_then(|token| service.load_applications(&token, query.search.as_deref(), Utc::now()));
    match result {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => admin_error_response(err),
    }
}

pub(crate) async fn detail_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = bearer_token(&headers)
        .map_err(AdminServiceError::from)
        .and_then(|token| service.application(&token, &ApplicationId(id)));
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => admin_error_response(err),
    }
}

pub(crate) async fn pdf_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = bearer_token(&headers)
        .map_err(AdminServiceError::from)
        .and_then(|token| service.export_pdf(&token, &ApplicationId(id)));
    match result {
        Ok(document) => download_response(
            "application/pdf",
            &document.file_name,
            document.bytes,
        ),
        Err(err) => admin_error_response(err),
    }
}

pub(crate) async fn csv_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = bearer_token(&headers)
        .map_err(AdminServiceError::from)
        .and_then(|token| service.export_csv(&token, Utc::now()));
    match result {
        Ok(export) => download_response(
            "text/csv; charset=utf-8",
            &export.file_name,
            export.body.into_bytes(),
        ),
        Err(err) => admin_error_response(err),
    }
}

/// Token from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<SessionToken, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| SessionToken(token.to_string()))
        .ok_or(AuthError::MissingToken)
}

fn download_response(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    let disposition = HeaderValue::from_str(&content_disposition(file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// `attachment` with an ASCII `filename` fallback and the exact name as RFC 5987 `filename*`.
pub(crate) fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

pub(crate) fn admin_error_response(err: AdminServiceError) -> Response {
    let status = match &err {
        AdminServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
        AdminServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AdminServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AdminServiceError::Repository(RepositoryError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        AdminServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
