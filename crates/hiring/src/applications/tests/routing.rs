use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::applications::router::submit_handler;
use crate::applications::wizard::WizardStep;
use crate::applications::ApplicationService;

const BOUNDARY: &str = "dosmicos-boundary";

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

fn multipart_request(uri: &str, field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

fn edits_json(step: WizardStep) -> Value {
    serde_json::to_value(step_edits(step)).expect("edits serialize")
}

#[tokio::test]
async fn submit_handler_returns_unprocessable_with_field_messages() {
    let (service, store, _) = build_service();
    let mut draft = complete_draft();
    draft.university = "Harvard".to_string();

    let response = submit_handler::<MemoryStore, MemoryResumes>(
        State(Arc::new(service)),
        axum::Json(draft),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["errors"]["university"], "Selecciona tu universidad");
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn submit_handler_maps_store_outage_to_bad_gateway() {
    let service = ApplicationService::new(
        Arc::new(FlakyStore::failing(1)),
        Arc::new(MemoryResumes::default()),
    );

    let response = submit_handler::<FlakyStore, MemoryResumes>(
        State(Arc::new(service)),
        axum::Json(complete_draft()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn submit_route_creates_records() {
    let (service, _, _) = build_service();
    let router = application_router_with_service(service);

    let body = serde_json::to_value(complete_draft()).expect("draft serializes");
    let response = router
        .oneshot(json_request("POST", "/api/v1/applications", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["id"], "app-000001");
    assert_eq!(payload["full_name"], "María Pérez");
    assert!(payload["created_at"].is_string());
}

#[tokio::test]
async fn wizard_routes_walk_to_submission() {
    let (service, store, _) = build_service();
    let router = application_router_with_service(service);

    let response = router
        .clone()
        .oneshot(empty_request("POST", "/api/v1/wizards"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let opened = read_json_body(response).await;
    let wizard_id = opened["wizard_id"].as_str().expect("wizard id").to_string();
    assert_eq!(opened["step"], "identity");
    assert_eq!(opened["progress_percent"], 25);

    let response = router
        .clone()
        .oneshot(empty_request("POST", &format!("/api/v1/wizards/{wizard_id}/next")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let view = read_json_body(response).await;
    assert_eq!(view["errors"]["full_name"], "El nombre es requerido");

    for (idx, step) in WizardStep::ALL.into_iter().enumerate() {
        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/wizards/{wizard_id}/fields"),
                edits_json(step),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(empty_request("POST", &format!("/api/v1/wizards/{wizard_id}/next")))
            .await
            .expect("route executes");
        if step.is_last() {
            assert_eq!(response.status(), StatusCode::CREATED);
            let view = read_json_body(response).await;
            assert_eq!(view["success"], true);
            assert_eq!(view["application_id"], "app-000001");
        } else {
            assert_eq!(response.status(), StatusCode::OK);
            let view = read_json_body(response).await;
            assert_eq!(view["step_index"], idx + 1);
        }
    }

    assert_eq!(store.records().len(), 1);

    let response = router
        .oneshot(empty_request("POST", &format!("/api/v1/wizards/{wizard_id}/back")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND, "submitted wizards are discarded");
}

#[tokio::test]
async fn back_route_returns_previous_step() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let (wizard_id, _) = service.open_wizard();
    service
        .edit_fields(&wizard_id, step_edits(WizardStep::Identity))
        .expect("edits accepted");
    service.next(&wizard_id).expect("advance");

    let router = crate::applications::application_router(service);
    let response = router
        .oneshot(empty_request("POST", &format!("/api/v1/wizards/{}/back", wizard_id.0)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let view = read_json_body(response).await;
    assert_eq!(view["step"], "identity");
    assert_eq!(view["values"]["email"], "maria.perez@uniandes.edu.co");
}

#[tokio::test]
async fn unknown_wizard_is_not_found() {
    let (service, _, _) = build_service();
    let router = application_router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/wizards/wiz_nope"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resume_upload_route_stores_and_serves_the_file() {
    let (service, _, resumes) = build_service();
    let service = Arc::new(service);
    let (wizard_id, _) = service.open_wizard();
    let router = crate::applications::application_router(service);

    let response = router
        .clone()
        .oneshot(multipart_request(
            &format!("/api/v1/wizards/{}/resume", wizard_id.0),
            "resume",
            "Hoja de vida.pdf",
            "application/pdf",
            b"%PDF-1.4 hoja de vida",
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let view = read_json_body(response).await;

    let names = resumes.object_names();
    assert_eq!(names.len(), 1);
    assert_eq!(
        view["values"]["resume_url"],
        json!(format!("{RESUME_BASE_URL}/{}", names[0]))
    );

    let response = router
        .oneshot(empty_request("GET", &format!("/resumes/{}", names[0])))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"%PDF-1.4 hoja de vida");
}

#[tokio::test]
async fn resume_upload_rejects_images_with_a_friendly_message() {
    let (service, _, resumes) = build_service();
    let service = Arc::new(service);
    let (wizard_id, _) = service.open_wizard();
    let router = crate::applications::application_router(service);

    let response = router
        .oneshot(multipart_request(
            &format!("/api/v1/wizards/{}/resume", wizard_id.0),
            "file",
            "selfie.png",
            "image/png",
            b"\x89PNG",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Solo se permiten archivos PDF o Word");
    assert!(resumes.object_names().is_empty());
}
