use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::applications::router::{router, ApplicationsState};
use crate::applications::tracker::ApplicationTracker;
use crate::auth::{USER_ID_HEADER, USER_ROLES_HEADER};
use crate::catalog::SubsidyCatalog;
use crate::documents::DocumentProcessor;

use super::common::{MemoryRepository, StubExtractor};

fn app() -> Router {
    let catalog = Arc::new(SubsidyCatalog::with_defaults());
    let tracker = Arc::new(ApplicationTracker::new(
        Arc::clone(&catalog),
        Arc::new(MemoryRepository::default()),
    ));
    router(ApplicationsState {
        catalog,
        tracker,
        processor: DocumentProcessor::new(Arc::new(StubExtractor::with_r_value(5.0))),
    })
}

fn request(method: Method, uri: &str, user: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, roles)) = user {
        builder = builder.header(USER_ID_HEADER, id).header(USER_ROLES_HEADER, roles);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn create_draft(app: &Router, user: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/subsidies/prime-isolation-toiture-rw/applications",
            Some((user, "user")),
            Some(json!({
                "form": {"project": {"estimated_cost": 5000.0}},
                "language": "fr"
            })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn create_requires_an_authenticated_caller() {
    let app = app();
    let response = app
        .oneshot(request(
            Method::POST,
            "/subsidies/prime-isolation-toiture-rw/applications",
            None,
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn create_returns_the_seeded_draft() {
    let app = app();
    let created = create_draft(&app, "user-1").await;

    assert_eq!(created["status"], "draft");
    assert_eq!(created["user_id"], "user-1");
    assert_eq!(created["amount_requested"], json!(1750.0));
    assert_eq!(created["documents"].as_array().expect("documents").len(), 4);
}

#[tokio::test]
async fn create_for_unknown_subsidy_is_not_found() {
    let app = app();
    let response = app
        .oneshot(request(
            Method::POST,
            "/subsidies/no-such-subsidy/applications",
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_or_an_admin_can_read() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let uri = format!("/applications/{}", created["id"].as_str().expect("id"));

    let owner = app
        .clone()
        .oneshot(request(Method::GET, &uri, Some(("user-1", "user")), None))
        .await
        .expect("response");
    assert_eq!(owner.status(), StatusCode::OK);

    let stranger = app
        .clone()
        .oneshot(request(Method::GET, &uri, Some(("user-2", "user")), None))
        .await
        .expect("response");
    assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

    let admin = app
        .oneshot(request(Method::GET, &uri, Some(("admin-1", "admin")), None))
        .await
        .expect("response");
    assert_eq!(admin.status(), StatusCode::OK);
}

#[tokio::test]
async fn illegal_transitions_are_bad_requests() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let uri = format!("/applications/{}", created["id"].as_str().expect("id"));

    let response = app
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(("admin-1", "admin")),
            Some(json!({"status": "approved"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "invalid_state_transition");
}

#[tokio::test]
async fn status_decisions_are_admin_only() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let id = created["id"].as_str().expect("id").to_string();

    let submit = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/applications/{id}/submit"),
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(submit.status(), StatusCode::OK);

    let review = app
        .oneshot(request(
            Method::PUT,
            &format!("/applications/{id}"),
            Some(("user-1", "user")),
            Some(json!({"status": "under_review"})),
        ))
        .await
        .expect("response");
    assert_eq!(review.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn granted_amounts_are_admin_only() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let id = created["id"].as_str().expect("id").to_string();
    let uri = format!("/applications/{id}");

    let refused = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(("user-1", "user")),
            Some(json!({"amount_approved": 1600.0})),
        ))
        .await
        .expect("response");
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);

    let submit = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/applications/{id}/submit"),
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(submit.status(), StatusCode::OK);

    let review = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(("admin-1", "admin")),
            Some(json!({"status": "under_review"})),
        ))
        .await
        .expect("response");
    assert_eq!(review.status(), StatusCode::OK);

    let approved = app
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(("admin-1", "admin")),
            Some(json!({"status": "approved", "amount_approved": 1600.0})),
        ))
        .await
        .expect("response");
    assert_eq!(approved.status(), StatusCode::OK);

    let body = body_json(approved).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["amount_approved"], json!(1600.0));
}

#[tokio::test]
async fn stale_writes_conflict() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let id = created["id"].as_str().expect("id").to_string();

    let submit = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/applications/{id}/submit"),
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(submit.status(), StatusCode::OK);

    let stale = app
        .oneshot(request(
            Method::PUT,
            &format!("/applications/{id}"),
            Some(("user-1", "user")),
            Some(json!({
                "expected_version": 1,
                "form": {"project": {"estimated_cost": 8000.0}}
            })),
        ))
        .await
        .expect("response");
    assert_eq!(stale.status(), StatusCode::CONFLICT);

    let body = body_json(stale).await;
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn double_submission_is_rejected() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let uri = format!(
        "/applications/{}/submit",
        created["id"].as_str().expect("id")
    );

    let first = app
        .clone()
        .oneshot(request(Method::PUT, &uri, Some(("user-1", "user")), None))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(request(Method::PUT, &uri, Some(("user-1", "user")), None))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_uploads_record_a_verdict() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let id = created["id"].as_str().expect("id").to_string();
    let documents = created["documents"].as_array().expect("documents");
    let technical = documents
        .iter()
        .find(|d| d["document_type"] == "technical_spec")
        .expect("seeded technical slot");
    let document_id = technical["document_id"].as_str().expect("document id");

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/applications/{id}/documents/{document_id}"),
            Some(("user-1", "user")),
            Some(json!({
                "file_name": "fiche-technique.pdf",
                "document_type": "technical_spec",
                "language": "fr"
            })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let slot = body["documents"]
        .as_array()
        .expect("documents")
        .iter()
        .find(|d| d["document_id"] == document_id)
        .expect("slot kept")
        .clone();
    assert_eq!(slot["submitted"], json!(true));
    assert_eq!(slot["validation"], "valid");

    let missing = app
        .oneshot(request(
            Method::POST,
            &format!("/applications/{id}/documents/no-such-document"),
            Some(("user-1", "user")),
            Some(json!({
                "file_name": "x.pdf",
                "document_type": "technical_spec"
            })),
        ))
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn internal_notes_are_admin_only_and_hidden_from_owners() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let id = created["id"].as_str().expect("id").to_string();

    let refused = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/applications/{id}/notes"),
            Some(("user-1", "user")),
            Some(json!({"content": "hidden?", "is_internal": true})),
        ))
        .await
        .expect("response");
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);

    let accepted = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/applications/{id}/notes"),
            Some(("admin-1", "admin")),
            Some(json!({"content": "dossier incomplet", "is_internal": true})),
        ))
        .await
        .expect("response");
    assert_eq!(accepted.status(), StatusCode::CREATED);

    let owner_view = app
        .oneshot(request(
            Method::GET,
            &format!("/applications/{id}"),
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    let body = body_json(owner_view).await;
    assert!(body["notes"].as_array().expect("notes").is_empty());
}

#[tokio::test]
async fn user_listing_is_scoped_to_the_owner() {
    let app = app();
    create_draft(&app, "user-1").await;
    create_draft(&app, "user-1").await;

    let forbidden = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/applications/user/user-1",
            Some(("user-2", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let owner = app
        .oneshot(request(
            Method::GET,
            "/applications/user/user-1",
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(owner.status(), StatusCode::OK);

    let body = body_json(owner).await;
    assert_eq!(body["count"], json!(2));
}

#[tokio::test]
async fn deadlines_report_outstanding_documents() {
    let app = app();
    let created = create_draft(&app, "user-1").await;
    let id = created["id"].as_str().expect("id").to_string();

    let response = app
        .oneshot(request(
            Method::GET,
            &format!("/applications/{id}/deadlines"),
            Some(("user-1", "user")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["missing_documents"].as_array().expect("missing").len(),
        4
    );
}
