use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::Principal;
use crate::catalog::{Language, SubsidyCatalog, SubsidyId};
use crate::documents::{DocumentProcessor, DocumentUpload, DocumentValidationStatus};
use crate::error::AppError;

use super::domain::{ApplicationId, ApplicationStatus, SubsidyApplication};
use super::repository::ApplicationRepository;
use super::tracker::{ApplicationTracker, ApplicationUpdate};

/// Shared state for the application routes.
pub struct ApplicationsState<R> {
    pub catalog: Arc<SubsidyCatalog>,
    pub tracker: Arc<ApplicationTracker<R>>,
    pub processor: DocumentProcessor,
}

impl<R> Clone for ApplicationsState<R> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            tracker: Arc::clone(&self.tracker),
            processor: self.processor.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateApplicationRequest {
    #[serde(default)]
    form: super::domain::FormData,
    #[serde(default)]
    language: Language,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SubmitDocumentRequest {
    #[serde(flatten)]
    upload: DocumentUpload,
    #[serde(default)]
    language: Language,
}

#[derive(Debug, Deserialize)]
struct ReviewDocumentRequest {
    validation: DocumentValidationStatus,
    #[serde(default)]
    comments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NoteRequest {
    content: String,
    #[serde(default)]
    is_internal: bool,
}

/// Application lifecycle routes, mounted under the versioned API prefix.
pub fn router<R>(state: ApplicationsState<R>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/subsidies/:subsidy_id/applications",
            post(create_application::<R>),
        )
        .route(
            "/applications/:id",
            get(get_application::<R>).put(update_application::<R>),
        )
        .route("/applications/:id/submit", put(submit_application::<R>))
        .route(
            "/applications/:id/documents/:document_id",
            post(submit_document::<R>),
        )
        .route(
            "/applications/:id/documents/:document_id/review",
            put(review_document::<R>),
        )
        .route("/applications/:id/deadlines", get(get_deadlines::<R>))
        .route("/applications/:id/notes", post(add_note::<R>))
        .route("/applications/user/:user_id", get(list_for_user::<R>))
        .with_state(state)
}

/// Reader-appropriate projection of an application.
fn visible_to(principal: &Principal, application: SubsidyApplication) -> SubsidyApplication {
    if principal.is_admin {
        application
    } else {
        application.without_internal_notes()
    }
}

fn authorize(principal: &Principal, application: &SubsidyApplication) -> Result<(), AppError> {
    if principal.may_act_on(&application.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "not allowed to access this application".to_string(),
        ))
    }
}

async fn create_application<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(subsidy_id): Path<String>,
    body: Option<Json<CreateApplicationRequest>>,
) -> Result<(StatusCode, Json<SubsidyApplication>), AppError> {
    let request = body.map(|Json(body)| body).unwrap_or_default();
    let application = state
        .tracker
        .create(
            &principal.id,
            &SubsidyId(subsidy_id),
            request.form,
            request.language,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

async fn get_application<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<SubsidyApplication>, AppError> {
    let application = state.tracker.get(&ApplicationId(id)).await?;
    authorize(&principal, &application)?;
    Ok(Json(visible_to(&principal, application)))
}

async fn update_application<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(update): Json<ApplicationUpdate>,
) -> Result<Json<SubsidyApplication>, AppError> {
    let id = ApplicationId(id);
    let current = state.tracker.get(&id).await?;
    authorize(&principal, &current)?;

    // Decision states are reserved for reviewers.
    if let Some(status) = update.status {
        let reviewer_only = matches!(
            status,
            ApplicationStatus::UnderReview
                | ApplicationStatus::AdditionalInfoRequired
                | ApplicationStatus::Approved
                | ApplicationStatus::Rejected
                | ApplicationStatus::PaymentInProgress
                | ApplicationStatus::Completed
        );
        if reviewer_only && !principal.is_admin {
            return Err(AppError::Forbidden(
                "status decisions require an administrator".to_string(),
            ));
        }
    }

    if update.amount_approved.is_some() && !principal.is_admin {
        return Err(AppError::Forbidden(
            "granted amounts are set by an administrator".to_string(),
        ));
    }

    let application = state.tracker.update(&id, update).await?;
    Ok(Json(visible_to(&principal, application)))
}

async fn submit_application<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(id): Path<String>,
    body: Option<Json<SubmitRequest>>,
) -> Result<Json<SubsidyApplication>, AppError> {
    let id = ApplicationId(id);
    let current = state.tracker.get(&id).await?;
    authorize(&principal, &current)?;

    let request = body.map(|Json(body)| body).unwrap_or_default();
    let application = state.tracker.submit(&id, request.expected_version).await?;
    Ok(Json(visible_to(&principal, application)))
}

async fn submit_document<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path((id, document_id)): Path<(String, String)>,
    Json(request): Json<SubmitDocumentRequest>,
) -> Result<(StatusCode, Json<SubsidyApplication>), AppError> {
    let id = ApplicationId(id);
    let current = state.tracker.get(&id).await?;
    authorize(&principal, &current)?;

    let subsidy = state
        .catalog
        .get(&current.subsidy_id)
        .ok_or_else(|| AppError::NotFound(format!("subsidy {} not found", current.subsidy_id)))?;
    let verdict = state
        .processor
        .process(subsidy, &request.upload, request.language)
        .await;

    let application = state
        .tracker
        .record_document(&id, &document_id, &verdict)
        .await?;
    Ok((StatusCode::CREATED, Json(visible_to(&principal, application))))
}

async fn review_document<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path((id, document_id)): Path<(String, String)>,
    Json(request): Json<ReviewDocumentRequest>,
) -> Result<Json<SubsidyApplication>, AppError> {
    if !principal.is_admin {
        return Err(AppError::Forbidden(
            "document review requires an administrator".to_string(),
        ));
    }

    let application = state
        .tracker
        .review_document(
            &ApplicationId(id),
            &document_id,
            request.validation,
            request.comments,
        )
        .await?;
    Ok(Json(application))
}

async fn get_deadlines<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<super::tracker::ApplicationDeadlines>, AppError> {
    let id = ApplicationId(id);
    let current = state.tracker.get(&id).await?;
    authorize(&principal, &current)?;

    Ok(Json(state.tracker.deadlines(&id).await?))
}

async fn add_note<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(request): Json<NoteRequest>,
) -> Result<(StatusCode, Json<SubsidyApplication>), AppError> {
    let id = ApplicationId(id);
    let current = state.tracker.get(&id).await?;
    authorize(&principal, &current)?;

    if request.is_internal && !principal.is_admin {
        return Err(AppError::Forbidden(
            "internal notes require an administrator".to_string(),
        ));
    }

    let application = state
        .tracker
        .add_note(&id, &principal.id, &request.content, request.is_internal)
        .await?;
    Ok((StatusCode::CREATED, Json(visible_to(&principal, application))))
}

async fn list_for_user<R: ApplicationRepository>(
    State(state): State<ApplicationsState<R>>,
    principal: Principal,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !principal.may_act_on(&user_id) {
        return Err(AppError::Forbidden(
            "not allowed to list applications for this user".to_string(),
        ));
    }

    let applications = state.tracker.for_user(&user_id).await?;
    Ok(Json(serde_json::json!({
        "count": applications.len(),
        "results": applications,
    })))
}
