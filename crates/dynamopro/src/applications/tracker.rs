use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Language, Subsidy, SubsidyCatalog, SubsidyId};
use crate::documents::{DocumentValidationStatus, DocumentVerdict};

use super::domain::{
    ApplicationId, ApplicationNote, ApplicationStatus, ApplicationSummary, DocumentStatus,
    FormData, HistoryEntry, SubsidyApplication,
};
use super::repository::{ApplicationRepository, RepositoryError};

/// Domain errors raised by the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("unknown subsidy '{0}'")]
    UnknownSubsidy(SubsidyId),
    #[error("application '{0}' not found")]
    NotFound(ApplicationId),
    #[error("document '{document}' not found in application '{application}'")]
    UnknownDocument {
        application: ApplicationId,
        document: String,
    },
    #[error("illegal transition from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Mutation request for an existing application. Absent fields are left
/// untouched; `expected_version` arms the optimistic concurrency check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationUpdate {
    #[serde(default)]
    pub form: Option<FormData>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    /// History line for a status change; a synthesized one is used when
    /// absent.
    #[serde(default)]
    pub comment: Option<String>,
    /// Granted amount, set by a reviewer alongside the decision.
    #[serde(default)]
    pub amount_approved: Option<f64>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Deadline digest for one application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDeadlines {
    pub next_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_deadline: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_response_date: Option<NaiveDate>,
    /// Days until the expected decision, only while under review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub missing_documents: Vec<String>,
}

fn next_action(status: ApplicationStatus, documents_outstanding: bool) -> &'static str {
    match status {
        ApplicationStatus::Draft if documents_outstanding => {
            "provide the required documents and submit the application"
        }
        ApplicationStatus::Draft => "submit the application",
        ApplicationStatus::Submitted => "wait for the review to start",
        ApplicationStatus::UnderReview => "await the decision",
        ApplicationStatus::AdditionalInfoRequired => "provide the requested information",
        ApplicationStatus::Approved => "await the payment to start",
        ApplicationStatus::PaymentInProgress => "await the payout",
        ApplicationStatus::Rejected
        | ApplicationStatus::Completed
        | ApplicationStatus::Cancelled => "no further action",
    }
}

/// Application lifecycle service.
///
/// Every mutation rereads the stored record, applies the change, and writes
/// back with a compare-and-swap on the version it read. Concurrent writers
/// lose with a conflict instead of silently overwriting each other.
pub struct ApplicationTracker<R> {
    catalog: Arc<SubsidyCatalog>,
    repository: Arc<R>,
}

impl<R: ApplicationRepository> ApplicationTracker<R> {
    pub fn new(catalog: Arc<SubsidyCatalog>, repository: Arc<R>) -> Self {
        Self {
            catalog,
            repository,
        }
    }

    /// Open a draft application for a subsidy, pre-seeding one document
    /// slot per document the scheme lists.
    pub async fn create(
        &self,
        user_id: &str,
        subsidy_id: &SubsidyId,
        form: FormData,
        language: Language,
    ) -> Result<SubsidyApplication, TrackerError> {
        let subsidy = self.subsidy(subsidy_id)?;
        if !subsidy.is_matchable() {
            return Err(TrackerError::Validation(format!(
                "subsidy '{subsidy_id}' is not open for applications"
            )));
        }

        let now = Utc::now();
        let documents = subsidy
            .required_documents
            .iter()
            .map(|required| DocumentStatus {
                document_id: Uuid::new_v4().to_string(),
                name: required.description.get(language).to_string(),
                document_type: required.document_type,
                required: required.required,
                submitted: false,
                validation: DocumentValidationStatus::Pending,
                comments: Vec::new(),
                submission_date: None,
            })
            .collect();

        let application = SubsidyApplication {
            id: ApplicationId(Uuid::new_v4().to_string()),
            subsidy_id: subsidy_id.clone(),
            user_id: user_id.to_string(),
            status: ApplicationStatus::Draft,
            amount_requested: form
                .estimated_cost()
                .and_then(|cost| subsidy.compute_amount(cost)),
            amount_approved: None,
            form,
            documents,
            history: vec![HistoryEntry {
                date: now,
                status: ApplicationStatus::Draft,
                comment: "application created".to_string(),
            }],
            notes: Vec::new(),
            created_at: now,
            last_update: now,
            submission_date: None,
            estimated_response_date: None,
            version: 1,
        };

        self.repository.insert(&application).await?;
        tracing::info!(
            application = %application.id,
            subsidy = %subsidy_id,
            user = %user_id,
            "application created"
        );
        Ok(application)
    }

    pub async fn get(&self, id: &ApplicationId) -> Result<SubsidyApplication, TrackerError> {
        match self.repository.fetch(id).await {
            Ok(application) => Ok(application),
            Err(RepositoryError::NotFound) => Err(TrackerError::NotFound(id.clone())),
            Err(error) => Err(error.into()),
        }
    }

    /// Apply a form patch and/or a status transition.
    pub async fn update(
        &self,
        id: &ApplicationId,
        update: ApplicationUpdate,
    ) -> Result<SubsidyApplication, TrackerError> {
        let mut application = self.get(id).await?;
        if let Some(expected) = update.expected_version {
            if expected != application.version {
                return Err(RepositoryError::VersionConflict {
                    expected,
                    found: application.version,
                }
                .into());
            }
        }
        let read_version = application.version;
        let now = Utc::now();

        if let Some(patch) = update.form {
            application.form.merge(patch);
            // The requested amount tracks the form while the file is still
            // a draft; it is frozen once submitted.
            if application.status == ApplicationStatus::Draft {
                if let Ok(subsidy) = self.subsidy(&application.subsidy_id) {
                    application.amount_requested = application
                        .form
                        .estimated_cost()
                        .and_then(|cost| subsidy.compute_amount(cost));
                }
            }
        }

        if let Some(amount) = update.amount_approved {
            application.amount_approved = Some(amount);
        }

        if let Some(to) = update.status {
            if to != application.status {
                let from = application.status;
                if !from.can_transition_to(to) {
                    return Err(TrackerError::InvalidTransition { from, to });
                }
                application.status = to;
                application.history.push(HistoryEntry {
                    date: now,
                    status: to,
                    comment: update.comment.unwrap_or_else(|| {
                        format!("status changed: {} -> {}", from.label(), to.label())
                    }),
                });

                if to == ApplicationStatus::Submitted && application.submission_date.is_none() {
                    application.submission_date = Some(now);
                    application.estimated_response_date = self
                        .subsidy(&application.subsidy_id)
                        .ok()
                        .and_then(|subsidy| subsidy.typical_processing_time_days)
                        .map(|days| (now + Duration::days(days)).date_naive());
                }
                tracing::info!(
                    application = %application.id,
                    from = from.label(),
                    to = to.label(),
                    "application status changed"
                );
            }
        }

        application.last_update = now;
        application.version += 1;
        self.repository.update(&application, read_version).await?;
        Ok(application)
    }

    /// Submit a draft. Any other starting state is an illegal transition,
    /// including a repeated submit.
    pub async fn submit(
        &self,
        id: &ApplicationId,
        expected_version: Option<u64>,
    ) -> Result<SubsidyApplication, TrackerError> {
        let current = self.get(id).await?;
        if current.status != ApplicationStatus::Draft {
            return Err(TrackerError::InvalidTransition {
                from: current.status,
                to: ApplicationStatus::Submitted,
            });
        }

        self.update(
            id,
            ApplicationUpdate {
                status: Some(ApplicationStatus::Submitted),
                expected_version,
                ..ApplicationUpdate::default()
            },
        )
        .await
    }

    /// Record an upload verdict against a seeded document slot.
    pub async fn record_document(
        &self,
        id: &ApplicationId,
        document_id: &str,
        verdict: &DocumentVerdict,
    ) -> Result<SubsidyApplication, TrackerError> {
        self.amend_document(id, document_id, |document, now| {
            document.submitted = true;
            // Re-uploads keep the first submission date.
            if document.submission_date.is_none() {
                document.submission_date = Some(now);
            }
            document.validation = verdict.status;
            document.comments = verdict.comments.clone();
        })
        .await
    }

    /// Reviewer override of a document verdict.
    pub async fn review_document(
        &self,
        id: &ApplicationId,
        document_id: &str,
        validation: DocumentValidationStatus,
        comments: Vec<String>,
    ) -> Result<SubsidyApplication, TrackerError> {
        self.amend_document(id, document_id, |document, _| {
            document.validation = validation;
            document.comments = comments.clone();
        })
        .await
    }

    async fn amend_document(
        &self,
        id: &ApplicationId,
        document_id: &str,
        apply: impl FnOnce(&mut DocumentStatus, chrono::DateTime<Utc>),
    ) -> Result<SubsidyApplication, TrackerError> {
        let mut application = self.get(id).await?;
        let read_version = application.version;
        let now = Utc::now();

        let document = application
            .documents
            .iter_mut()
            .find(|document| document.document_id == document_id)
            .ok_or_else(|| TrackerError::UnknownDocument {
                application: id.clone(),
                document: document_id.to_string(),
            })?;
        apply(document, now);

        application.last_update = now;
        application.version += 1;
        self.repository.update(&application, read_version).await?;
        Ok(application)
    }

    pub async fn add_note(
        &self,
        id: &ApplicationId,
        author: &str,
        content: &str,
        is_internal: bool,
    ) -> Result<SubsidyApplication, TrackerError> {
        if content.trim().is_empty() {
            return Err(TrackerError::Validation(
                "note content must not be empty".to_string(),
            ));
        }

        let mut application = self.get(id).await?;
        let read_version = application.version;
        let now = Utc::now();

        application.notes.push(ApplicationNote {
            id: Uuid::new_v4().to_string(),
            date: now,
            author: author.to_string(),
            content: content.to_string(),
            is_internal,
        });
        application.last_update = now;
        application.version += 1;
        self.repository.update(&application, read_version).await?;
        Ok(application)
    }

    /// Deadline digest: scheme deadline, expected decision date and the
    /// required documents still outstanding.
    pub async fn deadlines(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationDeadlines, TrackerError> {
        let application = self.get(id).await?;
        let deadline = self
            .subsidy(&application.subsidy_id)
            .ok()
            .and_then(|subsidy| subsidy.application_deadline);
        let today = Utc::now().date_naive();

        let missing_documents: Vec<String> = application
            .missing_required_documents()
            .into_iter()
            .map(|document| document.name.clone())
            .collect();

        Ok(ApplicationDeadlines {
            next_action: next_action(application.status, !missing_documents.is_empty()),
            application_deadline: deadline,
            days_until_deadline: deadline.map(|date| (date - today).num_days()),
            estimated_response_date: application.estimated_response_date,
            days_remaining: (application.status == ApplicationStatus::UnderReview)
                .then(|| application.estimated_response_date)
                .flatten()
                .map(|date| (date - today).num_days().max(0)),
            missing_documents,
        })
    }

    /// Condensed listing of a user's applications, newest activity first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<ApplicationSummary>, TrackerError> {
        let mut applications = self.repository.for_user(user_id).await?;
        applications.sort_by(|a, b| b.last_update.cmp(&a.last_update));
        Ok(applications.iter().map(ApplicationSummary::from).collect())
    }

    fn subsidy(&self, id: &SubsidyId) -> Result<&Subsidy, TrackerError> {
        self.catalog
            .get(id)
            .ok_or_else(|| TrackerError::UnknownSubsidy(id.clone()))
    }
}
