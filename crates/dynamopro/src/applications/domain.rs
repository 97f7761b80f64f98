use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{DocumentType, SubsidyId};
use crate::documents::DocumentValidationStatus;

/// Identifier wrapper for applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an application.
///
/// `Rejected`, `Completed` and `Cancelled` are terminal. Every other state
/// may be cancelled by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    AdditionalInfoRequired,
    Approved,
    Rejected,
    PaymentInProgress,
    Completed,
    Cancelled,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::AdditionalInfoRequired => "additional_info_required",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PaymentInProgress => "payment_in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Legal state machine edges. Self-transitions are not edges.
    pub fn can_transition_to(self, to: ApplicationStatus) -> bool {
        if to == Self::Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Self::Draft, Self::Submitted)
                | (Self::Submitted, Self::UnderReview)
                | (Self::UnderReview, Self::AdditionalInfoRequired)
                | (Self::UnderReview, Self::Approved)
                | (Self::UnderReview, Self::Rejected)
                | (Self::AdditionalInfoRequired, Self::UnderReview)
                | (Self::Approved, Self::PaymentInProgress)
                | (Self::PaymentInProgress, Self::Completed)
        )
    }
}

/// Per-document progress inside an application. One entry is seeded for
/// every document the subsidy scheme lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatus {
    pub document_id: String,
    pub name: String,
    pub document_type: DocumentType,
    pub required: bool,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default = "pending")]
    pub validation: DocumentValidationStatus,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<DateTime<Utc>>,
}

fn pending() -> DocumentValidationStatus {
    DocumentValidationStatus::Pending
}

/// Append-only status history line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub comment: String,
}

/// Free-form note on an application. Internal notes are only visible to
/// administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationNote {
    pub id: String,
    pub date: DateTime<Utc>,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,
}

/// Typed application form. Updates replace whole sections; fields inside an
/// absent section are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: BTreeMap<String, serde_json::Value>,
}

impl FormData {
    /// Section-level merge: sections present in the patch win, additional
    /// info entries are upserted key by key.
    pub fn merge(&mut self, patch: FormData) {
        if let Some(applicant) = patch.applicant {
            self.applicant = Some(applicant);
        }
        if let Some(property) = patch.property {
            self.property = Some(property);
        }
        if let Some(project) = patch.project {
            self.project = Some(project);
        }
        if let Some(bank) = patch.bank {
            self.bank = Some(bank);
        }
        self.additional_info.extend(patch.additional_info);
    }

    pub fn estimated_cost(&self) -> Option<f64> {
        self.project.as_ref().and_then(|project| project.estimated_cost)
    }
}

/// A subsidy application and its full tracked state.
///
/// `version` increments on every successful write and backs optimistic
/// concurrency control at the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyApplication {
    pub id: ApplicationId,
    pub subsidy_id: SubsidyId,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub form: FormData,
    pub documents: Vec<DocumentStatus>,
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub notes: Vec<ApplicationNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_requested: Option<f64>,
    /// Granted amount, set by a reviewer alongside the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_approved: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_response_date: Option<NaiveDate>,
    pub version: u64,
}

impl SubsidyApplication {
    /// Copy with internal notes stripped, for non-administrator readers.
    pub fn without_internal_notes(mut self) -> Self {
        self.notes.retain(|note| !note.is_internal);
        self
    }

    pub fn document(&self, document_id: &str) -> Option<&DocumentStatus> {
        self.documents
            .iter()
            .find(|document| document.document_id == document_id)
    }

    /// Required documents not yet submitted or still awaiting a verdict.
    pub fn missing_required_documents(&self) -> Vec<&DocumentStatus> {
        self.documents
            .iter()
            .filter(|document| {
                document.required
                    && (!document.submitted
                        || matches!(
                            document.validation,
                            DocumentValidationStatus::Invalid
                                | DocumentValidationStatus::NeedsMoreInfo
                        ))
            })
            .collect()
    }
}

/// Condensed view for user-facing application listings.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub subsidy_id: SubsidyId,
    pub status: ApplicationStatus,
    pub last_update: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_requested: Option<f64>,
}

impl From<&SubsidyApplication> for ApplicationSummary {
    fn from(application: &SubsidyApplication) -> Self {
        Self {
            id: application.id.clone(),
            subsidy_id: application.subsidy_id.clone(),
            status: application.status,
            last_update: application.last_update,
            amount_requested: application.amount_requested,
        }
    }
}
