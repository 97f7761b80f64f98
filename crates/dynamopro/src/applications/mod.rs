//! Application lifecycle: drafts, submissions, reviews, documents, notes.

pub mod domain;
pub mod repository;
pub mod router;
pub mod tracker;

pub use domain::{
    ApplicantDetails, ApplicationId, ApplicationNote, ApplicationStatus, ApplicationSummary,
    BankDetails, DocumentStatus, FormData, HistoryEntry, ProjectDetails, PropertyDetails,
    SubsidyApplication,
};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::{router, ApplicationsState};
pub use tracker::{ApplicationDeadlines, ApplicationTracker, ApplicationUpdate, TrackerError};

#[cfg(test)]
mod tests;
