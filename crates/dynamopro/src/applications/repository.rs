use async_trait::async_trait;

use super::domain::{ApplicationId, SubsidyApplication};

/// Storage failures surfaced by [`ApplicationRepository`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for applications.
///
/// `update` is compare-and-swap on the stored version: implementations must
/// reject the write with [`RepositoryError::VersionConflict`] when the
/// stored record no longer carries `expected_version`.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, application: &SubsidyApplication) -> Result<(), RepositoryError>;

    async fn update(
        &self,
        application: &SubsidyApplication,
        expected_version: u64,
    ) -> Result<(), RepositoryError>;

    async fn fetch(&self, id: &ApplicationId) -> Result<SubsidyApplication, RepositoryError>;

    /// All applications owned by a user, newest activity first.
    async fn for_user(&self, user_id: &str) -> Result<Vec<SubsidyApplication>, RepositoryError>;
}
