//! Shared fixtures for the application tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::applications::domain::{ApplicationId, FormData, ProjectDetails, SubsidyApplication};
use crate::applications::repository::{ApplicationRepository, RepositoryError};
use crate::applications::tracker::ApplicationTracker;
use crate::catalog::{SubsidyCatalog, SubsidyId};
use crate::documents::{DocumentUpload, ExtractError, TextExtractor};

/// Map-backed repository with the same compare-and-swap contract as the
/// production store.
#[derive(Default)]
pub struct MemoryRepository {
    records: Mutex<HashMap<String, SubsidyApplication>>,
}

#[async_trait]
impl ApplicationRepository for MemoryRepository {
    async fn insert(&self, application: &SubsidyApplication) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("repository lock");
        if records.contains_key(&application.id.0) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(application.id.0.clone(), application.clone());
        Ok(())
    }

    async fn update(
        &self,
        application: &SubsidyApplication,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("repository lock");
        let stored = records
            .get_mut(&application.id.0)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        *stored = application.clone();
        Ok(())
    }

    async fn fetch(&self, id: &ApplicationId) -> Result<SubsidyApplication, RepositoryError> {
        self.records
            .lock()
            .expect("repository lock")
            .get(&id.0)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<SubsidyApplication>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository lock")
            .values()
            .filter(|application| application.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Extractor returning a fixed parameter map.
pub struct StubExtractor(pub HashMap<String, f64>);

impl StubExtractor {
    pub fn with_r_value(value: f64) -> Self {
        Self([("r_value".to_string(), value)].into_iter().collect())
    }
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, _: &DocumentUpload) -> Result<HashMap<String, f64>, ExtractError> {
        Ok(self.0.clone())
    }
}

pub fn tracker() -> ApplicationTracker<MemoryRepository> {
    ApplicationTracker::new(
        Arc::new(SubsidyCatalog::with_defaults()),
        Arc::new(MemoryRepository::default()),
    )
}

pub fn roof_insulation_id() -> SubsidyId {
    SubsidyId("prime-isolation-toiture-rw".to_string())
}

pub fn suspended_id() -> SubsidyId {
    SubsidyId("prime-audit-energetique-rw".to_string())
}

/// Form with a 5000 euro insulation project.
pub fn draft_form() -> FormData {
    FormData {
        project: Some(ProjectDetails {
            description: Some("Isolation de la toiture".to_string()),
            estimated_cost: Some(5000.0),
            ..ProjectDetails::default()
        }),
        ..FormData::default()
    }
}
