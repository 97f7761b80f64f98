//! Process-local infrastructure: in-memory storage and stub backends for
//! the pluggable seams.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dynamopro::applications::{
    ApplicationId, ApplicationRepository, RepositoryError, SubsidyApplication,
};
use dynamopro::documents::{DocumentUpload, ExtractError, TextExtractor};
use dynamopro::summaries::{TextGenError, TextGenerator};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Map-backed application store. Writes are compare-and-swap on the record
/// version, matching the repository contract.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<String, SubsidyApplication>>>,
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(&self, application: &SubsidyApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.0.clone(), application.clone());
        Ok(())
    }

    async fn update(
        &self,
        application: &SubsidyApplication,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
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
            .expect("repository mutex poisoned")
            .get(&id.0)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<SubsidyApplication>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|application| application.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Placeholder generator used when no text backend is configured. Always
/// fails, so summary callers get the deterministic fallback.
#[derive(Default, Clone)]
pub(crate) struct UnconfiguredTextGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredTextGenerator {
    async fn generate(&self, _: &str, _: &str) -> Result<String, TextGenError> {
        Err(TextGenError::Unavailable(
            "no text generation backend configured".to_string(),
        ))
    }
}

/// Parses `key: value` and `key=value` lines out of a document's text
/// layer. Good enough for structured spec sheets; anything else yields an
/// empty map and the verdict asks for more information.
#[derive(Default, Clone)]
pub(crate) struct LineScanExtractor;

#[async_trait]
impl TextExtractor for LineScanExtractor {
    async fn extract(
        &self,
        upload: &DocumentUpload,
    ) -> Result<HashMap<String, f64>, ExtractError> {
        let Some(text) = upload.text.as_deref() else {
            return Ok(HashMap::new());
        };

        let mut parameters = HashMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':').or_else(|| line.split_once('=')) else {
                continue;
            };
            if let Ok(number) = value.trim().replace(',', ".").parse::<f64>() {
                parameters.insert(key.trim().to_lowercase(), number);
            }
        }
        Ok(parameters)
    }
}
