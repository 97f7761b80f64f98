//! Supporting-document intake and technical validation.
//!
//! Text extraction is a pluggable seam behind [`TextExtractor`]. Extracted
//! numeric parameters are checked against the subsidy's technical
//! conditions; a degraded extractor downgrades the verdict to
//! "needs more info" instead of failing the upload.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{DocumentType, Language, Subsidy};

/// Verdict on one uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentValidationStatus {
    Pending,
    Valid,
    Invalid,
    NeedsMoreInfo,
}

impl DocumentValidationStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::NeedsMoreInfo => "needs_more_info",
        }
    }
}

/// A document handed in by the applicant. Content is the text layer only;
/// binary payloads are stored elsewhere.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub document_type: DocumentType,
    #[serde(default)]
    pub text: Option<String>,
}

/// Result of processing one upload.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentVerdict {
    pub status: DocumentValidationStatus,
    pub comments: Vec<String>,
}

impl DocumentVerdict {
    fn new(status: DocumentValidationStatus) -> Self {
        Self {
            status,
            comments: Vec::new(),
        }
    }

    fn with_comment(status: DocumentValidationStatus, comment: String) -> Self {
        Self {
            status,
            comments: vec![comment],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("text extraction backend unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Extracts named numeric parameters (r-values, peak power, capacities)
/// from a document's text layer.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, upload: &DocumentUpload) -> Result<HashMap<String, f64>, ExtractError>;
}

/// Validates uploads against a subsidy's technical conditions.
#[derive(Clone)]
pub struct DocumentProcessor {
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentProcessor {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Verdict for one upload against one subsidy.
    ///
    /// Documents the subsidy never asked for are accepted as-is. Technical
    /// conditions are only enforced on the document types that carry them;
    /// a missing parameter asks for more information rather than rejecting.
    pub async fn process(
        &self,
        subsidy: &Subsidy,
        upload: &DocumentUpload,
        language: Language,
    ) -> DocumentVerdict {
        let requested = subsidy
            .required_documents
            .iter()
            .any(|document| document.document_type == upload.document_type);
        if !requested {
            return DocumentVerdict::new(DocumentValidationStatus::Valid);
        }

        if !carries_technical_evidence(upload.document_type) {
            return DocumentVerdict::new(DocumentValidationStatus::Valid);
        }

        let parameters = match self.extractor.extract(upload).await {
            Ok(parameters) => parameters,
            Err(error) => {
                tracing::warn!(
                    %error,
                    file_name = %upload.file_name,
                    "text extraction failed, requesting manual follow-up"
                );
                return DocumentVerdict::with_comment(
                    DocumentValidationStatus::NeedsMoreInfo,
                    extraction_failed_comment(language),
                );
            }
        };

        let mut comments = Vec::new();
        let mut status = DocumentValidationStatus::Valid;
        for condition in subsidy.technical_conditions() {
            let (Some(parameter), Some(threshold)) = (
                condition.technical_parameter.as_deref(),
                condition.technical_threshold,
            ) else {
                continue;
            };

            match parameters.get(parameter) {
                Some(value) if *value >= threshold => {}
                Some(value) => {
                    status = DocumentValidationStatus::Invalid;
                    comments.push(below_threshold_comment(
                        language, parameter, *value, threshold,
                    ));
                }
                None => {
                    if status != DocumentValidationStatus::Invalid {
                        status = DocumentValidationStatus::NeedsMoreInfo;
                    }
                    comments.push(missing_parameter_comment(language, parameter));
                }
            }
        }

        DocumentVerdict { status, comments }
    }
}

/// Document types whose content is expected to prove technical parameters.
fn carries_technical_evidence(document_type: DocumentType) -> bool {
    matches!(
        document_type,
        DocumentType::TechnicalSpec | DocumentType::Quote | DocumentType::Invoice
    )
}

fn extraction_failed_comment(language: Language) -> String {
    match language {
        Language::Fr => {
            "Le document n'a pas pu être analysé automatiquement; \
             une vérification manuelle est nécessaire."
                .to_string()
        }
        Language::Nl => {
            "Het document kon niet automatisch worden geanalyseerd; \
             een handmatige controle is vereist."
                .to_string()
        }
    }
}

fn below_threshold_comment(
    language: Language,
    parameter: &str,
    value: f64,
    threshold: f64,
) -> String {
    match language {
        Language::Fr => format!(
            "La valeur de {parameter} ({value}) est inférieure au minimum requis ({threshold})."
        ),
        Language::Nl => format!(
            "De waarde van {parameter} ({value}) ligt onder het vereiste minimum ({threshold})."
        ),
    }
}

fn missing_parameter_comment(language: Language, parameter: &str) -> String {
    match language {
        Language::Fr => {
            format!("Le paramètre {parameter} est introuvable dans le document fourni.")
        }
        Language::Nl => {
            format!("De parameter {parameter} werd niet gevonden in het aangeleverde document.")
        }
    }
}
