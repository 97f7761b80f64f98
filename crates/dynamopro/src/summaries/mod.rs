//! Optional natural-language summaries of match results.
//!
//! Generation is a pluggable seam: the engine only knows the
//! [`TextGenerator`] trait. A slow or failing generator degrades to a
//! deterministic template, never to an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::Language;
use crate::matching::SubsidyMatch;

/// Failure of an external text-generation backend.
#[derive(Debug, thiserror::Error)]
pub enum TextGenError {
    #[error("text generation backend unavailable: {0}")]
    Unavailable(String),
    #[error("text generation backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// External text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, system_message: &str) -> Result<String, TextGenError>;
}

/// Produces user-facing summaries of a match set.
#[derive(Clone)]
pub struct SummaryService {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl SummaryService {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Summarize a match set in the caller's language.
    ///
    /// The generator call is bounded by the configured timeout. On timeout
    /// or backend failure the fallback template is returned and the failure
    /// is logged; the caller never sees an error.
    pub async fn match_summary(&self, matches: &[SubsidyMatch], language: Language) -> String {
        if matches.is_empty() {
            return fallback_empty(language).to_string();
        }

        let prompt = build_prompt(matches, language);
        let generated = tokio::time::timeout(
            self.timeout,
            self.generator.generate(&prompt, system_message(language)),
        )
        .await;

        match generated {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => {
                tracing::warn!("text generator returned an empty summary, using fallback");
                fallback_summary(matches, language)
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "text generation failed, using fallback summary");
                fallback_summary(matches, language)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "text generation timed out, using fallback summary"
                );
                fallback_summary(matches, language)
            }
        }
    }
}

fn system_message(language: Language) -> &'static str {
    match language {
        Language::Fr => {
            "Tu es un conseiller en subventions belges pour la rénovation durable. \
             Résume les aides trouvées en français, de façon concise et factuelle."
        }
        Language::Nl => {
            "Je bent een Belgische subsidieadviseur voor duurzame renovatie. \
             Vat de gevonden steunmaatregelen beknopt en feitelijk samen in het Nederlands."
        }
    }
}

fn build_prompt(matches: &[SubsidyMatch], language: Language) -> String {
    let mut lines = Vec::with_capacity(matches.len() + 1);
    lines.push(match language {
        Language::Fr => format!("Subventions trouvées ({}):", matches.len()),
        Language::Nl => format!("Gevonden subsidies ({}):", matches.len()),
    });
    for hit in matches {
        let amount = hit
            .computed_amount
            .map(|value| format!(" ~{value}€"))
            .unwrap_or_default();
        lines.push(format!("- {} ({}){amount}", hit.name, hit.provider));
    }
    lines.join("\n")
}

fn fallback_empty(language: Language) -> &'static str {
    match language {
        Language::Fr => "Aucune subvention correspondante n'a été trouvée pour votre situation.",
        Language::Nl => "Er werd geen passende subsidie gevonden voor uw situatie.",
    }
}

/// Deterministic summary used whenever the generator is unavailable.
fn fallback_summary(matches: &[SubsidyMatch], language: Language) -> String {
    let total: f64 = matches.iter().filter_map(|hit| hit.computed_amount).sum();
    let names: Vec<&str> = matches.iter().take(3).map(|hit| hit.name.as_str()).collect();
    let listed = names.join(", ");

    match language {
        Language::Fr => format!(
            "{} subvention(s) correspondent à votre situation, dont {listed}. \
             Montant potentiel estimé: {total:.2}€.",
            matches.len()
        ),
        Language::Nl => format!(
            "{} subsidie(s) komen overeen met uw situatie, waaronder {listed}. \
             Geschat potentieel bedrag: {total:.2}€.",
            matches.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubsidyId;

    struct CannedGenerator(Result<String, fn() -> TextGenError>);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _: &str, _: &str) -> Result<String, TextGenError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    struct StalledGenerator;

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn generate(&self, _: &str, _: &str) -> Result<String, TextGenError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn one_match() -> Vec<SubsidyMatch> {
        vec![SubsidyMatch {
            subsidy_id: SubsidyId("prime-isolation-toiture-rw".to_string()),
            name: "Prime isolation toiture".to_string(),
            provider: "Région wallonne".to_string(),
            relevance_score: 0.8,
            match_reason: "Cette subvention est disponible dans votre région".to_string(),
            computed_amount: Some(1750.0),
            recommendation_id: None,
        }]
    }

    #[tokio::test]
    async fn generated_text_is_passed_through() {
        let service = SummaryService::new(
            Arc::new(CannedGenerator(Ok("Résumé généré.".to_string()))),
            Duration::from_secs(5),
        );
        let summary = service.match_summary(&one_match(), Language::Fr).await;
        assert_eq!(summary, "Résumé généré.");
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_template() {
        let service = SummaryService::new(
            Arc::new(CannedGenerator(Err(|| {
                TextGenError::Unavailable("connection refused".to_string())
            }))),
            Duration::from_secs(5),
        );
        let summary = service.match_summary(&one_match(), Language::Fr).await;
        assert!(summary.contains("Prime isolation toiture"));
        assert!(summary.contains("1750.00€"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out_into_fallback() {
        let service =
            SummaryService::new(Arc::new(StalledGenerator), Duration::from_secs(30));
        let summary = service.match_summary(&one_match(), Language::Nl).await;
        assert!(summary.contains("waaronder Prime isolation toiture"));
    }

    #[tokio::test]
    async fn empty_match_set_has_a_dedicated_message() {
        let service = SummaryService::new(
            Arc::new(CannedGenerator(Ok("ignored".to_string()))),
            Duration::from_secs(5),
        );
        let summary = service.match_summary(&[], Language::Fr).await;
        assert!(summary.starts_with("Aucune subvention"));
    }
}
