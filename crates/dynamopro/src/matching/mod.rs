//! Rule-based eligibility matcher.
//!
//! Region and user type are a hard gate; the weighted score only orders and
//! thresholds the survivors. Matches are transient query results and are
//! never persisted.

mod config;
pub mod lexicon;
mod score;

pub use config::MatchConfig;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    Domain, Keyword, Language, Region, Subsidy, SubsidyCatalog, SubsidyId, UserType,
};

use score::{score_subsidy, MatchSignals};

/// Caller profile used for matching. Missing fields make the hard gate
/// fail quietly; they are never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub region: Option<Region>,
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub language: Language,
}

/// Property attributes contributing the year-built and domain-overlap
/// score components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub domains: BTreeSet<Domain>,
}

impl PropertyContext {
    /// Candidate domains for a free-text property type, following the
    /// platform's building taxonomy.
    pub fn for_property_type(property_type: &str, year_built: Option<i32>) -> Self {
        let kind = property_type.trim().to_lowercase();
        let mut domains: BTreeSet<Domain> =
            [Domain::Energy, Domain::Water, Domain::Waste].into_iter().collect();

        if matches!(kind.as_str(), "house" | "apartment" | "building") {
            domains.insert(Domain::Renovation);
        }
        if matches!(kind.as_str(), "house" | "land") {
            domains.insert(Domain::Biodiversity);
        }
        if matches!(kind.as_str(), "office" | "commercial" | "industrial") {
            domains.insert(Domain::CircularEconomy);
            domains.insert(Domain::Mobility);
        }

        Self {
            year_built,
            domains,
        }
    }
}

/// An improvement recommendation to link subsidies against. Tags are
/// derived once (from the title, via [`lexicon`]) and matched as sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub domain: Domain,
    #[serde(default)]
    pub tags: BTreeSet<Keyword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

impl MeasureContext {
    pub fn from_title(
        id: Option<String>,
        domain: Domain,
        title: &str,
        estimated_cost: Option<f64>,
    ) -> Self {
        Self {
            id,
            domain,
            tags: lexicon::tags_from_text(title),
            estimated_cost,
        }
    }
}

/// Transient match result returned to the caller; never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsidyMatch {
    pub subsidy_id: SubsidyId,
    pub name: String,
    pub provider: String,
    pub relevance_score: f64,
    pub match_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_id: Option<String>,
}

/// Stateless matcher over an immutable catalog.
pub struct MatchEngine {
    catalog: Arc<SubsidyCatalog>,
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(catalog: Arc<SubsidyCatalog>) -> Self {
        Self::with_config(catalog, MatchConfig::default())
    }

    pub fn with_config(catalog: Arc<SubsidyCatalog>, config: MatchConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Relevance of one subsidy for a profile, ignoring the hard gate.
    pub fn score(
        &self,
        subsidy: &Subsidy,
        profile: &UserProfile,
        property: Option<&PropertyContext>,
    ) -> f64 {
        score_subsidy(subsidy, profile, property, &self.config).0
    }

    /// Matches for a bare profile, optionally refined by recommendations.
    ///
    /// With recommendations, each one is linked independently: the subsidy
    /// must cover the measure's domain and share at least one keyword tag.
    pub fn find_for_profile(
        &self,
        profile: &UserProfile,
        measures: &[MeasureContext],
        estimated_cost: Option<f64>,
    ) -> Vec<SubsidyMatch> {
        let (Some(region), Some(user_type)) = (profile.region, profile.user_type) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for subsidy in self.eligible(region, user_type) {
            if measures.is_empty() {
                self.push_match(&mut matches, subsidy, profile, None, estimated_cost, None);
                continue;
            }
            for measure in measures {
                if !subsidy.domains.contains(&measure.domain) {
                    continue;
                }
                if measure.tags.is_disjoint(&subsidy.keywords) {
                    continue;
                }
                self.push_match(
                    &mut matches,
                    subsidy,
                    profile,
                    None,
                    measure.estimated_cost.or(estimated_cost),
                    measure.id.clone(),
                );
            }
        }

        sort_matches(&mut matches);
        matches
    }

    /// Matches for a property, using the stricter score threshold.
    pub fn find_for_property(
        &self,
        profile: &UserProfile,
        property: &PropertyContext,
        estimated_cost: Option<f64>,
    ) -> Vec<SubsidyMatch> {
        let (Some(region), Some(user_type)) = (profile.region, profile.user_type) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for subsidy in self.eligible(region, user_type) {
            let (score, signals) = score_subsidy(subsidy, profile, Some(property), &self.config);
            if score < self.config.property_min_score {
                continue;
            }
            matches.push(self.build_match(subsidy, profile, score, &signals, estimated_cost, None));
        }

        sort_matches(&mut matches);
        matches
    }

    fn eligible(&self, region: Region, user_type: UserType) -> impl Iterator<Item = &Subsidy> {
        self.catalog
            .list(&Default::default())
            .into_iter()
            .filter(move |subsidy| subsidy.eligible_for(region, user_type))
    }

    fn push_match(
        &self,
        matches: &mut Vec<SubsidyMatch>,
        subsidy: &Subsidy,
        profile: &UserProfile,
        property: Option<&PropertyContext>,
        estimated_cost: Option<f64>,
        recommendation_id: Option<String>,
    ) {
        let (score, signals) = score_subsidy(subsidy, profile, property, &self.config);
        if score < self.config.min_score {
            return;
        }
        matches.push(self.build_match(
            subsidy,
            profile,
            score,
            &signals,
            estimated_cost,
            recommendation_id,
        ));
    }

    fn build_match(
        &self,
        subsidy: &Subsidy,
        profile: &UserProfile,
        score: f64,
        signals: &MatchSignals,
        estimated_cost: Option<f64>,
        recommendation_id: Option<String>,
    ) -> SubsidyMatch {
        let cost = estimated_cost.unwrap_or(self.config.default_estimated_cost);
        SubsidyMatch {
            subsidy_id: subsidy.id.clone(),
            name: subsidy.name.get(profile.language).to_string(),
            provider: subsidy.provider.get(profile.language).to_string(),
            relevance_score: score,
            match_reason: render_reason(subsidy, profile.language, signals),
            computed_amount: subsidy.compute_amount(cost),
            recommendation_id,
        }
    }
}

/// Stable descending sort; catalog order breaks ties.
fn sort_matches(matches: &mut [SubsidyMatch]) {
    matches.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn region_name(region: Region, language: Language) -> &'static str {
    match (region, language) {
        (Region::Wallonia, Language::Fr) => "Wallonie",
        (Region::Wallonia, Language::Nl) => "Wallonië",
        (Region::Flanders, Language::Fr) => "Flandre",
        (Region::Flanders, Language::Nl) => "Vlaanderen",
        (Region::Brussels, Language::Fr) => "Bruxelles",
        (Region::Brussels, Language::Nl) => "Brussel",
        (Region::Federal, Language::Fr) => "au niveau fédéral",
        (Region::Federal, Language::Nl) => "op federaal niveau",
    }
}

fn render_reason(subsidy: &Subsidy, language: Language, signals: &MatchSignals) -> String {
    let mut reasons = Vec::new();

    if let Some(region) = signals.region {
        reasons.push(match language {
            Language::Fr => format!(
                "Cette subvention est disponible dans votre région ({})",
                region_name(region, language)
            ),
            Language::Nl => format!(
                "Deze subsidie is beschikbaar in uw regio ({})",
                region_name(region, language)
            ),
        });
    }

    if let Some(user_type) = signals.user_type {
        reasons.push(match language {
            Language::Fr => format!("Vous êtes éligible en tant que {}", user_type.label()),
            Language::Nl => format!("U komt in aanmerking als {}", user_type.label()),
        });
    }

    if let Some(year) = signals.year_built {
        reasons.push(match language {
            Language::Fr => format!(
                "L'année de construction de votre propriété ({year}) est dans la plage éligible"
            ),
            Language::Nl => format!(
                "Het bouwjaar van uw eigendom ({year}) valt binnen het in aanmerking komende bereik"
            ),
        });
    }

    if let Some(amount) = subsidy.max_amount {
        reasons.push(match language {
            Language::Fr => format!("Montant maximum de la subvention: {amount}€"),
            Language::Nl => format!("Maximaal subsidiebedrag: {amount}€"),
        });
    } else if let Some(percentage) = subsidy.percentage {
        reasons.push(match language {
            Language::Fr => format!("Pourcentage de couverture: {percentage}%"),
            Language::Nl => format!("Dekkingspercentage: {percentage}%"),
        });
    }

    if reasons.is_empty() {
        return match language {
            Language::Fr => "Subvention potentiellement pertinente pour votre situation".to_string(),
            Language::Nl => "Potentieel relevante subsidie voor uw situatie".to_string(),
        };
    }
    reasons.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubsidyCatalog;

    fn engine() -> MatchEngine {
        MatchEngine::new(Arc::new(SubsidyCatalog::with_defaults()))
    }

    fn walloon_individual() -> UserProfile {
        UserProfile {
            region: Some(Region::Wallonia),
            user_type: Some(UserType::Individual),
            language: Language::Fr,
        }
    }

    fn roof_insulation_id() -> SubsidyId {
        SubsidyId("prime-isolation-toiture-rw".to_string())
    }

    #[test]
    fn walloon_individual_matches_roof_insulation_under_cap() {
        let engine = engine();
        let measure = MeasureContext::from_title(
            Some("rec-1".to_string()),
            Domain::Energy,
            "Isolation de la toiture",
            Some(5000.0),
        );

        let matches = engine.find_for_profile(&walloon_individual(), &[measure], None);
        let hit = matches
            .iter()
            .find(|m| m.subsidy_id == roof_insulation_id())
            .expect("roof insulation prime matches");

        // 35% of 5000 is 1750, below the 2000 cap.
        assert_eq!(hit.computed_amount, Some(1750.0));
        assert!(hit.relevance_score >= 0.6, "region and type weights apply");
        assert_eq!(hit.recommendation_id.as_deref(), Some("rec-1"));
    }

    #[test]
    fn amount_is_capped_at_max_amount() {
        let engine = engine();
        let measure = MeasureContext::from_title(
            None,
            Domain::Energy,
            "Isolation de la toiture",
            Some(10000.0),
        );

        let matches = engine.find_for_profile(&walloon_individual(), &[measure], None);
        let hit = matches
            .iter()
            .find(|m| m.subsidy_id == roof_insulation_id())
            .expect("roof insulation prime matches");

        // Raw 3500 exceeds the 2000 cap.
        assert_eq!(hit.computed_amount, Some(2000.0));
    }

    #[test]
    fn flemish_profile_is_gated_out_of_walloon_schemes() {
        let engine = engine();
        let profile = UserProfile {
            region: Some(Region::Flanders),
            user_type: Some(UserType::Individual),
            language: Language::Nl,
        };
        let measure = MeasureContext::from_title(
            None,
            Domain::Energy,
            "Dakisolatie plaatsen",
            Some(5000.0),
        );

        let matches = engine.find_for_profile(&profile, &[measure], None);
        assert!(
            matches.iter().all(|m| m.subsidy_id != roof_insulation_id()),
            "hard region gate excludes the Walloon prime regardless of keyword overlap"
        );
    }

    #[test]
    fn missing_region_or_type_yields_no_matches() {
        let engine = engine();
        let profile = UserProfile {
            region: None,
            user_type: Some(UserType::Individual),
            language: Language::Fr,
        };
        assert!(engine.find_for_profile(&profile, &[], None).is_empty());
    }

    #[test]
    fn measure_without_shared_tags_does_not_link() {
        let engine = engine();
        let measure = MeasureContext::from_title(
            None,
            Domain::Energy,
            "Installer des panneaux solaires",
            Some(8000.0),
        );

        let matches = engine.find_for_profile(&walloon_individual(), &[measure], None);
        assert!(
            matches.iter().all(|m| m.subsidy_id != roof_insulation_id()),
            "solar measure must not link to an insulation-tagged scheme"
        );
    }

    #[test]
    fn score_is_deterministic_and_bounded() {
        let engine = engine();
        let catalog = SubsidyCatalog::with_defaults();
        let profile = walloon_individual();
        let property = PropertyContext::for_property_type("house", Some(1995));

        for subsidy in catalog.list(&Default::default()) {
            let first = engine.score(subsidy, &profile, Some(&property));
            let second = engine.score(subsidy, &profile, Some(&property));
            assert_eq!(first, second);
            assert!((0.0..=1.0).contains(&first));
        }
    }

    #[test]
    fn property_query_uses_stricter_threshold_and_sorts_descending() {
        let engine = engine();
        let property = PropertyContext::for_property_type("house", Some(1995));
        let matches = engine.find_for_property(&walloon_individual(), &property, None);

        assert!(!matches.is_empty());
        for window in matches.windows(2) {
            assert!(window[0].relevance_score >= window[1].relevance_score);
        }
        for hit in &matches {
            assert!(hit.relevance_score >= 0.4);
        }
    }

    #[test]
    fn match_reason_is_localized() {
        let engine = engine();
        let property = PropertyContext::for_property_type("house", Some(1995));
        let matches = engine.find_for_property(&walloon_individual(), &property, None);
        let reason = &matches[0].match_reason;
        assert!(reason.contains("votre région") || reason.contains("éligible"));

        let profile_nl = UserProfile {
            region: Some(Region::Wallonia),
            user_type: Some(UserType::Individual),
            language: Language::Nl,
        };
        let matches_nl = engine.find_for_property(&profile_nl, &property, None);
        assert!(matches_nl[0].match_reason.contains("uw regio"));
    }

    #[test]
    fn compute_amount_is_monotone_then_constant() {
        let catalog = SubsidyCatalog::with_defaults();
        let subsidy = catalog.get(&roof_insulation_id()).expect("seeded");

        let mut previous = 0.0;
        for cost in [0.0, 1000.0, 3000.0, 5714.0, 6000.0, 20000.0] {
            let amount = subsidy.compute_amount(cost).expect("percentage scheme");
            assert!(amount >= previous, "amount must not decrease with cost");
            assert!(amount <= 2000.0, "amount never exceeds the cap");
            previous = amount;
        }
        assert_eq!(subsidy.compute_amount(100000.0), Some(2000.0));
    }

    #[test]
    fn flat_grant_ignores_cost() {
        let catalog = SubsidyCatalog::with_defaults();
        let cistern = catalog
            .get(&SubsidyId("prime-citerne-eau-pluie-rw".to_string()))
            .expect("seeded");
        assert_eq!(cistern.compute_amount(500.0), Some(1000.0));
        assert_eq!(cistern.compute_amount(50000.0), Some(1000.0));
    }
}
