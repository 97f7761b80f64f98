use serde::{Deserialize, Serialize};

/// Scoring weights and thresholds for the eligibility matcher.
///
/// The weights sum to 1.0 so a subsidy matching every criterion scores
/// exactly 1.0; the total is still capped defensively in the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub region_weight: f64,
    pub user_type_weight: f64,
    pub domain_weight: f64,
    pub year_built_weight: f64,
    /// Minimum relevance score for profile and recommendation queries.
    pub min_score: f64,
    /// Stricter minimum applied to property-based queries.
    pub property_min_score: f64,
    /// Project cost assumed when the caller supplies none.
    pub default_estimated_cost: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            region_weight: 0.4,
            user_type_weight: 0.2,
            domain_weight: 0.2,
            year_built_weight: 0.2,
            min_score: 0.3,
            property_min_score: 0.4,
            default_estimated_cost: 5000.0,
        }
    }
}
