use crate::catalog::{Region, Subsidy, UserType};

use super::config::MatchConfig;
use super::{PropertyContext, UserProfile};

/// Facts observed while scoring, reused to build the match reason.
pub(crate) struct MatchSignals {
    pub region: Option<Region>,
    pub user_type: Option<UserType>,
    pub year_built: Option<i32>,
    pub domain_overlap: Option<(usize, usize)>,
}

/// Weighted relevance of a subsidy for a profile, optionally refined by a
/// property. Deterministic, always within [0, 1].
pub(crate) fn score_subsidy(
    subsidy: &Subsidy,
    profile: &UserProfile,
    property: Option<&PropertyContext>,
    config: &MatchConfig,
) -> (f64, MatchSignals) {
    let mut score = 0.0;
    let mut signals = MatchSignals {
        region: None,
        user_type: None,
        year_built: None,
        domain_overlap: None,
    };

    if let Some(region) = profile.region {
        if subsidy.covers_region(region) {
            score += config.region_weight;
            signals.region = Some(region);
        }
    }

    if let Some(user_type) = profile.user_type {
        if subsidy.eligible_user_types.contains(&user_type) {
            score += config.user_type_weight;
            signals.user_type = Some(user_type);
        }
    }

    if let Some(property) = property {
        // The year criterion only applies when the scheme defines a full
        // window; open-ended schemes neither gain nor lose here.
        if let (Some(year), Some(min), Some(max)) = (
            property.year_built,
            subsidy.min_year_built,
            subsidy.max_year_built,
        ) {
            if (min..=max).contains(&year) {
                score += config.year_built_weight;
                signals.year_built = Some(year);
            }
        }

        if !subsidy.domains.is_empty() {
            let matched = property
                .domains
                .iter()
                .filter(|domain| subsidy.domains.contains(domain))
                .count();
            if matched > 0 {
                score += config.domain_weight * (matched as f64 / subsidy.domains.len() as f64);
                signals.domain_overlap = Some((matched, subsidy.domains.len()));
            }
        }
    }

    (score.min(1.0), signals)
}
