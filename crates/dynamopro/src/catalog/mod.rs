//! Read-only subsidy catalog: validated at load time, immutable afterwards.

pub mod domain;
pub mod router;
mod seed;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

pub use domain::{
    ConditionKind, DocumentType, Domain, Keyword, Language, LocalizedText, Region,
    RequiredDocument, Subsidy, SubsidyCondition, SubsidyId, SubsidyStatus, UserType,
};

/// Errors raised while building the catalog. Runtime queries never fail.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate subsidy id '{0}'")]
    DuplicateId(SubsidyId),
    #[error("subsidy '{id}' is invalid: {reason}")]
    InvalidEntry { id: SubsidyId, reason: String },
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Conjunction of optional filter criteria; list-valued criteria are a
/// disjunction over their values.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub regions: Vec<Region>,
    pub domains: Vec<Domain>,
    pub user_types: Vec<UserType>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub year_built: Option<i32>,
    pub free_text: Option<String>,
    pub include_inactive: bool,
}

impl CatalogFilter {
    fn accepts(&self, subsidy: &Subsidy) -> bool {
        if !self.include_inactive && !subsidy.is_matchable() {
            return false;
        }
        if !self.regions.is_empty()
            && !self.regions.iter().any(|region| subsidy.regions.contains(region))
        {
            return false;
        }
        if !self.domains.is_empty()
            && !self.domains.iter().any(|domain| subsidy.domains.contains(domain))
        {
            return false;
        }
        if !self.user_types.is_empty()
            && !self
                .user_types
                .iter()
                .any(|user_type| subsidy.eligible_user_types.contains(user_type))
        {
            return false;
        }
        // Amount bounds apply to the subsidy cap; uncapped percentage schemes
        // satisfy any minimum but no maximum.
        if let Some(min) = self.min_amount {
            if subsidy.max_amount.map_or(false, |cap| cap < min) {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if subsidy.max_amount.map_or(true, |cap| cap > max) {
                return false;
            }
        }
        if let Some(year) = self.year_built {
            if !subsidy.year_built_in_range(year) {
                return false;
            }
        }
        if let Some(query) = &self.free_text {
            if !free_text_matches(subsidy, query) {
                return false;
            }
        }
        true
    }
}

/// Exact case-insensitive substring containment over keyword labels and both
/// translations of name and description.
fn free_text_matches(subsidy: &Subsidy, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    subsidy
        .keywords
        .iter()
        .any(|keyword| keyword.label().contains(&needle))
        || [&subsidy.name, &subsidy.description]
            .iter()
            .any(|text| {
                text.fr.to_lowercase().contains(&needle) || text.nl.to_lowercase().contains(&needle)
            })
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    subsidies: Vec<Subsidy>,
}

/// Queryable repository of subsidy definitions. Insertion order is preserved
/// so matcher ties break deterministically.
#[derive(Debug)]
pub struct SubsidyCatalog {
    subsidies: Vec<Subsidy>,
    index: HashMap<SubsidyId, usize>,
}

impl SubsidyCatalog {
    pub fn from_subsidies(subsidies: Vec<Subsidy>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(subsidies.len());
        for (position, subsidy) in subsidies.iter().enumerate() {
            validate(subsidy)?;
            if index.insert(subsidy.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(subsidy.id.clone()));
            }
        }
        Ok(Self { subsidies, index })
    }

    /// Catalog seeded with the embedded Belgian subsidy data.
    pub fn with_defaults() -> Self {
        Self::from_subsidies(seed::default_subsidies())
            .expect("embedded seed data is validated by tests")
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Self::from_subsidies(file.subsidies)
    }

    pub fn get(&self, id: &SubsidyId) -> Option<&Subsidy> {
        self.index.get(id).map(|position| &self.subsidies[*position])
    }

    /// All subsidies passing the filter, in catalog order.
    pub fn list(&self, filter: &CatalogFilter) -> Vec<&Subsidy> {
        self.subsidies
            .iter()
            .filter(|subsidy| filter.accepts(subsidy))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subsidies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsidies.is_empty()
    }
}

fn validate(subsidy: &Subsidy) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidEntry {
        id: subsidy.id.clone(),
        reason: reason.to_string(),
    };

    if subsidy.regions.is_empty() {
        return Err(invalid("regions must be non-empty"));
    }
    if subsidy.domains.is_empty() {
        return Err(invalid("domains must be non-empty"));
    }
    if subsidy.eligible_user_types.is_empty() {
        return Err(invalid("eligible user types must be non-empty"));
    }
    for text in [&subsidy.name, &subsidy.provider, &subsidy.description] {
        if !text.is_complete() {
            return Err(invalid("name, provider and description need FR and NL text"));
        }
    }
    if let Some(amount) = subsidy.max_amount {
        if amount < 0.0 {
            return Err(invalid("max_amount must be >= 0"));
        }
    }
    if let Some(percentage) = subsidy.percentage {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(invalid("percentage must be within 0..=100"));
        }
    }
    if let (Some(min), Some(max)) = (subsidy.min_year_built, subsidy.max_year_built) {
        if min > max {
            return Err(invalid("min_year_built must not exceed max_year_built"));
        }
    }
    Ok(())
}
