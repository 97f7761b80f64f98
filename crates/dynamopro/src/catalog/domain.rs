use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubsidyId(pub String);

impl fmt::Display for SubsidyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication language for catalog text and match reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    Nl,
}

/// Bilingual text pair. Both translations are mandatory so lookups never
/// fall back across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub fr: String,
    pub nl: String,
}

impl LocalizedText {
    pub fn new(fr: impl Into<String>, nl: impl Into<String>) -> Self {
        Self {
            fr: fr.into(),
            nl: nl.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Fr => &self.fr,
            Language::Nl => &self.nl,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.fr.trim().is_empty() && !self.nl.trim().is_empty()
    }
}

/// Belgian administrative level a subsidy applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Wallonia,
    Flanders,
    Brussels,
    Federal,
}

impl Region {
    pub const fn label(self) -> &'static str {
        match self {
            Region::Wallonia => "wallonia",
            Region::Flanders => "flanders",
            Region::Brussels => "brussels",
            Region::Federal => "federal",
        }
    }
}

/// Sustainability domain a subsidy targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Energy,
    Water,
    Waste,
    Biodiversity,
    Renovation,
    Mobility,
    CircularEconomy,
}

impl Domain {
    pub const fn label(self) -> &'static str {
        match self {
            Domain::Energy => "energy",
            Domain::Water => "water",
            Domain::Waste => "waste",
            Domain::Biodiversity => "biodiversity",
            Domain::Renovation => "renovation",
            Domain::Mobility => "mobility",
            Domain::CircularEconomy => "circular_economy",
        }
    }
}

/// Applicant categories recognized by the Belgian subsidy schemes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Individual,
    SelfEmployed,
    SmallBusiness,
    MediumBusiness,
    LargeBusiness,
    PublicEntity,
    NonProfit,
}

impl UserType {
    pub const fn label(self) -> &'static str {
        match self {
            UserType::Individual => "individual",
            UserType::SelfEmployed => "self_employed",
            UserType::SmallBusiness => "small_business",
            UserType::MediumBusiness => "medium_business",
            UserType::LargeBusiness => "large_business",
            UserType::PublicEntity => "public_entity",
            UserType::NonProfit => "non_profit",
        }
    }
}

/// Lifecycle of a catalog entry. Only `Active` entries are matchable;
/// transitions happen out of band through a re-seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsidyStatus {
    Active,
    Expired,
    ComingSoon,
    Suspended,
}

/// Classification of an eligibility condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Technical,
    Provider,
    Temporal,
    Administrative,
    Geographic,
    Financial,
    Other,
}

/// Typed eligibility predicate. Technical conditions carry a named numeric
/// parameter and the minimum value an installation must reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyCondition {
    pub kind: ConditionKind,
    pub description: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_threshold: Option<f64>,
}

/// Kind of supporting document an application must include.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Identity,
    Ownership,
    Invoice,
    Quote,
    TechnicalSpec,
    Certificate,
    Permit,
    Tax,
    Photos,
    Plan,
    Form,
    Other,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::Identity => "identity",
            DocumentType::Ownership => "ownership",
            DocumentType::Invoice => "invoice",
            DocumentType::Quote => "quote",
            DocumentType::TechnicalSpec => "technical_spec",
            DocumentType::Certificate => "certificate",
            DocumentType::Permit => "permit",
            DocumentType::Tax => "tax",
            DocumentType::Photos => "photos",
            DocumentType::Plan => "plan",
            DocumentType::Form => "form",
            DocumentType::Other => "other",
        }
    }
}

/// Document required by a subsidy scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredDocument {
    pub document_type: DocumentType,
    pub description: LocalizedText,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Measure tags used for recommendation and free-text matching. Matching is
/// a set intersection on these tags, never substring probing of titles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Solar,
    HeatPump,
    Insulation,
    Windows,
    Led,
    Rainwater,
    Audit,
    Renovation,
    Heating,
    Ventilation,
    Biodiversity,
    Circular,
    Waste,
    EvCharging,
    Battery,
    GreenRoof,
    WaterSaving,
    Biomass,
    Cogeneration,
}

impl Keyword {
    pub const fn label(self) -> &'static str {
        match self {
            Keyword::Solar => "solar",
            Keyword::HeatPump => "heat_pump",
            Keyword::Insulation => "insulation",
            Keyword::Windows => "windows",
            Keyword::Led => "led",
            Keyword::Rainwater => "rainwater",
            Keyword::Audit => "audit",
            Keyword::Renovation => "renovation",
            Keyword::Heating => "heating",
            Keyword::Ventilation => "ventilation",
            Keyword::Biodiversity => "biodiversity",
            Keyword::Circular => "circular",
            Keyword::Waste => "waste",
            Keyword::EvCharging => "ev_charging",
            Keyword::Battery => "battery",
            Keyword::GreenRoof => "green_roof",
            Keyword::WaterSaving => "water_saving",
            Keyword::Biomass => "biomass",
            Keyword::Cogeneration => "cogeneration",
        }
    }
}

/// Catalog entry. Immutable once published; runtime code never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsidy {
    pub id: SubsidyId,
    pub name: LocalizedText,
    pub provider: LocalizedText,
    pub description: LocalizedText,
    pub regions: BTreeSet<Region>,
    pub domains: BTreeSet<Domain>,
    pub eligible_user_types: BTreeSet<UserType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub conditions: Vec<SubsidyCondition>,
    #[serde(default)]
    pub required_documents: Vec<RequiredDocument>,
    #[serde(default)]
    pub keywords: BTreeSet<Keyword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year_built: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year_built: Option<i32>,
    pub status: SubsidyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_processing_time_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

impl Subsidy {
    /// Only active entries take part in matching and listings.
    pub fn is_matchable(&self) -> bool {
        self.status == SubsidyStatus::Active
    }

    /// Nationwide schemes cover every region.
    pub fn covers_region(&self, region: Region) -> bool {
        self.regions.contains(&region) || self.regions.contains(&Region::Federal)
    }

    /// Hard eligibility gate: region and user type are required matches.
    pub fn eligible_for(&self, region: Region, user_type: UserType) -> bool {
        self.covers_region(region) && self.eligible_user_types.contains(&user_type)
    }

    /// Inclusive construction-year window check. Absent bounds are open.
    pub fn year_built_in_range(&self, year: i32) -> bool {
        self.min_year_built.map_or(true, |min| year >= min)
            && self.max_year_built.map_or(true, |max| year <= max)
    }

    /// Subsidy amount for an estimated project cost, rounded to cents.
    ///
    /// Percentage schemes are clamped to `max_amount` and floored at
    /// `min_amount`; flat grants pay `max_amount` regardless of cost.
    pub fn compute_amount(&self, estimated_cost: f64) -> Option<f64> {
        let raw = if let Some(percentage) = self.percentage {
            let mut amount = estimated_cost * (percentage / 100.0);
            if let Some(max) = self.max_amount {
                amount = amount.min(max);
            }
            if let Some(min) = self.min_amount {
                amount = amount.max(min);
            }
            amount
        } else {
            self.max_amount?
        };

        Some((raw * 100.0).round() / 100.0)
    }

    /// Technical conditions carrying a numeric threshold, used by document
    /// validation.
    pub fn technical_conditions(&self) -> impl Iterator<Item = &SubsidyCondition> {
        self.conditions.iter().filter(|condition| {
            condition.kind == ConditionKind::Technical
                && condition.technical_parameter.is_some()
                && condition.technical_threshold.is_some()
        })
    }
}
