use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::matching::{MatchEngine, MeasureContext, PropertyContext, SubsidyMatch, UserProfile};
use crate::summaries::SummaryService;

use super::{
    CatalogFilter, ConditionKind, DocumentType, Domain, Keyword, Language, Region, Subsidy,
    SubsidyCatalog, SubsidyId, SubsidyStatus, UserType,
};

/// Shared state for the catalog and matching routes.
#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<SubsidyCatalog>,
    pub engine: Arc<MatchEngine>,
    pub summaries: SummaryService,
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    region: Option<Region>,
    domain: Option<Domain>,
    user_type: Option<UserType>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    year_built: Option<i32>,
    query: Option<String>,
    #[serde(default)]
    include_inactive: bool,
    #[serde(default)]
    language: Language,
}

/// Flattened, single-language catalog entry for listings.
#[derive(Debug, Serialize)]
struct SubsidyListItem {
    id: SubsidyId,
    name: String,
    provider: String,
    description: String,
    regions: Vec<Region>,
    domains: Vec<Domain>,
    eligible_user_types: Vec<UserType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentage: Option<f64>,
    status: SubsidyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    application_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documentation_url: Option<String>,
}

impl SubsidyListItem {
    fn project(subsidy: &Subsidy, language: Language) -> Self {
        Self {
            id: subsidy.id.clone(),
            name: subsidy.name.get(language).to_string(),
            provider: subsidy.provider.get(language).to_string(),
            description: subsidy.description.get(language).to_string(),
            regions: subsidy.regions.iter().copied().collect(),
            domains: subsidy.domains.iter().copied().collect(),
            eligible_user_types: subsidy.eligible_user_types.iter().copied().collect(),
            max_amount: subsidy.max_amount,
            percentage: subsidy.percentage,
            status: subsidy.status,
            application_deadline: subsidy.application_deadline,
            documentation_url: subsidy.documentation_url.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DetailQuery {
    #[serde(default)]
    language: Language,
}

/// Single-language projection of a full catalog entry.
#[derive(Debug, Serialize)]
struct SubsidyDetail {
    id: SubsidyId,
    name: String,
    provider: String,
    description: String,
    regions: Vec<Region>,
    domains: Vec<Domain>,
    eligible_user_types: Vec<UserType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentage: Option<f64>,
    conditions: Vec<ConditionDetail>,
    required_documents: Vec<RequiredDocumentDetail>,
    keywords: Vec<Keyword>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_year_built: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_year_built: Option<i32>,
    status: SubsidyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    typical_processing_time_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    application_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documentation_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConditionDetail {
    kind: ConditionKind,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    technical_parameter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    technical_threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RequiredDocumentDetail {
    document_type: DocumentType,
    description: String,
    required: bool,
}

impl SubsidyDetail {
    fn project(subsidy: &Subsidy, language: Language) -> Self {
        Self {
            id: subsidy.id.clone(),
            name: subsidy.name.get(language).to_string(),
            provider: subsidy.provider.get(language).to_string(),
            description: subsidy.description.get(language).to_string(),
            regions: subsidy.regions.iter().copied().collect(),
            domains: subsidy.domains.iter().copied().collect(),
            eligible_user_types: subsidy.eligible_user_types.iter().copied().collect(),
            max_amount: subsidy.max_amount,
            min_amount: subsidy.min_amount,
            percentage: subsidy.percentage,
            conditions: subsidy
                .conditions
                .iter()
                .map(|condition| ConditionDetail {
                    kind: condition.kind,
                    description: condition.description.get(language).to_string(),
                    technical_parameter: condition.technical_parameter.clone(),
                    technical_threshold: condition.technical_threshold,
                })
                .collect(),
            required_documents: subsidy
                .required_documents
                .iter()
                .map(|document| RequiredDocumentDetail {
                    document_type: document.document_type,
                    description: document.description.get(language).to_string(),
                    required: document.required,
                })
                .collect(),
            keywords: subsidy.keywords.iter().copied().collect(),
            min_year_built: subsidy.min_year_built,
            max_year_built: subsidy.max_year_built,
            status: subsidy.status,
            typical_processing_time_days: subsidy.typical_processing_time_days,
            application_deadline: subsidy.application_deadline,
            documentation_url: subsidy.documentation_url.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PropertyRequest {
    property_type: Option<String>,
    year_built: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct MeasureRequest {
    id: Option<String>,
    domain: Domain,
    title: String,
    estimated_cost: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchRequest {
    #[serde(default)]
    profile: UserProfile,
    property: Option<PropertyRequest>,
    #[serde(default)]
    measures: Vec<MeasureRequest>,
    estimated_cost: Option<f64>,
    #[serde(default)]
    include_summary: bool,
}

#[derive(Debug, Serialize)]
struct MatchResponse {
    count: usize,
    matches: Vec<SubsidyMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

/// Catalog and matching routes, mounted under the versioned API prefix.
pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/subsidies", get(list_subsidies))
        .route("/subsidies/:id", get(get_subsidy))
        .route("/subsidies/match", post(match_subsidies))
        .with_state(state)
}

async fn list_subsidies(
    State(state): State<CatalogState>,
    Query(query): Query<ListQuery>,
) -> Json<serde_json::Value> {
    let filter = CatalogFilter {
        regions: query.region.into_iter().collect(),
        domains: query.domain.into_iter().collect(),
        user_types: query.user_type.into_iter().collect(),
        min_amount: query.min_amount,
        max_amount: query.max_amount,
        year_built: query.year_built,
        free_text: query.query,
        include_inactive: query.include_inactive,
    };

    let results: Vec<SubsidyListItem> = state
        .catalog
        .list(&filter)
        .into_iter()
        .map(|subsidy| SubsidyListItem::project(subsidy, query.language))
        .collect();

    Json(serde_json::json!({
        "count": results.len(),
        "results": results,
    }))
}

async fn get_subsidy(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<SubsidyDetail>, AppError> {
    let id = SubsidyId(id);
    state
        .catalog
        .get(&id)
        .map(|subsidy| Json(SubsidyDetail::project(subsidy, query.language)))
        .ok_or_else(|| AppError::NotFound(format!("subsidy {id} not found")))
}

async fn match_subsidies(
    State(state): State<CatalogState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let measures: Vec<MeasureContext> = request
        .measures
        .into_iter()
        .map(|measure| {
            MeasureContext::from_title(
                measure.id,
                measure.domain,
                &measure.title,
                measure.estimated_cost,
            )
        })
        .collect();

    let matches = if !measures.is_empty() {
        state
            .engine
            .find_for_profile(&request.profile, &measures, request.estimated_cost)
    } else if let Some(property) = request.property {
        let context = PropertyContext::for_property_type(
            property.property_type.as_deref().unwrap_or_default(),
            property.year_built,
        );
        state
            .engine
            .find_for_property(&request.profile, &context, request.estimated_cost)
    } else {
        state
            .engine
            .find_for_profile(&request.profile, &[], request.estimated_cost)
    };

    let summary = if request.include_summary {
        Some(
            state
                .summaries
                .match_summary(&matches, request.profile.language)
                .await,
        )
    } else {
        None
    };

    Ok(Json(MatchResponse {
        count: matches.len(),
        matches,
        summary,
    }))
}
