//! HTTP route handlers for Axum.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, instrument};

use crate::{
    api::{
        error::ApiResult,
        types::{CategoryQuery, EntityResponse, TextRequest, TopQuery, TrendsResponse},
    },
    extraction::CategoryRanking,
};

use super::AppState;

#[instrument(skip_all, fields(bytes = request.text.len()))]
pub async fn extract_entities(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> ApiResult<EntityResponse> {
    let entities = state.service.extract(&request.text)?;
    info!(entities = entities.len(), "extracted entities");
    Ok(Json(EntityResponse {
        text: request.text,
        entities,
    }))
}

#[instrument(skip(state))]
pub async fn get_common_entities(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Vec<CategoryRanking>> {
    Ok(Json(state.service.top_entities(query.top_n)))
}

#[instrument(skip_all, fields(items = requests.len()))]
pub async fn batch_extract_entities(
    State(state): State<AppState>,
    Json(requests): Json<Vec<TextRequest>>,
) -> ApiResult<Vec<EntityResponse>> {
    let texts: Vec<&str> = requests.iter().map(|r| r.text.as_str()).collect();
    let results = state.service.batch_extract(&texts)?;
    let responses: Vec<EntityResponse> = requests
        .into_iter()
        .zip(results)
        .map(|(request, entities)| EntityResponse {
            text: request.text,
            entities,
        })
        .collect();
    info!(
        entities = responses.iter().map(|r| r.entities.len()).sum::<usize>(),
        "extracted batch"
    );
    Ok(Json(responses))
}

#[instrument(skip_all, fields(category = %query.category))]
pub async fn category_specific_extraction(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
    Json(request): Json<TextRequest>,
) -> ApiResult<EntityResponse> {
    let entities = state
        .service
        .category_specific_extract(&query.category, &request.text)?;
    info!(entities = entities.len(), "extracted category entities");
    Ok(Json(EntityResponse {
        text: request.text,
        entities,
    }))
}

#[instrument(skip(state))]
pub async fn entity_trends(State(state): State<AppState>) -> ApiResult<TrendsResponse> {
    Ok(Json(TrendsResponse {
        trends: state.service.trends(),
    }))
}
