use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchFoodsRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub success: bool,
    pub foods: Vec<serde_json::Value>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/searchfoods", post(search_foods))
}

#[instrument(skip(state, body))]
pub async fn search_foods(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SearchFoodsRequest>,
) -> Result<Json<SearchFoodsResponse>, ApiError> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(ApiError::InvalidArgument(
            "Search query is required".into(),
        ));
    }

    let foods = state.foods.search_foods(query).await?;
    info!(query, count = foods.len(), "food search");
    Ok(Json(SearchFoodsResponse {
        success: true,
        foods,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let state = AppState::fake();
        let err = search_foods(
            State(state),
            ApiJson(SearchFoodsRequest { query: "  ".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn returns_raw_records_from_the_client() {
        let state = AppState::fake();
        let Json(response) = search_foods(
            State(state),
            ApiJson(SearchFoodsRequest {
                query: "apple".into(),
            }),
        )
        .await
        .unwrap();
        assert!(response.success);
        assert_eq!(response.foods.len(), 1);
        assert_eq!(response.foods[0]["fdcId"], 171_688);
    }
}
