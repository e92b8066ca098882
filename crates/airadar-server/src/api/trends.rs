use airadar_core::Trend;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub min_score: Option<f64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub unalerted: bool,
}

pub(super) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Vec<Trend>>>, ApiError> {
    if query.min_score.is_some_and(|s| !s.is_finite()) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "min_score must be a finite number",
        ));
    }

    let filter = airadar_db::TrendFilter {
        min_score: query.min_score,
        limit: Some(normalize_limit(query.limit)),
        unalerted: query.unalerted,
    };
    let data = airadar_db::list_trends(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Run one detection cycle now and return its trends.
pub(super) async fn detect_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Trend>>>, ApiError> {
    let data = state.runner.detect().await.map_err(|e| {
        tracing::error!(error = %e, "trend detection failed");
        ApiError::new(req_id.0.clone(), "internal_error", "trend detection failed")
    })?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
