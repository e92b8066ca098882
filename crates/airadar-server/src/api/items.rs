use std::collections::BTreeMap;

use airadar_core::{Item, SourceType};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ItemsQuery {
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub since_hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct StatsData {
    total_items: i64,
    by_source: BTreeMap<SourceType, i64>,
}

pub(super) async fn list_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<ApiResponse<Vec<Item>>>, ApiError> {
    let source = match query.source.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<SourceType>().map_err(|e| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?),
    };

    let since = match query.since_hours {
        None => None,
        Some(hours) if hours > 0 => Some(Utc::now() - Duration::hours(hours)),
        Some(_) => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "since_hours must be positive",
            ))
        }
    };

    let filter = airadar_db::ListItemsFilter {
        source,
        since,
        limit: Some(normalize_limit(query.limit)),
    };
    let data = airadar_db::list_items(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatsData>>, ApiError> {
    let by_source = airadar_db::count_items_by_source(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StatsData {
            total_items: by_source.values().sum(),
            by_source,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
