use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

use parks_store::query;

use crate::error::AppError;
use crate::AppState;

/// GET /parks/: park name → URL for every park matching the parameters,
/// or an empty 204 when the filter is rejected or the query fails.
pub async fn filter_parks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match query::filter_parks(state.store.as_ref(), &params).await {
        Some(links) => Json(links).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /ajax/{neighborhood}/{activity}/: park summaries as JSON, or `{}`
/// when either slug is unknown.
pub async fn neighborhood_activity(
    State(state): State<Arc<AppState>>,
    Path((neighborhood_slug, activity_slug)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let store = state.store.as_ref();

    let parks = match query::parks_in_neighborhood_with_activity(
        store,
        &neighborhood_slug,
        &activity_slug,
    )
    .await
    {
        Ok((_, _, parks)) => parks,
        Err(e) if e.is_not_found() => {
            debug!(neighborhood = %neighborhood_slug, activity = %activity_slug, "Unknown slug in park feed");
            return Ok(([(header::CONTENT_TYPE, "application/json")], "{}").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let summaries = query::park_summaries(store, &parks).await?;
    Ok(Json(summaries).into_response())
}
