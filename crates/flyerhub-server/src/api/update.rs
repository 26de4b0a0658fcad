use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use flyerhub_core::StoreKey;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct UpdateSummary {
    pub message: &'static str,
    /// Records persisted per store, including invalid ones.
    pub counts: BTreeMap<&'static str, usize>,
}

/// Runs the full scrape-and-persist pipeline synchronously. Concurrent
/// callers queue behind the run lock inside the runner; a store failing
/// mid-run is logged there and does not fail the request.
pub(super) async fn update_data(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<UpdateSummary>>, ApiError> {
    let collection = flyerhub_scraper::run_update(&state.config)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "flyer update failed");
            ApiError::new(req_id.0.clone(), "internal_error", format!("flyer update failed: {e}"))
        })?;

    let counts = StoreKey::ALL
        .into_iter()
        .map(|store| (store.as_str(), collection.records(store).len()))
        .collect();

    Ok(Json(ApiResponse {
        data: UpdateSummary {
            message: "flyer data updated",
            counts,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
