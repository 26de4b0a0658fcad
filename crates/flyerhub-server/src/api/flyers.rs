use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use flyerhub_core::{FlyerCollection, StoreKey};

use crate::middleware::RequestId;

use super::{load_collection, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct FlyerQuery {
    pub search: Option<String>,
}

/// Serves the last persisted flyer collection, optionally filtered by a
/// case-insensitive substring match on product names. All four store keys
/// are present in the response either way.
pub(super) async fn get_flyers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FlyerQuery>,
) -> Json<ApiResponse<FlyerCollection>> {
    let collection = load_collection(&state);
    let data = match query.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => filter_by_name(collection, needle),
        _ => collection,
    };

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

fn filter_by_name(collection: FlyerCollection, needle: &str) -> FlyerCollection {
    let needle = needle.to_lowercase();
    let mut filtered = FlyerCollection::default();
    for store in StoreKey::ALL {
        let keep = collection
            .records(store)
            .iter()
            .filter(|r| {
                r.name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        *filtered.records_mut(store) = keep;
    }
    filtered
}
