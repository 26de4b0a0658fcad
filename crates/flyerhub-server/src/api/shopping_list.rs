use axum::{
    extract::State,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flyerhub_core::{ShoppingList, ShoppingListEntry};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ListMessage {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    id: Uuid,
}

pub(super) async fn get_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ShoppingList>> {
    Json(ApiResponse {
        data: ShoppingList::load(&state.config.data_dir),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn replace_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<ShoppingList>>, ApiError> {
    // The client owns list state wholesale; anything but an array of
    // entries is a malformed request, not a partial update.
    let Ok(entries) = serde_json::from_value::<Vec<ShoppingListEntry>>(body) else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "expected a JSON array of shopping list entries",
        ));
    };

    let list = ShoppingList(entries);
    list.save(&state.config.data_dir).map_err(|e| {
        tracing::error!(error = %e, "failed to persist shopping list");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to persist shopping list")
    })?;

    Ok(Json(ApiResponse {
        data: list,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_entry(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<ListMessage>>, ApiError> {
    let Ok(DeleteBody { id }) = serde_json::from_value(body) else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "entry id not provided for deletion",
        ));
    };

    let mut list = ShoppingList::load(&state.config.data_dir);
    if !list.remove(id) {
        return Err(ApiError::new(req_id.0, "not_found", "entry not found"));
    }

    list.save(&state.config.data_dir).map_err(|e| {
        tracing::error!(error = %e, "failed to persist shopping list");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to persist shopping list")
    })?;

    Ok(Json(ApiResponse {
        data: ListMessage {
            message: "entry removed",
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn clear_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ListMessage>>, ApiError> {
    ShoppingList::default()
        .save(&state.config.data_dir)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to clear shopping list");
            ApiError::new(req_id.0.clone(), "internal_error", "failed to clear shopping list")
        })?;

    Ok(Json(ApiResponse {
        data: ListMessage {
            message: "shopping list cleared",
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
