use axum::{
    extract::{Path, State},
    Extension, Json,
};
use base64::Engine as _;
use qrcode::{render::svg, QrCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ShareRequest {
    #[serde(rename = "listContent")]
    pub list_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ShareLink {
    /// SVG QR code as a base64 data URI, ready for an `<img>` tag.
    #[serde(rename = "qrCode")]
    pub qr_code: String,
    #[serde(rename = "listUrl")]
    pub list_url: String,
}

/// Stores the posted list text under a fresh id and answers with a QR code
/// pointing at its share page. Links expire after the configured TTL.
pub(super) async fn create_share_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ShareRequest>,
) -> Result<Json<ApiResponse<ShareLink>>, ApiError> {
    let content = match body.list_content.map(|c| c.trim().to_owned()) {
        Some(c) if !c.is_empty() => c,
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "bad_request",
                "no list content provided",
            ));
        }
    };

    let id = state.share_links.insert(content);
    let list_url = format!(
        "{}/list/{id}",
        state.config.public_base_url.trim_end_matches('/')
    );

    let code = QrCode::new(list_url.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "QR code generation failed");
        ApiError::new(req_id.0.clone(), "internal_error", "QR code generation failed")
    })?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(240, 240)
        .build();
    let qr_code = format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(image)
    );

    tracing::info!(%id, "share link created");
    Ok(Json(ApiResponse {
        data: ShareLink { qr_code, list_url },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Plain-text share page; 404 once the link has expired or never existed.
pub(super) async fn list_page(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(list_id): Path<Uuid>,
) -> Result<String, ApiError> {
    state.share_links.get(list_id).ok_or_else(|| {
        ApiError::new(
            req_id.0,
            "not_found",
            "shopping list not found or has expired",
        )
    })
}
