mod flyers;
mod share;
mod shopping_list;
mod update;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use flyerhub_core::{AppConfig, FlyerCollection, FLYERS_FILE};

use crate::middleware::{request_id, RequestId};
use crate::share_store::ShareLinkStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub share_links: ShareLinkStore,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    flyer_data: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/flyers", get(flyers::get_flyers))
        .route(
            "/api/shopping-list",
            get(shopping_list::get_list)
                .post(shopping_list::replace_list)
                .delete(shopping_list::delete_entry),
        )
        .route("/api/shopping-list/clear", post(shopping_list::clear_list))
        .route("/api/share-links", post(share::create_share_link))
        .route("/list/{list_id}", get(share::list_page))
        .route("/api/update-data", post(update::update_data))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let flyer_data = if state.config.data_dir.join(FLYERS_FILE).is_file() {
        "present"
    } else {
        "missing"
    };
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                flyer_data,
            },
            meta,
        }),
    )
}

/// Loads the last persisted collection for read handlers. Missing or
/// corrupt data serves as empty rather than failing the request.
pub(super) fn load_collection(state: &AppState) -> FlyerCollection {
    FlyerCollection::load(&state.config.data_dir)
}
