//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Thin JSON layer over the services in [`crate::services`]. Handlers
//! translate requests into service calls and never wait on remote writes;
//! those settle in background tasks.

pub mod closet;
pub mod profile;
pub mod stylist;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ErrorCode;
use crate::state::AppState;

/// Build the full HTTP router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/closet", get(closet::list_closet).post(closet::add_closet))
        .route("/api/stickers", get(closet::list_stickers))
        .route("/api/profile", get(profile::get_profile))
        .route("/api/profile/points", post(profile::add_points))
        .route("/api/profile/outfits", post(profile::record_outfit))
        .route("/api/profile/premium", post(profile::upgrade))
        .route("/api/profile/modest-mode", put(profile::set_modest_mode))
        .route("/api/stylist/recommend", post(stylist::recommend))
        .route("/api/stylist/packing", post(stylist::packing))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// JSON error body: `{"error": code, "message": text}`.
pub(crate) fn error_response<E: ErrorCode>(status: StatusCode, err: &E) -> Response {
    let body = serde_json::json!({ "error": err.error_code(), "message": err.to_string() });
    (status, Json(body)).into_response()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
