//! Stylist routes: outfit recommendation and the premium packing list.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::error::ErrorCode;
use crate::services::profile::{Access, Feature};
use crate::state::AppState;

/// Longest trip the packing list accepts.
pub const MAX_TRIP_DAYS: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum StylistRequestError {
    #[error("query is empty")]
    EmptyQuery,
    #[error("destination is empty")]
    EmptyDestination,
    #[error("days must be between 1 and {MAX_TRIP_DAYS}")]
    InvalidDays,
}

impl ErrorCode for StylistRequestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "E_EMPTY_QUERY",
            Self::EmptyDestination => "E_EMPTY_DESTINATION",
            Self::InvalidDays => "E_INVALID_DAYS",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendBody {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct PackingBody {
    pub destination: String,
    pub days: u32,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackingResponse {
    Ok { text: String },
    UpgradeRequired,
}

/// `POST /api/stylist/recommend`: uses the current closet and modest-mode
/// preference. Gateway failures come back as the fallback recommendation.
pub async fn recommend(State(state): State<AppState>, Json(body): Json<RecommendBody>) -> Response {
    let query = body.query.trim();
    if query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, &StylistRequestError::EmptyQuery);
    }
    let catalog = state.catalog.snapshot().await;
    let modest = state.profile.snapshot().await.preferences.modest_mode;
    Json(state.stylist.recommend(query, &catalog, modest).await).into_response()
}

/// `POST /api/stylist/packing`: premium only. Free users get
/// `{"status":"upgrade_required"}`, not an error, even for invalid input.
pub async fn packing(State(state): State<AppState>, Json(body): Json<PackingBody>) -> Response {
    // Gate first: a free user sees the upgrade prompt whatever the input.
    if state.profile.require_premium(Feature::TravelPacking).await == Access::UpgradeRequired {
        return Json(PackingResponse::UpgradeRequired).into_response();
    }
    let destination = body.destination.trim();
    if destination.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, &StylistRequestError::EmptyDestination);
    }
    if !(1..=MAX_TRIP_DAYS).contains(&body.days) {
        return error_response(StatusCode::BAD_REQUEST, &StylistRequestError::InvalidDays);
    }

    let catalog = state.catalog.snapshot().await;
    let modest = state.profile.snapshot().await.preferences.modest_mode;
    let text = state
        .stylist
        .packing_list(destination, body.days, &catalog, modest)
        .await;
    Json(PackingResponse::Ok { text }).into_response()
}

#[cfg(test)]
#[path = "stylist_test.rs"]
mod tests;
