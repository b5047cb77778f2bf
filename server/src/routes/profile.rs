//! Profile and preference routes. Every mutation answers with the updated
//! local snapshot; the remote write settles in the background.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::services::profile::ProfileSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PointsBody {
    pub points: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModestModeBody {
    pub modest_mode: bool,
}

/// `GET /api/profile`
pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileSnapshot> {
    Json(state.profile.snapshot().await)
}

/// `POST /api/profile/points`
pub async fn add_points(State(state): State<AppState>, Json(body): Json<PointsBody>) -> Json<ProfileSnapshot> {
    drop(state.profile.add_style_points(body.points).await);
    Json(state.profile.snapshot().await)
}

/// `POST /api/profile/outfits`: one more outfit saved.
pub async fn record_outfit(State(state): State<AppState>) -> Json<ProfileSnapshot> {
    drop(state.profile.record_outfit().await);
    Json(state.profile.snapshot().await)
}

/// `POST /api/profile/premium`
pub async fn upgrade(State(state): State<AppState>) -> Json<ProfileSnapshot> {
    drop(state.profile.upgrade_to_premium().await);
    Json(state.profile.snapshot().await)
}

/// `PUT /api/profile/modest-mode`
pub async fn set_modest_mode(State(state): State<AppState>, Json(body): Json<ModestModeBody>) -> Json<ProfileSnapshot> {
    drop(state.profile.set_modest_mode(body.modest_mode).await);
    Json(state.profile.snapshot().await)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
