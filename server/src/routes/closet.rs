//! Closet and sticker routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::error_response;
use crate::model::StickerItem;
use crate::services::catalog::{self, CatalogEntry, DraftItem, SyncState};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddClosetBody {
    pub items: Vec<DraftItem>,
}

/// `GET /api/closet`: entries newest first, with sync state.
pub async fn list_closet(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog.entries().await)
}

/// `POST /api/closet`: validate drafts, add optimistically, sync in the
/// background. Answers 202 with the pending entries.
pub async fn add_closet(State(state): State<AppState>, Json(body): Json<AddClosetBody>) -> Response {
    let items = match catalog::items_from_drafts(body.items) {
        Ok(items) => items,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let pending: Vec<CatalogEntry> = items
        .iter()
        .map(|item| CatalogEntry { item: item.clone(), sync: SyncState::Pending })
        .collect();

    // Detached; the task reconciles catalog state on its own.
    drop(state.catalog.add_items(items).await);

    (StatusCode::ACCEPTED, Json(pending)).into_response()
}

/// `GET /api/stickers`: the seeded sticker set.
pub async fn list_stickers(State(state): State<AppState>) -> Json<Vec<StickerItem>> {
    Json(state.stickers.to_vec())
}

#[cfg(test)]
#[path = "closet_test.rs"]
mod tests;
