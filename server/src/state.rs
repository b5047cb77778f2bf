//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It is
//! the single explicit container for the closet, profile, sticker set, and
//! stylist; every mutation goes through a named service method.

use std::sync::Arc;

use tracing::info;

use crate::config::SyncPolicy;
use crate::llm::LlmChat;
use crate::model::{StickerItem, seed_stickers};
use crate::services::catalog::Catalog;
use crate::services::profile::{ProfileService, ProfileSnapshot};
use crate::services::stylist::{Stylist, StylistConfig};
use crate::store::RemoteStore;

/// Clone is required by Axum; all inner fields are Arc-backed.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
    pub catalog: Catalog,
    pub profile: ProfileService,
    /// Read-only, seeded once.
    pub stickers: Arc<[StickerItem]>,
    pub stylist: Stylist,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn RemoteStore>,
        llm: Option<Arc<dyn LlmChat>>,
        sync: SyncPolicy,
        stylist: StylistConfig,
    ) -> Self {
        Self {
            catalog: Catalog::new(Arc::clone(&store), sync),
            profile: ProfileService::new(Arc::clone(&store), sync.timeout),
            stickers: seed_stickers().into(),
            stylist: Stylist::new(llm, stylist),
            store,
        }
    }

    /// Fetch closet and profile in one pass. Failures degrade to empty and
    /// default state inside each service.
    pub async fn load(&self) -> (usize, ProfileSnapshot) {
        let user = self.store.current_user().await;
        let (items, profile) = tokio::join!(self.catalog.load(), self.profile.load());
        info!(
            user = ?user,
            items,
            premium = profile.profile.is_premium,
            modest = profile.preferences.modest_mode,
            "initial load complete"
        );
        (items, profile)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
