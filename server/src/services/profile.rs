//! Profile service: identity, gamification counters, premium flag, and
//! preferences.
//!
//! Every mutation updates local state under the write lock, then spawns the
//! matching single-column remote write and hands back its join handle. A
//! failed remote write is logged and otherwise ignored; local state is never
//! rolled back.
//!
//! Remote writes for one service run one at a time, and each sends the
//! column's local value as of the moment it runs, so the last write to land
//! always carries the newest value.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::model::{Preferences, UserProfile};
use crate::store::{ProfileField, RemoteStore, with_timeout};

/// Features behind the premium tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    TravelPacking,
}

/// Outcome of a premium gate check. Never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Granted,
    UpgradeRequired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub profile: UserProfile,
    pub preferences: Preferences,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn RemoteStore>,
    state: Arc<RwLock<ProfileSnapshot>>,
    /// Serializes remote writes.
    writes: Arc<Mutex<()>>,
    timeout: Duration,
}

impl ProfileService {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(ProfileSnapshot::default())),
            writes: Arc::new(Mutex::new(())),
            timeout,
        }
    }

    /// Load the profile row. A missing row or any failure leaves defaults.
    pub async fn load(&self) -> ProfileSnapshot {
        let snapshot = match with_timeout(self.timeout, self.store.fetch_profile()).await {
            Ok(Some(row)) => {
                let (profile, preferences) = row.into_parts();
                ProfileSnapshot { profile, preferences }
            }
            Ok(None) => {
                info!("no profile row yet; using defaults");
                ProfileSnapshot::default()
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "profile fetch failed; using defaults");
                ProfileSnapshot::default()
            }
        };
        *self.state.write().await = snapshot.clone();
        snapshot
    }

    pub async fn snapshot(&self) -> ProfileSnapshot {
        self.state.read().await.clone()
    }

    pub async fn add_style_points(&self, points: u64) -> JoinHandle<()> {
        let total = {
            let mut state = self.state.write().await;
            state.profile.style_points = state.profile.style_points.saturating_add(points);
            state.profile.style_points
        };
        self.push(ProfileField::StylePoints(total))
    }

    pub async fn record_outfit(&self) -> JoinHandle<()> {
        let total = {
            let mut state = self.state.write().await;
            state.profile.outfits_created = state.profile.outfits_created.saturating_add(1);
            state.profile.outfits_created
        };
        self.push(ProfileField::OutfitsCreated(total))
    }

    pub async fn upgrade_to_premium(&self) -> JoinHandle<()> {
        self.state.write().await.profile.is_premium = true;
        self.push(ProfileField::IsPremium(true))
    }

    pub async fn set_modest_mode(&self, on: bool) -> JoinHandle<()> {
        self.state.write().await.preferences.modest_mode = on;
        self.push(ProfileField::ModestMode(on))
    }

    pub async fn toggle_modest_mode(&self) -> JoinHandle<()> {
        let on = {
            let mut state = self.state.write().await;
            state.preferences.modest_mode = !state.preferences.modest_mode;
            state.preferences.modest_mode
        };
        self.push(ProfileField::ModestMode(on))
    }

    pub async fn require_premium(&self, feature: Feature) -> Access {
        if self.state.read().await.profile.is_premium {
            Access::Granted
        } else {
            info!(?feature, "premium feature requested by free user");
            Access::UpgradeRequired
        }
    }

    fn push(&self, field: ProfileField) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let writes = Arc::clone(&self.writes);
        let timeout = self.timeout;
        tokio::spawn(async move {
            let _serial = writes.lock().await;
            let field = latest(field, &*state.read().await);
            if let Err(e) = with_timeout(timeout, store.update_profile_field(field)).await {
                warn!(column = field.column(), error = %e, code = e.error_code(), "profile write failed; local state kept");
            }
        })
    }
}

/// The same column, carrying its current local value.
fn latest(field: ProfileField, snapshot: &ProfileSnapshot) -> ProfileField {
    match field {
        ProfileField::StylePoints(_) => ProfileField::StylePoints(snapshot.profile.style_points),
        ProfileField::OutfitsCreated(_) => ProfileField::OutfitsCreated(snapshot.profile.outfits_created),
        ProfileField::IsPremium(_) => ProfileField::IsPremium(snapshot.profile.is_premium),
        ProfileField::ModestMode(_) => ProfileField::ModestMode(snapshot.preferences.modest_mode),
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
