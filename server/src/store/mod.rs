//! Remote persistence adapter: CRUD + auth surface behind a trait.
//!
//! DESIGN
//! ======
//! Catalog and profile services talk to the backend only through
//! [`RemoteStore`]. Rows on the wire use snake_case column names
//! (`image_url`, `style_points`); the conversions in this module map them to
//! and from the camelCase domain types in [`crate::model`].
//!
//! Two implementations ship: [`postgres::PgStore`] for production and
//! [`memory::MemoryStore`] for running without a database and for tests.
//!
//! IDEMPOTENCY
//! ===========
//! Every inserted row carries the client's temporary id as `client_ref`.
//! Stores treat a repeated `(user, client_ref)` as the same row, so a
//! retried insert never duplicates closet items.

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::model::{CatalogItem, Fit, Preferences, UserProfile};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Timeout(_) => "E_REMOTE_TIMEOUT",
            Self::Database(_) => "E_DATABASE",
            Self::InvalidRow(_) => "E_INVALID_ROW",
            Self::Unavailable(_) => "E_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Database(_) | Self::Unavailable(_))
    }
}

/// Run a remote call under a deadline. Elapsed deadlines become
/// [`StoreError::Timeout`].
///
/// # Errors
///
/// Returns the call's own error, or `Timeout` if it did not settle in time.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

// =============================================================================
// WIRE ROWS
// =============================================================================

/// A closet item submitted for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClosetRow {
    /// Client-side temporary id, used as the idempotency key.
    pub client_ref: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub color: String,
    pub tags: Vec<String>,
    pub fit: String,
}

impl From<&CatalogItem> for NewClosetRow {
    fn from(item: &CatalogItem) -> Self {
        Self {
            client_ref: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
            color: item.color.clone(),
            tags: item.tags.iter().cloned().collect(),
            fit: item.fit.as_str().to_owned(),
        }
    }
}

/// A closet item as stored remotely, with its server-issued id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClosetRow {
    pub id: Uuid,
    pub client_ref: Option<String>,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub color: String,
    pub tags: Vec<String>,
    pub fit: String,
}

impl TryFrom<ClosetRow> for CatalogItem {
    type Error = StoreError;

    fn try_from(row: ClosetRow) -> Result<Self, Self::Error> {
        let fit = Fit::parse(&row.fit).ok_or_else(|| StoreError::InvalidRow(format!("unknown fit '{}'", row.fit)))?;
        Ok(Self {
            id: row.id.to_string(),
            name: row.name,
            category: row.category,
            image_url: row.image_url,
            color: row.color,
            tags: row.tags.into_iter().collect(),
            fit,
        })
    }
}

/// The profile row, including the preference flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfileRow {
    pub name: String,
    pub style_points: i64,
    pub outfits_created: i64,
    pub is_premium: bool,
    pub modest_mode: bool,
}

impl ProfileRow {
    /// Split into the domain profile and preferences. Negative counters read as zero.
    #[must_use]
    pub fn into_parts(self) -> (UserProfile, Preferences) {
        let profile = UserProfile {
            name: self.name,
            style_points: u64::try_from(self.style_points).unwrap_or(0),
            outfits_created: u64::try_from(self.outfits_created).unwrap_or(0),
            is_premium: self.is_premium,
        };
        (profile, Preferences { modest_mode: self.modest_mode })
    }
}

/// One profile column write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    StylePoints(u64),
    OutfitsCreated(u64),
    IsPremium(bool),
    ModestMode(bool),
}

impl ProfileField {
    /// Column name on the wire.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::StylePoints(_) => "style_points",
            Self::OutfitsCreated(_) => "outfits_created",
            Self::IsPremium(_) => "is_premium",
            Self::ModestMode(_) => "modest_mode",
        }
    }

    /// Apply this write to a row in place.
    pub fn apply(self, row: &mut ProfileRow) {
        match self {
            Self::StylePoints(v) => row.style_points = saturating_i64(v),
            Self::OutfitsCreated(v) => row.outfits_created = saturating_i64(v),
            Self::IsPremium(v) => row.is_premium = v,
            Self::ModestMode(v) => row.modest_mode = v,
        }
    }
}

pub(crate) fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

// =============================================================================
// ADAPTER TRAIT
// =============================================================================

/// Remote CRUD + auth surface consumed by the catalog and profile services.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// The authenticated user, if any.
    async fn current_user(&self) -> Option<Uuid>;

    /// Insert closet items, returning them with server ids in submission order.
    /// The first item of the batch becomes the newest row, so a later
    /// newest-first fetch lists the batch in submission order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if no user is signed in or the write fails.
    async fn insert_closet_items(&self, items: &[NewClosetRow]) -> Result<Vec<ClosetRow>, StoreError>;

    /// Fetch the user's closet, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if no user is signed in or the read fails.
    async fn fetch_closet_items(&self) -> Result<Vec<ClosetRow>, StoreError>;

    /// Fetch the user's profile row, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if no user is signed in or the read fails.
    async fn fetch_profile(&self) -> Result<Option<ProfileRow>, StoreError>;

    /// Write one profile column.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if no user is signed in or the write fails.
    async fn update_profile_field(&self, field: ProfileField) -> Result<(), StoreError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
