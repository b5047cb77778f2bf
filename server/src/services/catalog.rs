//! Catalog service: the local closet plus its optimistic remote sync.
//!
//! DESIGN
//! ======
//! `add_items` is a two-phase commit-lite. New items are prepended to the
//! local list immediately under their temporary ids and tagged
//! [`SyncState::Pending`]. A spawned task submits the batch to the
//! [`RemoteStore`]; when it settles, every pending entry of the batch is
//! replaced in place in a single write-lock section, either with the
//! server-confirmed item or with the same item tagged
//! [`SyncState::Unconfirmed`].
//!
//! ERROR HANDLING
//! ==============
//! Remote failures are logged, never returned. The insert is retried with
//! linear back-off while the error is retryable; the temporary id doubles as
//! the idempotency key so a retry after a lost acknowledgement cannot
//! duplicate rows. Draft validation is the only error a caller sees.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SyncPolicy;
use crate::error::ErrorCode;
use crate::model::{CatalogItem, Fit};
use crate::store::{ClosetRow, NewClosetRow, RemoteStore, StoreError, with_timeout};

/// Prefix for client-generated temporary ids.
pub const TEMP_ID_PREFIX: &str = "tmp-";

// =============================================================================
// TYPES
// =============================================================================

/// Where an entry stands relative to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Submitted, not yet settled.
    Pending,
    /// Carries a server-issued id.
    Confirmed,
    /// The remote write failed. Terminal.
    Unconfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub sync: SyncState,
}

/// Result of one settled sync batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub confirmed: usize,
    pub unconfirmed: usize,
}

/// A closet item as entered by the user, before it gets an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub color: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Required before the draft can be saved.
    pub fit: Option<Fit>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("draft {index} has no fit selected")]
    MissingFit { index: usize },
    #[error("draft {index} has an empty name")]
    EmptyName { index: usize },
    #[error("no drafts submitted")]
    EmptyBatch,
}

impl ErrorCode for DraftError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFit { .. } => "E_MISSING_FIT",
            Self::EmptyName { .. } => "E_EMPTY_NAME",
            Self::EmptyBatch => "E_EMPTY_BATCH",
        }
    }
}

impl DraftItem {
    /// Turn a draft into an item with a fresh temporary id.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] when the name is blank or no fit is selected.
    pub fn into_item(self, index: usize) -> Result<CatalogItem, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName { index });
        }
        let fit = self.fit.ok_or(DraftError::MissingFit { index })?;
        Ok(CatalogItem {
            id: temp_id(),
            name: name.to_owned(),
            category: self.category,
            image_url: self.image_url,
            color: self.color,
            tags: self.tags,
            fit,
        })
    }
}

/// Validate a whole batch. Either every draft converts or nothing does.
///
/// # Errors
///
/// Returns the first [`DraftError`] found, or `EmptyBatch` for no drafts.
pub fn items_from_drafts(drafts: Vec<DraftItem>) -> Result<Vec<CatalogItem>, DraftError> {
    if drafts.is_empty() {
        return Err(DraftError::EmptyBatch);
    }
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| draft.into_item(index))
        .collect()
}

#[must_use]
pub fn temp_id() -> String {
    format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4())
}

// =============================================================================
// SERVICE
// =============================================================================

/// The user's closet. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn RemoteStore>,
    entries: Arc<RwLock<Vec<CatalogEntry>>>,
    policy: SyncPolicy,
}

impl Catalog {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, policy: SyncPolicy) -> Self {
        Self { store, entries: Arc::new(RwLock::new(Vec::new())), policy }
    }

    /// Replace local state with the remote closet. Any failure leaves the
    /// catalog empty. Returns the number of items loaded.
    pub async fn load(&self) -> usize {
        let items = match with_timeout(self.policy.timeout, self.store.fetch_closet_items()).await {
            Ok(rows) => rows_to_items(rows),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "closet fetch failed; starting with empty catalog");
                Vec::new()
            }
        };
        let count = items.len();
        *self.entries.write().await = items
            .into_iter()
            .map(|item| CatalogEntry { item, sync: SyncState::Confirmed })
            .collect();
        info!(count, "catalog loaded");
        count
    }

    /// Optimistically prepend `items` and sync them in the background.
    ///
    /// Items must carry client-generated temporary ids. The returned handle
    /// resolves once the batch has settled.
    pub async fn add_items(&self, items: Vec<CatalogItem>) -> JoinHandle<SyncReport> {
        let rows: Vec<NewClosetRow> = items.iter().map(NewClosetRow::from).collect();
        {
            let mut entries = self.entries.write().await;
            let older = std::mem::take(&mut *entries);
            entries.extend(
                items
                    .into_iter()
                    .map(|item| CatalogEntry { item, sync: SyncState::Pending }),
            );
            entries.extend(older);
        }

        let store = Arc::clone(&self.store);
        let entries = Arc::clone(&self.entries);
        let policy = self.policy;
        tokio::spawn(async move {
            let outcome = insert_with_retry(store.as_ref(), &rows, policy).await;
            let mut entries = entries.write().await;
            reconcile(&mut entries, &rows, outcome)
        })
    }

    /// All entries, newest first, with their sync state.
    pub async fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.read().await.clone()
    }

    /// Plain item list, newest first.
    pub async fn snapshot(&self) -> Vec<CatalogItem> {
        self.entries.read().await.iter().map(|e| e.item.clone()).collect()
    }

    /// Entries whose remote write failed.
    pub async fn unconfirmed(&self) -> Vec<CatalogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.sync == SyncState::Unconfirmed)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// =============================================================================
// SYNC
// =============================================================================

fn rows_to_items(rows: Vec<ClosetRow>) -> Vec<CatalogItem> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            CatalogItem::try_from(row)
                .inspect_err(|e| warn!(%id, error = %e, "skipping unreadable closet row"))
                .ok()
        })
        .collect()
}

async fn insert_with_retry(
    store: &dyn RemoteStore,
    rows: &[NewClosetRow],
    policy: SyncPolicy,
) -> Result<Vec<ClosetRow>, StoreError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match with_timeout(policy.timeout, store.insert_closet_items(rows)).await {
            Ok(confirmed) => return Ok(confirmed),
            Err(e) if e.retryable() && attempt <= policy.retries => {
                warn!(
                    error = %e,
                    attempt,
                    total = policy.retries + 1,
                    count = rows.len(),
                    "closet insert failed; retrying"
                );
                let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
                tokio::time::sleep(policy.retry_base.saturating_mul(factor)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Settle one submitted batch in place. Only entries still pending under a
/// temporary id from `submitted` are touched, so their positions survive.
fn reconcile(
    entries: &mut [CatalogEntry],
    submitted: &[NewClosetRow],
    outcome: Result<Vec<ClosetRow>, StoreError>,
) -> SyncReport {
    let mut confirmed_by_ref: HashMap<String, CatalogItem> = HashMap::new();
    match outcome {
        Ok(rows) => {
            for row in rows {
                let Some(client_ref) = row.client_ref.clone() else {
                    warn!(id = %row.id, "confirmed row has no client_ref; cannot match");
                    continue;
                };
                match CatalogItem::try_from(row) {
                    Ok(item) => {
                        confirmed_by_ref.insert(client_ref, item);
                    }
                    Err(e) => warn!(%client_ref, error = %e, "confirmed row unreadable"),
                }
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                code = e.error_code(),
                count = submitted.len(),
                "closet insert failed; keeping optimistic entries as unconfirmed"
            );
        }
    }

    let mut report = SyncReport::default();
    for row in submitted {
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.sync == SyncState::Pending && e.item.id == row.client_ref)
        else {
            continue;
        };
        if let Some(item) = confirmed_by_ref.remove(&row.client_ref) {
            *entry = CatalogEntry { item, sync: SyncState::Confirmed };
            report.confirmed += 1;
        } else {
            entry.sync = SyncState::Unconfirmed;
            report.unconfirmed += 1;
        }
    }

    if report.unconfirmed > 0 {
        warn!(confirmed = report.confirmed, unconfirmed = report.unconfirmed, "closet sync settled with drift");
    } else {
        info!(confirmed = report.confirmed, "closet sync confirmed");
    }
    report
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
