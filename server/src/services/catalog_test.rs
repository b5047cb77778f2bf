use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;

use super::*;
use crate::store::memory::MemoryStore;
use crate::store::{ProfileField, ProfileRow};

// =============================================================================
// helpers
// =============================================================================

fn fast_policy(retries: usize) -> SyncPolicy {
    SyncPolicy { timeout: Duration::from_secs(5), retries, retry_base: Duration::ZERO }
}

fn draft(name: &str, fit: Option<Fit>) -> DraftItem {
    DraftItem {
        name: name.into(),
        category: "Tops".into(),
        image_url: format!("https://img.test/{name}.png"),
        color: "Black".into(),
        tags: BTreeSet::from(["basic".to_string()]),
        fit,
    }
}

fn items(names: &[&str]) -> Vec<CatalogItem> {
    items_from_drafts(names.iter().map(|n| draft(n, Some(Fit::Regular))).collect()).unwrap()
}

/// Delegates to a `MemoryStore`; tweaks insert behaviour per test.
struct ScriptedStore {
    inner: MemoryStore,
    /// Insert waits for a permit before touching the inner store.
    gate: Option<Semaphore>,
    /// Confirm only the first N rows of each batch.
    confirm_limit: Option<usize>,
    /// Write through on the first call, then report failure anyway.
    lose_first_ack: AtomicBool,
    /// Sleep this long inside every insert.
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::signed_in(),
            gate: None,
            confirm_limit: None,
            lose_first_ack: AtomicBool::new(false),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl RemoteStore for ScriptedStore {
    async fn current_user(&self) -> Option<Uuid> {
        self.inner.current_user().await
    }

    async fn insert_closet_items(&self, items: &[NewClosetRow]) -> Result<Vec<ClosetRow>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut rows = self.inner.insert_closet_items(items).await?;
        if self.lose_first_ack.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset after commit".into()));
        }
        if let Some(limit) = self.confirm_limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn fetch_closet_items(&self) -> Result<Vec<ClosetRow>, StoreError> {
        self.inner.fetch_closet_items().await
    }

    async fn fetch_profile(&self) -> Result<Option<ProfileRow>, StoreError> {
        self.inner.fetch_profile().await
    }

    async fn update_profile_field(&self, field: ProfileField) -> Result<(), StoreError> {
        self.inner.update_profile_field(field).await
    }
}

// =============================================================================
// drafts
// =============================================================================

#[test]
fn draft_without_fit_is_refused() {
    let err = items_from_drafts(vec![draft("Tee", Some(Fit::Tight)), draft("Skirt", None)]).unwrap_err();
    assert_eq!(err, DraftError::MissingFit { index: 1 });
    assert_eq!(err.error_code(), "E_MISSING_FIT");
}

#[test]
fn draft_with_blank_name_is_refused() {
    let err = items_from_drafts(vec![draft("   ", Some(Fit::Loose))]).unwrap_err();
    assert_eq!(err, DraftError::EmptyName { index: 0 });
}

#[test]
fn empty_draft_batch_is_refused() {
    assert_eq!(items_from_drafts(Vec::new()).unwrap_err(), DraftError::EmptyBatch);
}

#[test]
fn valid_drafts_get_distinct_temp_ids() {
    let out = items(&["Tee", "Jeans"]);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|i| i.id.starts_with(TEMP_ID_PREFIX)));
    assert_ne!(out[0].id, out[1].id);
    assert_eq!(out[0].fit, Fit::Regular);
}

#[test]
fn draft_name_is_trimmed() {
    let item = draft("  Linen Shirt ", Some(Fit::Loose)).into_item(0).unwrap();
    assert_eq!(item.name, "Linen Shirt");
}

#[test]
fn entry_json_flattens_item() {
    let entry = CatalogEntry { item: items(&["Tee"]).remove(0), sync: SyncState::Pending };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["name"], "Tee");
    assert_eq!(json["sync"], "pending");
    assert!(json["imageUrl"].is_string());
}

// =============================================================================
// load
// =============================================================================

#[tokio::test]
async fn load_reads_remote_newest_first() {
    let store = Arc::new(MemoryStore::signed_in());
    let rows: Vec<NewClosetRow> = items(&["Old", "New"]).iter().map(NewClosetRow::from).collect();
    store.insert_closet_items(&rows[..1]).await.unwrap();
    store.insert_closet_items(&rows[1..]).await.unwrap();

    let catalog = Catalog::new(store, fast_policy(0));
    assert_eq!(catalog.load().await, 2);
    let entries = catalog.entries().await;
    assert_eq!(entries[0].item.name, "New");
    assert_eq!(entries[1].item.name, "Old");
    assert!(entries.iter().all(|e| e.sync == SyncState::Confirmed));
}

#[tokio::test]
async fn load_failure_falls_back_to_empty() {
    let store = Arc::new(MemoryStore::signed_in());
    store
        .insert_closet_items(&[NewClosetRow::from(&items(&["Tee"])[0])])
        .await
        .unwrap();
    store.set_failing(true);

    let catalog = Catalog::new(store, fast_policy(0));
    assert_eq!(catalog.load().await, 0);
    assert!(catalog.is_empty().await);
}

#[tokio::test]
async fn load_signed_out_falls_back_to_empty() {
    let catalog = Catalog::new(Arc::new(MemoryStore::new(None)), fast_policy(0));
    assert_eq!(catalog.load().await, 0);
}

// =============================================================================
// add_items
// =============================================================================

#[tokio::test]
async fn add_items_is_visible_before_remote_settles() {
    let mut scripted = ScriptedStore::new();
    scripted.gate = Some(Semaphore::new(0));
    let store = Arc::new(scripted);
    let catalog = Catalog::new(store.clone(), fast_policy(0));

    let batch = items(&["Tee", "Jeans"]);
    let temp_ids: Vec<String> = batch.iter().map(|i| i.id.clone()).collect();
    let handle = catalog.add_items(batch).await;

    let entries = catalog.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].item.id, temp_ids[0]);
    assert_eq!(entries[1].item.id, temp_ids[1]);
    assert!(entries.iter().all(|e| e.sync == SyncState::Pending));

    if let Some(gate) = &store.gate {
        gate.add_permits(1);
    }
    let report = handle.await.unwrap();
    assert_eq!(report, SyncReport { confirmed: 2, unconfirmed: 0 });
}

#[tokio::test]
async fn confirmed_ids_replace_temp_ids_in_place() {
    let store = Arc::new(MemoryStore::signed_in());
    store
        .insert_closet_items(&[NewClosetRow::from(&items(&["Existing"])[0])])
        .await
        .unwrap();
    let catalog = Catalog::new(store.clone(), fast_policy(0));
    catalog.load().await;

    let batch = items(&["A", "B"]);
    let temp_ids: Vec<String> = batch.iter().map(|i| i.id.clone()).collect();
    let report = catalog.add_items(batch).await.await.unwrap();
    assert_eq!(report.confirmed, 2);

    let entries = catalog.entries().await;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].item.name, "A");
    assert_eq!(entries[1].item.name, "B");
    assert_eq!(entries[2].item.name, "Existing");
    for entry in &entries[..2] {
        assert_eq!(entry.sync, SyncState::Confirmed);
        assert!(!temp_ids.contains(&entry.item.id));
        assert!(Uuid::parse_str(&entry.item.id).is_ok());
    }
    assert_eq!(store.item_count(), 3);
}

#[tokio::test]
async fn reload_keeps_the_optimistic_order() {
    let store = Arc::new(MemoryStore::signed_in());
    let catalog = Catalog::new(store.clone(), fast_policy(0));
    catalog.add_items(items(&["A", "B"])).await.await.unwrap();
    catalog.add_items(items(&["C"])).await.await.unwrap();
    let before: Vec<String> = catalog.snapshot().await.into_iter().map(|i| i.name).collect();
    assert_eq!(before, vec!["C", "A", "B"]);

    let reloaded = Catalog::new(store, fast_policy(0));
    reloaded.load().await;
    let after: Vec<String> = reloaded.snapshot().await.into_iter().map(|i| i.name).collect();
    assert_eq!(after, before);
}

#[tokio::test]
async fn failed_insert_leaves_unconfirmed_entries() {
    let store = Arc::new(MemoryStore::signed_in());
    store.set_failing(true);
    let catalog = Catalog::new(store.clone(), fast_policy(2));

    let batch = items(&["Tee", "Jeans"]);
    let temp_ids: Vec<String> = batch.iter().map(|i| i.id.clone()).collect();
    let report = catalog.add_items(batch).await.await.unwrap();
    assert_eq!(report, SyncReport { confirmed: 0, unconfirmed: 2 });
    assert_eq!(store.insert_calls(), 3);

    let unconfirmed = catalog.unconfirmed().await;
    assert_eq!(unconfirmed.len(), 2);
    assert_eq!(unconfirmed[0].item.id, temp_ids[0]);
    assert_eq!(catalog.len().await, 2);
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let store = Arc::new(MemoryStore::new(None));
    let catalog = Catalog::new(store.clone(), fast_policy(3));
    let report = catalog.add_items(items(&["Tee"])).await.await.unwrap();
    assert_eq!(report.unconfirmed, 1);
    assert_eq!(store.insert_calls(), 1);
}

#[tokio::test]
async fn retry_after_lost_ack_does_not_duplicate() {
    let scripted = ScriptedStore::new();
    scripted.lose_first_ack.store(true, Ordering::SeqCst);
    let store = Arc::new(scripted);
    let catalog = Catalog::new(store.clone(), fast_policy(1));

    let report = catalog.add_items(items(&["Tee", "Jeans"])).await.await.unwrap();
    assert_eq!(report, SyncReport { confirmed: 2, unconfirmed: 0 });
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.inner.item_count(), 2);
}

#[tokio::test]
async fn partial_confirmation_marks_the_rest_unconfirmed() {
    let mut scripted = ScriptedStore::new();
    scripted.confirm_limit = Some(1);
    let catalog = Catalog::new(Arc::new(scripted), fast_policy(0));

    let report = catalog.add_items(items(&["Tee", "Jeans"])).await.await.unwrap();
    assert_eq!(report, SyncReport { confirmed: 1, unconfirmed: 1 });

    let entries = catalog.entries().await;
    assert_eq!(entries[0].sync, SyncState::Confirmed);
    assert_eq!(entries[1].sync, SyncState::Unconfirmed);
    assert!(entries[1].item.id.starts_with(TEMP_ID_PREFIX));
}

#[tokio::test]
async fn slow_remote_times_out_as_unconfirmed() {
    let mut scripted = ScriptedStore::new();
    scripted.delay = Some(Duration::from_secs(2));
    let policy = SyncPolicy { timeout: Duration::from_millis(20), retries: 0, retry_base: Duration::ZERO };
    let catalog = Catalog::new(Arc::new(scripted), policy);

    let report = catalog.add_items(items(&["Tee"])).await.await.unwrap();
    assert_eq!(report.unconfirmed, 1);
    assert_eq!(catalog.unconfirmed().await.len(), 1);
}

#[tokio::test]
async fn snapshot_returns_plain_items_newest_first() {
    let catalog = Catalog::new(Arc::new(MemoryStore::signed_in()), fast_policy(0));
    catalog.add_items(items(&["First"])).await.await.unwrap();
    catalog.add_items(items(&["Second"])).await.await.unwrap();
    let names: Vec<String> = catalog.snapshot().await.into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["Second".to_string(), "First".to_string()]);
}

// =============================================================================
// reconcile
// =============================================================================

#[test]
fn reconcile_ignores_entries_outside_the_batch() {
    let mut batch = items(&["A"]);
    let other = items(&["Other"]).remove(0);
    let rows: Vec<NewClosetRow> = batch.iter().map(NewClosetRow::from).collect();
    let mut entries = vec![
        CatalogEntry { item: batch.remove(0), sync: SyncState::Pending },
        CatalogEntry { item: other.clone(), sync: SyncState::Pending },
    ];

    let report = reconcile(&mut entries, &rows, Err(StoreError::NotAuthenticated));
    assert_eq!(report, SyncReport { confirmed: 0, unconfirmed: 1 });
    assert_eq!(entries[0].sync, SyncState::Unconfirmed);
    assert_eq!(entries[1].sync, SyncState::Pending);
    assert_eq!(entries[1].item, other);
}
