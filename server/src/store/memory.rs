//! In-process [`RemoteStore`], used when no database is configured and by tests.
//!
//! Behaves like the Postgres store: rows are idempotent on `client_ref`,
//! the closet is returned newest first, and profile writes upsert. Failure
//! can be injected with [`MemoryStore::set_failing`].

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use uuid::Uuid;

use super::{ClosetRow, NewClosetRow, ProfileField, ProfileRow, RemoteStore, StoreError};

#[derive(Default)]
struct Inner {
    /// Oldest first; reversed on fetch.
    items: Vec<ClosetRow>,
    profile: Option<ProfileRow>,
}

pub struct MemoryStore {
    user_id: Option<Uuid>,
    inner: Mutex<Inner>,
    failing: AtomicBool,
    insert_calls: AtomicUsize,
}

impl MemoryStore {
    /// A store signed in as `user_id`.
    #[must_use]
    pub fn new(user_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            inner: Mutex::new(Inner::default()),
            failing: AtomicBool::new(false),
            insert_calls: AtomicUsize::new(0),
        }
    }

    /// A store with a fresh random user.
    #[must_use]
    pub fn signed_in() -> Self {
        Self::new(Some(Uuid::new_v4()))
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a profile row.
    pub fn seed_profile(&self, row: ProfileRow) {
        self.lock().profile = Some(row);
    }

    /// Number of `insert_closet_items` calls seen, including failed ones.
    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Current profile row, if any.
    #[must_use]
    pub fn profile_row(&self) -> Option<ProfileRow> {
        self.lock().profile.clone()
    }

    /// Number of stored closet rows.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lock().items.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another caller panicked mid-write;
        // the rows themselves are still consistent.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        if self.user_id.is_none() {
            return Err(StoreError::NotAuthenticated);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::signed_in()
    }
}

#[async_trait::async_trait]
impl RemoteStore for MemoryStore {
    async fn current_user(&self) -> Option<Uuid> {
        self.user_id
    }

    async fn insert_closet_items(&self, items: &[NewClosetRow]) -> Result<Vec<ClosetRow>, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut inner = self.lock();
        let mut out = Vec::with_capacity(items.len());
        // Last item first, so the head of the batch ends up newest.
        for item in items.iter().rev() {
            let existing = inner
                .items
                .iter()
                .find(|row| row.client_ref.as_deref() == Some(item.client_ref.as_str()))
                .cloned();
            let row = existing.unwrap_or_else(|| {
                let row = ClosetRow {
                    id: Uuid::new_v4(),
                    client_ref: Some(item.client_ref.clone()),
                    name: item.name.clone(),
                    category: item.category.clone(),
                    image_url: item.image_url.clone(),
                    color: item.color.clone(),
                    tags: item.tags.clone(),
                    fit: item.fit.clone(),
                };
                inner.items.push(row.clone());
                row
            });
            out.push(row);
        }
        out.reverse();
        Ok(out)
    }

    async fn fetch_closet_items(&self) -> Result<Vec<ClosetRow>, StoreError> {
        self.check()?;
        Ok(self.lock().items.iter().rev().cloned().collect())
    }

    async fn fetch_profile(&self) -> Result<Option<ProfileRow>, StoreError> {
        self.check()?;
        Ok(self.lock().profile.clone())
    }

    async fn update_profile_field(&self, field: ProfileField) -> Result<(), StoreError> {
        self.check()?;
        let mut inner = self.lock();
        let row = inner.profile.get_or_insert_with(|| ProfileRow {
            name: "Guest".into(),
            style_points: 0,
            outfits_created: 0,
            is_premium: false,
            modest_mode: false,
        });
        field.apply(row);
        Ok(())
    }
}
