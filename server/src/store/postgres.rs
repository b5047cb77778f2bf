//! Postgres-backed [`RemoteStore`].
//!
//! Rows are scoped to the configured user. Inserts run in one transaction
//! and upsert on `(user_id, client_ref)` so a retried batch returns the
//! rows written by the first attempt. A batch is written back to front so
//! that, read newest first, it comes back in submission order.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ClosetRow, NewClosetRow, ProfileField, ProfileRow, RemoteStore, StoreError, saturating_i64};

const CLOSET_COLUMNS: &str = "id, client_ref, name, category, image_url, color, tags, fit";

pub struct PgStore {
    pool: PgPool,
    user_id: Option<Uuid>,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool, user_id: Option<Uuid>) -> Self {
        Self { pool, user_id }
    }

    fn user(&self) -> Result<Uuid, StoreError> {
        self.user_id.ok_or(StoreError::NotAuthenticated)
    }
}

#[async_trait::async_trait]
impl RemoteStore for PgStore {
    async fn current_user(&self) -> Option<Uuid> {
        self.user_id
    }

    async fn insert_closet_items(&self, items: &[NewClosetRow]) -> Result<Vec<ClosetRow>, StoreError> {
        let user_id = self.user()?;
        let sql = format!(
            "INSERT INTO closet_items (user_id, client_ref, name, category, image_url, color, tags, fit)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id, client_ref) DO UPDATE SET client_ref = EXCLUDED.client_ref
             RETURNING {CLOSET_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(items.len());
        // Last item first: `created_at` then sorts the head of the batch newest.
        for item in items.iter().rev() {
            let row = sqlx::query_as::<_, ClosetRow>(&sql)
                .bind(user_id)
                .bind(&item.client_ref)
                .bind(&item.name)
                .bind(&item.category)
                .bind(&item.image_url)
                .bind(&item.color)
                .bind(&item.tags)
                .bind(&item.fit)
                .fetch_one(tx.as_mut())
                .await?;
            rows.push(row);
        }
        tx.commit().await?;
        rows.reverse();

        info!(%user_id, count = rows.len(), "closet items inserted");
        Ok(rows)
    }

    async fn fetch_closet_items(&self) -> Result<Vec<ClosetRow>, StoreError> {
        let user_id = self.user()?;
        let sql = format!("SELECT {CLOSET_COLUMNS} FROM closet_items WHERE user_id = $1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ClosetRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_profile(&self) -> Result<Option<ProfileRow>, StoreError> {
        let user_id = self.user()?;
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT name, style_points, outfits_created, is_premium, modest_mode FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_profile_field(&self, field: ProfileField) -> Result<(), StoreError> {
        let user_id = self.user()?;
        // Column names come from a closed enum, never from input.
        let column = field.column();
        let sql = format!(
            "INSERT INTO profiles (id, {column}) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET {column} = EXCLUDED.{column}"
        );
        let query = sqlx::query(&sql).bind(user_id);
        let query = match field {
            ProfileField::StylePoints(v) | ProfileField::OutfitsCreated(v) => query.bind(saturating_i64(v)),
            ProfileField::IsPremium(v) | ProfileField::ModestMode(v) => query.bind(v),
        };
        query.execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
mod live_tests {
    use super::*;

    async fn live_store() -> PgStore {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = crate::db::init_pool(&url, crate::config::DEFAULT_DB_MAX_CONNECTIONS, std::time::Duration::from_secs(5))
            .await
            .unwrap();
        PgStore::new(pool, Some(Uuid::new_v4()))
    }

    fn row(client_ref: &str) -> NewClosetRow {
        NewClosetRow {
            client_ref: client_ref.into(),
            name: "Pleated Skirt".into(),
            category: "Bottoms".into(),
            image_url: "https://img.test/skirt.png".into(),
            color: "Pink".into(),
            tags: vec!["summer".into()],
            fit: "regular".into(),
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_client_ref() {
        let store = live_store().await;
        let first = store.insert_closet_items(&[row("tmp-a")]).await.unwrap();
        let second = store.insert_closet_items(&[row("tmp-a")]).await.unwrap();
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(store.fetch_closet_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn batch_reads_back_in_submission_order() {
        let store = live_store().await;
        store.insert_closet_items(&[row("tmp-a"), row("tmp-b")]).await.unwrap();
        let refs: Vec<_> = store
            .fetch_closet_items()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.client_ref)
            .collect();
        assert_eq!(refs, vec![Some("tmp-a".to_string()), Some("tmp-b".to_string())]);
    }

    #[tokio::test]
    async fn profile_field_upserts_row() {
        let store = live_store().await;
        assert!(store.fetch_profile().await.unwrap().is_none());
        store.update_profile_field(ProfileField::StylePoints(40)).await.unwrap();
        let profile = store.fetch_profile().await.unwrap().unwrap();
        assert_eq!(profile.style_points, 40);
    }
}
