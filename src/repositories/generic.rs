//! Generic repository
//!
//! Uniform create/read/upsert/delete/paging over any SeaORM entity with a
//! single integer identity column. Every mutating call stages its work in one
//! [`EntityStore`] write session and commits it once.
//!
//! Existence checks are check-then-act: two callers racing on the same key can
//! both observe "absent". Uniqueness is ultimately enforced by the table's
//! primary-key constraint, surfaced as [`RepositoryError::Storage`].

use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
};
use tracing::instrument;

use super::error::RepositoryError;
use super::key::{Identity, KeyDescriptor};
use super::store::EntityStore;

/// Repository for entity `E`
#[derive(Debug)]
pub struct Repository<E: EntityTrait> {
    /// Database connection pool
    db: Arc<DatabaseConnection>,
    key: Arc<KeyDescriptor<E>>,
}

impl<E: EntityTrait> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            key: Arc::clone(&self.key),
        }
    }
}

impl<E> Repository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    /// Creates a repository, resolving the identity column of `E`.
    ///
    /// A [`RepositoryError::Schema`] here is a configuration defect and should
    /// abort startup.
    pub fn new(db: Arc<DatabaseConnection>) -> Result<Self, RepositoryError> {
        let key = KeyDescriptor::<E>::resolve()?;
        tracing::debug!(table = key.table(), "resolved entity identity column");
        Ok(Self {
            db,
            key: Arc::new(key),
        })
    }

    /// Identity accessor shared by every operation of this repository
    pub fn key(&self) -> &KeyDescriptor<E> {
        &self.key
    }

    /// Returns every row in storage order
    #[instrument(skip(self), fields(table = self.key.table()))]
    pub async fn get_all(&self) -> Result<Vec<E::Model>, RepositoryError> {
        EntityStore::reader(&self.db, &self.key).all().await
    }

    /// Returns the 1-based `page` of `page_size` rows.
    ///
    /// No total count is returned; a page past the end is empty.
    #[instrument(skip(self), fields(table = self.key.table()))]
    pub async fn get_paged(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        if page_size <= 0 {
            return Err(RepositoryError::invalid_argument(format!(
                "page size must be greater than 0, got {}",
                page_size
            )));
        }
        if page < 1 {
            return Err(RepositoryError::invalid_argument(format!(
                "page must be greater or equal to 1, got {}",
                page
            )));
        }

        // Both factors are positive here; saturate instead of overflowing.
        let offset = (page - 1).saturating_mul(page_size) as u64;
        EntityStore::reader(&self.db, &self.key)
            .scan(offset, page_size as u64)
            .await
    }

    /// Direct key lookup
    #[instrument(skip(self), fields(table = self.key.table()))]
    pub async fn get_by_id(&self, id: Identity) -> Result<Option<E::Model>, RepositoryError> {
        EntityStore::reader(&self.db, &self.key)
            .find_by_key(id)
            .await
    }

    /// Inserts `entity` unless a row already exists at its own identity.
    ///
    /// The check uses the identity carried by `entity`, so an unset identity
    /// collides with a stored row keyed by the sentinel, and a caller-chosen
    /// identity that already exists is refused. Returns `None` when refused.
    #[instrument(skip_all, fields(table = self.key.table()))]
    pub async fn add(&self, entity: E::Model) -> Result<Option<E::Model>, RepositoryError> {
        let key = self.key.identity(&entity)?;
        let store = EntityStore::begin(&self.db, &self.key).await?;

        if store.find_by_key(key).await?.is_some() {
            tracing::info!(key, "entity already exists, skipping insert");
            return Ok(None);
        }

        let stored = store.insert(entity).await?;
        store.commit().await?;

        tracing::info!(key = self.key.identity(&stored)?, "entity created");
        Ok(Some(stored))
    }

    /// Inserts every entity whose identity is not taken yet.
    ///
    /// Colliding items are skipped silently. Returns `None` when nothing was
    /// inserted.
    #[instrument(skip_all, fields(table = self.key.table(), requested = entities.len()))]
    pub async fn create_range(
        &self,
        entities: Vec<E::Model>,
    ) -> Result<Option<Vec<E::Model>>, RepositoryError> {
        let store = EntityStore::begin(&self.db, &self.key).await?;
        let mut created = Vec::with_capacity(entities.len());

        for entity in entities {
            let key = self.key.identity(&entity)?;
            if store.find_by_key(key).await?.is_some() {
                continue;
            }
            created.push(store.insert(entity).await?);
        }

        if created.is_empty() {
            tracing::info!("no entity inserted, every key collided");
            return Ok(None);
        }

        store.commit().await?;
        tracing::info!(created = created.len(), "entities created");
        Ok(Some(created))
    }

    /// Overwrites the stored row at the identity of `entity`, or inserts it.
    ///
    /// Always returns the input, which does not reflect an identity assigned
    /// on the insert path.
    #[instrument(skip_all, fields(table = self.key.table()))]
    pub async fn upsert(&self, entity: E::Model) -> Result<E::Model, RepositoryError> {
        let store = EntityStore::begin(&self.db, &self.key).await?;
        let inserted = self.stage_upsert(&store, &entity).await?;
        store.commit().await?;

        tracing::info!(inserted, "entity upserted");
        Ok(entity)
    }

    /// Per-item upsert in one commit; returns the input unchanged.
    #[instrument(skip_all, fields(table = self.key.table(), requested = entities.len()))]
    pub async fn upsert_range(
        &self,
        entities: Vec<E::Model>,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        let store = EntityStore::begin(&self.db, &self.key).await?;
        let mut inserted = 0usize;

        for entity in &entities {
            if self.stage_upsert(&store, entity).await? {
                inserted += 1;
            }
        }

        store.commit().await?;
        tracing::info!(
            inserted,
            updated = entities.len() - inserted,
            "entities upserted"
        );
        Ok(entities)
    }

    /// Removes the row at `id`, returning it; `None` when absent.
    #[instrument(skip(self), fields(table = self.key.table()))]
    pub async fn delete_by_id(&self, id: Identity) -> Result<Option<E::Model>, RepositoryError> {
        let store = EntityStore::begin(&self.db, &self.key).await?;
        let Some(existing) = store.find_by_key(id).await? else {
            return Ok(None);
        };

        store.remove(&existing).await?;
        store.commit().await?;

        tracing::info!(key = id, "entity deleted");
        Ok(Some(existing))
    }

    /// Removes the stored row at the identity of `entity`.
    ///
    /// Returns the input `entity` (not the stored row), or `None` when absent.
    #[instrument(skip_all, fields(table = self.key.table()))]
    pub async fn delete(&self, entity: E::Model) -> Result<Option<E::Model>, RepositoryError> {
        let key = self.key.identity(&entity)?;
        let store = EntityStore::begin(&self.db, &self.key).await?;
        let Some(existing) = store.find_by_key(key).await? else {
            return Ok(None);
        };

        store.remove(&existing).await?;
        store.commit().await?;

        tracing::info!(key, "entity deleted");
        Ok(Some(entity))
    }

    /// Removes every stored row matching an input identity.
    ///
    /// Returns the stored rows that were removed. Unlike the single-item
    /// deletes, no match yields an empty vector rather than `None`.
    #[instrument(skip_all, fields(table = self.key.table(), requested = entities.len()))]
    pub async fn delete_range(
        &self,
        entities: Vec<E::Model>,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        let store = EntityStore::begin(&self.db, &self.key).await?;
        let mut deleted = Vec::with_capacity(entities.len());

        for entity in &entities {
            let key = self.key.identity(entity)?;
            let Some(existing) = store.find_by_key(key).await? else {
                continue;
            };
            store.remove(&existing).await?;
            deleted.push(existing);
        }

        store.commit().await?;
        tracing::info!(deleted = deleted.len(), "entities deleted");
        Ok(deleted)
    }

    /// Stages one upsert; returns `true` when it took the insert path
    async fn stage_upsert<C>(
        &self,
        store: &EntityStore<'_, E, C>,
        entity: &E::Model,
    ) -> Result<bool, RepositoryError>
    where
        C: sea_orm::ConnectionTrait,
    {
        let key = self.key.identity(entity)?;
        match store.find_by_key(key).await? {
            Some(existing) => {
                store.overwrite(&existing, entity).await?;
                Ok(false)
            }
            None => {
                store.insert(entity.clone()).await?;
                Ok(true)
            }
        }
    }
}
