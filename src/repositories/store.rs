//! Entity store adapter
//!
//! Thin storage access for one entity type: lookups, staged writes and a
//! single commit. Write sessions run inside a database transaction, so nothing
//! staged becomes visible to other connections until [`EntityStore::commit`].
//! Dropping an uncommitted write session rolls it back.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};

use super::error::RepositoryError;
use super::key::{Identity, KeyDescriptor};

/// Storage access for entity `E` over connection `C`
pub struct EntityStore<'k, E: EntityTrait, C: ConnectionTrait> {
    conn: C,
    key: &'k KeyDescriptor<E>,
}

impl<'k, E> EntityStore<'k, E, DatabaseTransaction>
where
    E: EntityTrait,
{
    /// Opens a write session
    pub async fn begin(
        db: &DatabaseConnection,
        key: &'k KeyDescriptor<E>,
    ) -> Result<Self, RepositoryError> {
        let conn = db.begin().await?;
        Ok(Self { conn, key })
    }

    /// Flushes every staged insert, overwrite and remove as one durable unit
    pub async fn commit(self) -> Result<(), RepositoryError> {
        self.conn.commit().await?;
        tracing::debug!(table = self.key.table(), "committed write session");
        Ok(())
    }
}

impl<'k, E> EntityStore<'k, E, DatabaseConnection>
where
    E: EntityTrait,
{
    /// Opens a read session on the pooled connection
    pub fn reader(db: &DatabaseConnection, key: &'k KeyDescriptor<E>) -> Self {
        Self {
            conn: db.clone(),
            key,
        }
    }
}

impl<'k, E, C> EntityStore<'k, E, C>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    C: ConnectionTrait,
{
    /// Returns the entity whose identity equals `key`
    pub async fn find_by_key(&self, key: Identity) -> Result<Option<E::Model>, RepositoryError> {
        let value = self.key.value_of(key)?;
        let found = E::find()
            .filter(self.key.column().eq(value))
            .one(&self.conn)
            .await?;

        tracing::debug!(
            table = self.key.table(),
            key,
            found = found.is_some(),
            "looked up entity by key"
        );
        Ok(found)
    }

    /// Persists `model` as a new row and returns it with its final identity.
    ///
    /// An unset identity is left for the store to assign.
    pub async fn insert(&self, model: E::Model) -> Result<E::Model, RepositoryError> {
        let unset = self.key.is_unset(&model)?;
        let mut active = model.into_active_model().reset_all();
        if unset {
            active.not_set(self.key.column());
        }

        let stored = active.insert(&self.conn).await?;
        tracing::debug!(
            table = self.key.table(),
            key = self.key.identity(&stored)?,
            "staged insert"
        );
        Ok(stored)
    }

    /// Copies every non-identity field of `incoming` onto `existing`
    pub async fn overwrite(
        &self,
        existing: &E::Model,
        incoming: &E::Model,
    ) -> Result<E::Model, RepositoryError> {
        let key = self.key.identity(existing)?;
        let mut merged = incoming.clone();
        self.key.set_identity(&mut merged, key)?;

        let updated = merged
            .into_active_model()
            .reset_all()
            .update(&self.conn)
            .await?;
        tracing::debug!(table = self.key.table(), key, "staged overwrite");
        Ok(updated)
    }

    /// Deletes the row matching the identity of `model`
    pub async fn remove(&self, model: &E::Model) -> Result<(), RepositoryError> {
        let key = self.key.identity(model)?;
        let result = model.clone().into_active_model().delete(&self.conn).await?;
        tracing::debug!(
            table = self.key.table(),
            key,
            rows_affected = result.rows_affected,
            "staged remove"
        );
        Ok(())
    }

    /// Returns up to `limit` entities in identity order, skipping the first `offset`
    pub async fn scan(&self, offset: u64, limit: u64) -> Result<Vec<E::Model>, RepositoryError> {
        let rows = E::find()
            .order_by_asc(self.key.column())
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await?;

        tracing::debug!(
            table = self.key.table(),
            offset,
            limit,
            returned = rows.len(),
            "scanned entities"
        );
        Ok(rows)
    }

    /// Returns every entity in identity order
    pub async fn all(&self) -> Result<Vec<E::Model>, RepositoryError> {
        let rows = E::find()
            .order_by_asc(self.key.column())
            .all(&self.conn)
            .await?;
        tracing::debug!(
            table = self.key.table(),
            returned = rows.len(),
            "loaded all entities"
        );
        Ok(rows)
    }
}
