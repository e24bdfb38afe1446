//! # Service Layer
//!
//! Storage-independent contract consumed by the transport adapters. The
//! service forwards every call unchanged to the repository underneath.

use std::fmt::Debug;

use async_trait::async_trait;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, IntoActiveModel};

use crate::models::character;
use crate::repositories::{CharacterRepository, Identity, Repository, RepositoryError};

/// Uniform CRUD/upsert/paging contract over models of type `M`
#[async_trait]
pub trait CrudOperations<M>: Send + Sync + Debug
where
    M: Send + Sync + 'static,
{
    async fn get_all(&self) -> Result<Vec<M>, RepositoryError>;

    async fn get_paged(&self, page: i64, page_size: i64) -> Result<Vec<M>, RepositoryError>;

    async fn get_by_id(&self, id: Identity) -> Result<Option<M>, RepositoryError>;

    async fn add(&self, entity: M) -> Result<Option<M>, RepositoryError>;

    async fn create_range(&self, entities: Vec<M>) -> Result<Option<Vec<M>>, RepositoryError>;

    async fn upsert(&self, entity: M) -> Result<M, RepositoryError>;

    async fn upsert_range(&self, entities: Vec<M>) -> Result<Vec<M>, RepositoryError>;

    async fn delete_by_id(&self, id: Identity) -> Result<Option<M>, RepositoryError>;

    async fn delete(&self, entity: M) -> Result<Option<M>, RepositoryError>;

    async fn delete_range(&self, entities: Vec<M>) -> Result<Vec<M>, RepositoryError>;
}

#[async_trait]
impl<E> CrudOperations<E::Model> for Repository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + 'static,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    async fn get_all(&self) -> Result<Vec<E::Model>, RepositoryError> {
        Repository::get_all(self).await
    }

    async fn get_paged(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        Repository::get_paged(self, page, page_size).await
    }

    async fn get_by_id(&self, id: Identity) -> Result<Option<E::Model>, RepositoryError> {
        Repository::get_by_id(self, id).await
    }

    async fn add(&self, entity: E::Model) -> Result<Option<E::Model>, RepositoryError> {
        Repository::add(self, entity).await
    }

    async fn create_range(
        &self,
        entities: Vec<E::Model>,
    ) -> Result<Option<Vec<E::Model>>, RepositoryError> {
        Repository::create_range(self, entities).await
    }

    async fn upsert(&self, entity: E::Model) -> Result<E::Model, RepositoryError> {
        Repository::upsert(self, entity).await
    }

    async fn upsert_range(
        &self,
        entities: Vec<E::Model>,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        Repository::upsert_range(self, entities).await
    }

    async fn delete_by_id(&self, id: Identity) -> Result<Option<E::Model>, RepositoryError> {
        Repository::delete_by_id(self, id).await
    }

    async fn delete(&self, entity: E::Model) -> Result<Option<E::Model>, RepositoryError> {
        Repository::delete(self, entity).await
    }

    async fn delete_range(
        &self,
        entities: Vec<E::Model>,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        Repository::delete_range(self, entities).await
    }
}

/// Pass-through service over any [`CrudOperations`] implementation
#[derive(Debug, Clone)]
pub struct EntityService<R> {
    inner: R,
}

impl<R> EntityService<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M, R> CrudOperations<M> for EntityService<R>
where
    M: Send + Sync + 'static,
    R: CrudOperations<M>,
{
    async fn get_all(&self) -> Result<Vec<M>, RepositoryError> {
        self.inner.get_all().await
    }

    async fn get_paged(&self, page: i64, page_size: i64) -> Result<Vec<M>, RepositoryError> {
        self.inner.get_paged(page, page_size).await
    }

    async fn get_by_id(&self, id: Identity) -> Result<Option<M>, RepositoryError> {
        self.inner.get_by_id(id).await
    }

    async fn add(&self, entity: M) -> Result<Option<M>, RepositoryError> {
        self.inner.add(entity).await
    }

    async fn create_range(&self, entities: Vec<M>) -> Result<Option<Vec<M>>, RepositoryError> {
        self.inner.create_range(entities).await
    }

    async fn upsert(&self, entity: M) -> Result<M, RepositoryError> {
        self.inner.upsert(entity).await
    }

    async fn upsert_range(&self, entities: Vec<M>) -> Result<Vec<M>, RepositoryError> {
        self.inner.upsert_range(entities).await
    }

    async fn delete_by_id(&self, id: Identity) -> Result<Option<M>, RepositoryError> {
        self.inner.delete_by_id(id).await
    }

    async fn delete(&self, entity: M) -> Result<Option<M>, RepositoryError> {
        self.inner.delete(entity).await
    }

    async fn delete_range(&self, entities: Vec<M>) -> Result<Vec<M>, RepositoryError> {
        self.inner.delete_range(entities).await
    }
}

/// Service consumed by the character endpoints
pub type CharacterService = EntityService<CharacterRepository>;

impl CharacterService {
    /// Builds the character service, resolving the character identity column
    pub fn for_characters(
        db: std::sync::Arc<sea_orm::DatabaseConnection>,
    ) -> Result<Self, RepositoryError> {
        Ok(Self::new(CharacterRepository::new(db)?))
    }
}

/// Shared handle to the character operations
pub type SharedCharacterService = std::sync::Arc<dyn CrudOperations<character::Model>>;
