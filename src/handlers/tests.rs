//! # Tests for Handlers
//!
//! This module contains unit tests for API handlers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::handlers::characters::{ListCharactersQuery, list_characters};
use crate::handlers::root;
use crate::models::character::Model;
use crate::repositories::{Identity, RepositoryError};
use crate::server::AppState;
use crate::services::CrudOperations;

/// Answers listing calls from a fixed roster and records paging requests
#[derive(Debug, Default)]
struct FixedRoster {
    paged: Mutex<Vec<(i64, i64)>>,
}

fn roster() -> Vec<Model> {
    ["Luke Skywalker", "Leia Organa", "Han Solo"]
        .into_iter()
        .enumerate()
        .map(|(index, name)| Model {
            id: index as i32 + 1,
            name: name.to_string(),
            faction: "Rebel Alliance".to_string(),
            species: "Human".to_string(),
            homeworld: "Unknown".to_string(),
        })
        .collect()
}

#[async_trait]
impl CrudOperations<Model> for FixedRoster {
    async fn get_all(&self) -> Result<Vec<Model>, RepositoryError> {
        Ok(roster())
    }

    async fn get_paged(&self, page: i64, page_size: i64) -> Result<Vec<Model>, RepositoryError> {
        self.paged.lock().unwrap().push((page, page_size));
        Ok(roster()
            .into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect())
    }

    async fn get_by_id(&self, id: Identity) -> Result<Option<Model>, RepositoryError> {
        Ok(roster().into_iter().find(|c| i64::from(c.id) == id))
    }

    async fn add(&self, entity: Model) -> Result<Option<Model>, RepositoryError> {
        Ok(Some(entity))
    }

    async fn create_range(&self, entities: Vec<Model>) -> Result<Option<Vec<Model>>, RepositoryError> {
        Ok(Some(entities))
    }

    async fn upsert(&self, entity: Model) -> Result<Model, RepositoryError> {
        Ok(entity)
    }

    async fn upsert_range(&self, entities: Vec<Model>) -> Result<Vec<Model>, RepositoryError> {
        Ok(entities)
    }

    async fn delete_by_id(&self, _id: Identity) -> Result<Option<Model>, RepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _entity: Model) -> Result<Option<Model>, RepositoryError> {
        Ok(None)
    }

    async fn delete_range(&self, _entities: Vec<Model>) -> Result<Vec<Model>, RepositoryError> {
        Ok(Vec::new())
    }
}

fn test_state(roster: Arc<FixedRoster>) -> AppState {
    AppState {
        config: Arc::new(AppConfig {
            profile: "test".to_string(),
            ..Default::default()
        }),
        db: DatabaseConnection::default(),
        characters: roster,
    }
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let state = test_state(Arc::new(FixedRoster::default()));

    let Json(service_info) = root(State(state)).await;

    assert_eq!(service_info.service, "holocron");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(service_info.profile, "test");
}

#[tokio::test]
async fn test_list_without_page_size_returns_everything() {
    let roster = Arc::new(FixedRoster::default());
    let state = test_state(roster.clone());

    let Json(characters) = list_characters(State(state), Query(ListCharactersQuery::default()))
        .await
        .unwrap();

    assert_eq!(characters.len(), 3);
    assert!(roster.paged.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_with_page_size_forwards_paging() {
    let roster = Arc::new(FixedRoster::default());
    let state = test_state(roster.clone());

    let query = ListCharactersQuery {
        ps: Some(2),
        p: Some(2),
    };
    let Json(characters) = list_characters(State(state), Query(query)).await.unwrap();

    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0].name, "Han Solo");
    assert_eq!(*roster.paged.lock().unwrap(), vec![(2, 2)]);
}

#[tokio::test]
async fn test_list_rejects_page_size_without_page() {
    let roster = Arc::new(FixedRoster::default());
    let state = test_state(roster.clone());

    let query = ListCharactersQuery {
        ps: Some(5),
        p: None,
    };
    let err = list_characters(State(state), Query(query)).await.unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(roster.paged.lock().unwrap().is_empty());
}
