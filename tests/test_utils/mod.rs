//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations for testing purposes, plus character fixtures.

use anyhow::Result;
use holocron::models::character;
use holocron::repositories::CharacterRepository;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use std::sync::Arc;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// # Returns
///
/// Returns a Result containing the database connection
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    // Create in-memory SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Run all migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Sets up an in-memory SQLite database with all migrations applied and returns an Arc.
///
/// # Returns
///
/// Returns a Result containing an Arc-wrapped database connection
#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    let db = setup_test_db().await?;
    Ok(Arc::new(db))
}

/// Builds a character repository over a fresh migrated database.
#[allow(dead_code)]
pub async fn setup_character_repository() -> Result<(Arc<DatabaseConnection>, CharacterRepository)>
{
    let db = setup_test_db_arc().await?;
    let repo = CharacterRepository::new(Arc::clone(&db))?;
    Ok((db, repo))
}

/// An unpersisted character (identity unset).
#[allow(dead_code)]
pub fn character(name: &str, faction: &str, species: &str, homeworld: &str) -> character::Model {
    character::Model {
        id: 0,
        name: name.to_string(),
        faction: faction.to_string(),
        species: species.to_string(),
        homeworld: homeworld.to_string(),
    }
}

/// `count` distinct unpersisted characters.
#[allow(dead_code)]
pub fn clone_troopers(count: usize) -> Vec<character::Model> {
    (1..=count)
        .map(|n| character(&format!("CT-{:04}", n), "Galactic Republic", "Human", "Kamino"))
        .collect()
}

/// Inserts `count` characters and returns them with their identities, in insertion order.
#[allow(dead_code)]
pub async fn seed_characters(
    repo: &CharacterRepository,
    count: usize,
) -> Result<Vec<character::Model>> {
    let created = repo
        .create_range(clone_troopers(count))
        .await?
        .unwrap_or_default();
    Ok(created)
}

/// Number of character rows currently stored.
#[allow(dead_code)]
pub async fn count_characters(db: &DatabaseConnection) -> Result<u64> {
    Ok(character::Entity::find().count(db).await?)
}
