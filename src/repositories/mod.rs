//! # Repository Layer
//!
//! This module contains the generic repository that encapsulates SeaORM
//! operations for any entity with a single integer identity column, together
//! with the entity store it drives and the identity key resolution it relies on.

pub mod error;
pub mod generic;
pub mod key;
pub mod store;

pub use error::RepositoryError;
pub use generic::Repository;
pub use key::{Identity, KeyDescriptor, UNSET_IDENTITY};
pub use store::EntityStore;

use crate::models::character;

/// Repository for the characters table
pub type CharacterRepository = Repository<character::Entity>;
