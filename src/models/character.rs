//! Character entity model
//!
//! This module contains the SeaORM entity model for the characters table,
//! the single domain entity served by the Holocron API.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Character entity representing one person, droid or creature of the saga
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "characters")]
#[schema(as = Character)]
pub struct Model {
    /// Identity assigned by the database (0 until persisted)
    #[sea_orm(primary_key)]
    #[serde(default)]
    #[schema(example = 1)]
    pub id: i32,

    /// Display name of the character
    #[schema(example = "Yoda")]
    pub name: String,

    /// Faction the character belongs to
    #[schema(example = "Jedi")]
    pub faction: String,

    /// Species of the character
    #[schema(example = "Unknown")]
    pub species: String,

    /// Homeworld of the character
    #[schema(example = "Unknown")]
    pub homeworld: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Creation payload: a character without an identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CharacterDto {
    #[schema(example = "Yoda")]
    pub name: String,
    #[schema(example = "Jedi")]
    pub faction: String,
    #[schema(example = "Unknown")]
    pub species: String,
    #[schema(example = "Unknown")]
    pub homeworld: String,
}

impl Model {
    /// Returns the name of the first blank descriptive field, if any
    pub fn first_blank_field(&self) -> Option<&'static str> {
        first_blank([
            ("name", &self.name),
            ("faction", &self.faction),
            ("species", &self.species),
            ("homeworld", &self.homeworld),
        ])
    }
}

impl CharacterDto {
    /// Returns the name of the first blank field, if any
    pub fn first_blank_field(&self) -> Option<&'static str> {
        first_blank([
            ("name", &self.name),
            ("faction", &self.faction),
            ("species", &self.species),
            ("homeworld", &self.homeworld),
        ])
    }
}

fn first_blank(fields: [(&'static str, &String); 4]) -> Option<&'static str> {
    fields
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
}

impl From<CharacterDto> for Model {
    fn from(dto: CharacterDto) -> Self {
        Self {
            id: 0,
            name: dto.name,
            faction: dto.faction,
            species: dto.species,
            homeworld: dto.homeworld,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str) -> CharacterDto {
        CharacterDto {
            name: name.to_string(),
            faction: "Jedi".to_string(),
            species: "Human".to_string(),
            homeworld: "Stewjon".to_string(),
        }
    }

    #[test]
    fn dto_converts_to_unpersisted_model() {
        let model: Model = dto("Obi-Wan Kenobi").into();
        assert_eq!(model.id, 0);
        assert_eq!(model.name, "Obi-Wan Kenobi");
        assert_eq!(model.homeworld, "Stewjon");
    }

    #[test]
    fn blank_field_is_reported() {
        assert_eq!(dto("  ").first_blank_field(), Some("name"));
        assert_eq!(dto("Rex").first_blank_field(), None);

        let mut model: Model = dto("Rex").into();
        model.homeworld = String::new();
        assert_eq!(model.first_blank_field(), Some("homeworld"));
    }

    #[test]
    fn missing_id_deserializes_as_zero() {
        let model: Model = serde_json::from_value(serde_json::json!({
            "name": "Rex",
            "faction": "Republic",
            "species": "Clone",
            "homeworld": "Kamino"
        }))
        .unwrap();
        assert_eq!(model.id, 0);
    }
}
