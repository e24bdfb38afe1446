//! Identity key resolution for SeaORM entities.
//!
//! A [`KeyDescriptor`] is resolved once per entity type from the primary-key
//! metadata generated by `DeriveEntityModel`, then reused to read and write the
//! identity of any model instance of that type.

use sea_orm::{
    ColumnTrait, ColumnType, EntityTrait, Iterable, ModelTrait, PrimaryKeyToColumn, Value,
};

use super::error::RepositoryError;

/// Identity value carried across the repository API.
pub type Identity = i64;

/// The sentinel identity of a model that has not been persisted yet.
pub const UNSET_IDENTITY: Identity = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyWidth {
    Int,
    BigInt,
}

/// Accessor for the single integer identity column of entity `E`
#[derive(Debug, Clone)]
pub struct KeyDescriptor<E: EntityTrait> {
    table: String,
    column: E::Column,
    width: KeyWidth,
}

impl<E: EntityTrait> KeyDescriptor<E> {
    /// Discovers the identity column of `E`.
    ///
    /// Fails with [`RepositoryError::Schema`] when the entity declares no
    /// primary key, a composite one, or a non-integer one.
    pub fn resolve() -> Result<Self, RepositoryError> {
        let table = E::default().table_name().to_string();
        let mut keys = E::PrimaryKey::iter().map(|key| key.into_column());

        let column = match (keys.next(), keys.next()) {
            (Some(column), None) => column,
            (None, _) => {
                return Err(RepositoryError::schema(table, "no primary key is declared"));
            }
            (Some(_), Some(_)) => {
                return Err(RepositoryError::schema(
                    table,
                    "composite primary keys are not supported",
                ));
            }
        };

        let width = match column.def().get_column_type() {
            ColumnType::Integer => KeyWidth::Int,
            ColumnType::BigInteger => KeyWidth::BigInt,
            other => {
                return Err(RepositoryError::schema(
                    table,
                    format!("primary key must be an integer column, found {:?}", other),
                ));
            }
        };

        Ok(Self {
            table,
            column,
            width,
        })
    }

    /// Table backing the entity
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The identity column
    pub fn column(&self) -> E::Column {
        self.column
    }

    /// Reads the identity of `model`.
    pub fn identity(&self, model: &E::Model) -> Result<Identity, RepositoryError> {
        match model.get(self.column) {
            Value::Int(Some(value)) => Ok(value.into()),
            Value::BigInt(Some(value)) => Ok(value),
            Value::Int(None) | Value::BigInt(None) => Err(RepositoryError::invalid_argument(
                format!("{} identity must not be null", self.table),
            )),
            other => Err(RepositoryError::schema(
                self.table.clone(),
                format!("identity column yielded unexpected value {:?}", other),
            )),
        }
    }

    /// Writes `identity` into `model`.
    pub fn set_identity(
        &self,
        model: &mut E::Model,
        identity: Identity,
    ) -> Result<(), RepositoryError> {
        let value = self.value_of(identity)?;
        model.set(self.column, value);
        Ok(())
    }

    /// Whether `model` still carries the unset sentinel.
    pub fn is_unset(&self, model: &E::Model) -> Result<bool, RepositoryError> {
        Ok(self.identity(model)? == UNSET_IDENTITY)
    }

    /// Converts `identity` into a value of the column's own width.
    pub fn value_of(&self, identity: Identity) -> Result<Value, RepositoryError> {
        match self.width {
            KeyWidth::Int => i32::try_from(identity)
                .map(|value| Value::Int(Some(value)))
                .map_err(|_| {
                    RepositoryError::invalid_argument(format!(
                        "identity {} is out of range for {}",
                        identity, self.table
                    ))
                }),
            KeyWidth::BigInt => Ok(Value::BigInt(Some(identity))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::character;
    use sea_orm::IdenStatic;

    mod pair {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "pairs")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub left: i32,
            #[sea_orm(primary_key, auto_increment = false)]
            pub right: i32,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod planet {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "planets")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub slug: String,
            pub region: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod starship {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "starships")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
            pub model: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn rex(id: i32) -> character::Model {
        character::Model {
            id,
            name: "CT-7567 Rex".to_string(),
            faction: "Republic".to_string(),
            species: "Clone".to_string(),
            homeworld: "Kamino".to_string(),
        }
    }

    #[test]
    fn resolves_character_identity_column() {
        let key = KeyDescriptor::<character::Entity>::resolve().unwrap();
        assert_eq!(key.table(), "characters");
        assert_eq!(key.column().as_str(), "id");
    }

    #[test]
    fn reads_and_writes_identity() {
        let key = KeyDescriptor::<character::Entity>::resolve().unwrap();
        let mut model = rex(0);
        assert!(key.is_unset(&model).unwrap());

        key.set_identity(&mut model, 42).unwrap();
        assert_eq!(model.id, 42);
        assert_eq!(key.identity(&model).unwrap(), 42);
        assert!(!key.is_unset(&model).unwrap());
    }

    #[test]
    fn rejects_identity_wider_than_column() {
        let key = KeyDescriptor::<character::Entity>::resolve().unwrap();
        let mut model = rex(1);
        let err = key.set_identity(&mut model, i64::MAX).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArgument { .. }));
        assert_eq!(model.id, 1);
    }

    #[test]
    fn supports_big_integer_keys() {
        let key = KeyDescriptor::<starship::Entity>::resolve().unwrap();
        let ship = starship::Model {
            id: 5_000_000_000,
            model: "YT-1300".to_string(),
        };
        assert_eq!(key.identity(&ship).unwrap(), 5_000_000_000);
    }

    #[test]
    fn composite_key_is_a_schema_error() {
        let err = KeyDescriptor::<pair::Entity>::resolve().unwrap_err();
        match err {
            RepositoryError::Schema { entity, message } => {
                assert_eq!(entity, "pairs");
                assert!(message.contains("composite"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn text_key_is_a_schema_error() {
        let err = KeyDescriptor::<planet::Entity>::resolve().unwrap_err();
        assert!(matches!(err, RepositoryError::Schema { ref entity, .. } if entity == "planets"));
    }
}
