//! Migration to create the characters table.
//!
//! One integer identity column assigned by the database plus the four
//! descriptive text columns of a character.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Characters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Characters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Characters::Name).text().not_null())
                    .col(ColumnDef::new(Characters::Faction).text().not_null())
                    .col(ColumnDef::new(Characters::Species).text().not_null())
                    .col(ColumnDef::new(Characters::Homeworld).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Characters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Characters {
    Table,
    Id,
    Name,
    Faction,
    Species,
    Homeworld,
}
