use crate::m20250801_create_all_tables::{Reservations, Spaces};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Overlap checks and availability scan a space's reservations by time
        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_space_start")
                    .table(Reservations::Table)
                    .col(Reservations::SpaceId)
                    .col(Reservations::StartAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_space_end")
                    .table(Reservations::Table)
                    .col(Reservations::SpaceId)
                    .col(Reservations::EndAt)
                    .to_owned(),
            )
            .await?;

        // "My reservations"
        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_created_start")
                    .table(Reservations::Table)
                    .col(Reservations::CreatedById)
                    .col(Reservations::StartAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_status_start")
                    .table(Reservations::Table)
                    .col(Reservations::Status)
                    .col(Reservations::StartAt)
                    .to_owned(),
            )
            .await?;

        // Default space lookup by name
        manager
            .create_index(
                Index::create()
                    .name("idx_spaces_name")
                    .table(Spaces::Table)
                    .col(Spaces::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_spaces_name",
            "idx_reservations_status_start",
            "idx_reservations_created_start",
            "idx_reservations_space_end",
            "idx_reservations_space_start",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
