use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Trip Table
        let table = table_auto(Trip::Table)
            .col(pk_auto(Trip::Id))
            .col(integer(Trip::TripId))
            .col(string(Trip::Name))
            .col(text_null(Trip::Description))
            .col(date(Trip::StartDate))
            .col(date(Trip::EndDate))
            .col(string(Trip::Location))
            .col(string(Trip::Gender).default("mixed"))
            .col(integer_null(Trip::Spots))
            .col(string_null(Trip::WebsiteUrl))
            .col(string(Trip::OrganizerName))
            .col(string(Trip::OrganizerContact))
            .col(string_null(Trip::BrochureImagePath))
            .col(string(Trip::ShowTrip).default("Hidden"))
            .check(Expr::col(Trip::EndDate).gte(Expr::col(Trip::StartDate)))
            .to_owned();
        manager.create_table(table).await?;

        // Public ids are handed out as max + 1; the index turns a lost race into an error
        manager
            .create_index(
                Index::create()
                    .name("idx_trip_trip_id")
                    .table(Trip::Table)
                    .col(Trip::TripId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create TripGallery Table
        let table = table_auto(TripGallery::Table)
            .col(pk_auto(TripGallery::Id))
            .col(integer(TripGallery::TripId))
            .col(string(TripGallery::ImagePath))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_trip_gallery_trip")
                    .from(TripGallery::Table, TripGallery::TripId)
                    .to(Trip::Table, Trip::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create TripVideo Table
        let table = table_auto(TripVideo::Table)
            .col(pk_auto(TripVideo::Id))
            .col(integer(TripVideo::TripId))
            .col(string(TripVideo::VideoUrl))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_trip_video_trip")
                    .from(TripVideo::Table, TripVideo::TripId)
                    .to(Trip::Table, Trip::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_start_date")
                    .table(Trip::Table)
                    .col(Trip::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_video_trip")
                    .table(TripVideo::Table)
                    .col(TripVideo::TripId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop all tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(TripVideo::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TripGallery::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await?;

        Ok(())
    }
}
