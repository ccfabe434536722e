use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite only accepts one column per ALTER TABLE
        manager
            .alter_table(
                Table::alter()
                    .table(Trip::Table)
                    .add_column(&mut string_null(Trip::Price))
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Trip::Table)
                    .add_column(&mut string_null(Trip::ThumbnailImage))
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Trip::Table)
                    .add_column(&mut boolean_null(Trip::IsInternship))
                    .to_owned(),
            )
            .await?;

        let table = table_auto(TripImage::Table)
            .col(pk_auto(TripImage::Id))
            .col(integer(TripImage::TripId))
            .col(string(TripImage::ImagePath))
            .col(boolean(TripImage::IsThumbnail).default(false))
            .col(boolean(TripImage::IsFlyer).default(false))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_trip_image_trip")
                    .from(TripImage::Table, TripImage::TripId)
                    .to(Trip::Table, Trip::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_image_trip")
                    .table(TripImage::Table)
                    .col(TripImage::TripId)
                    .to_owned(),
            )
            .await?;

        // Gallery rows become role-less images
        manager
            .get_connection()
            .execute_unprepared(
                "INSERT INTO trip_image (trip_id, image_path, is_thumbnail, is_flyer, created_at, updated_at) \
                 SELECT trip_id, image_path, FALSE, FALSE, created_at, updated_at FROM trip_gallery",
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TripGallery::Table).to_owned())
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
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

        // Role flags have no place in the old table and are dropped
        manager
            .get_connection()
            .execute_unprepared(
                "INSERT INTO trip_gallery (trip_id, image_path, created_at, updated_at) \
                 SELECT trip_id, image_path, created_at, updated_at FROM trip_image",
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TripImage::Table).to_owned())
            .await?;

        for column in [Trip::IsInternship, Trip::ThumbnailImage, Trip::Price] {
            manager
                .alter_table(Table::alter().table(Trip::Table).drop_column(column).to_owned())
                .await?;
        }

        Ok(())
    }
}
