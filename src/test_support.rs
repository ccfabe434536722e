//! Fixtures shared by the in-crate tests.

use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::entities::sea_orm_active_enums::{TripGender, TripLocation, TripStatus};
use crate::entities::{trip, trip_image};
use crate::storage::memory::PUBLIC_PREFIX;
use crate::trips::ImageResolver;

pub const DEFAULT_IMAGE: &str = "/static/placeholder.svg";

pub fn resolver() -> ImageResolver {
    ImageResolver::new(PUBLIC_PREFIX, DEFAULT_IMAGE)
}

/// Fresh in-memory SQLite database with every migration applied.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would otherwise see its own empty database
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Unsaved trip model with sensible values; tweak fields before use.
pub fn trip_model(trip_id: i32, name: &str, status: TripStatus) -> trip::Model {
    let now = Utc::now().naive_utc();
    trip::Model {
        id: trip_id,
        trip_id,
        name: name.to_string(),
        description: Some(format!("About {name}")),
        start_date: date(2025, 7, 1),
        end_date: date(2025, 7, 14),
        location: TripLocation::Israel,
        gender: TripGender::Mixed,
        spots: Some(20),
        price: None,
        website_url: None,
        organizer_name: "Dana Levi".to_string(),
        organizer_contact: "dana@example.org".to_string(),
        brochure_image_path: None,
        thumbnail_image: None,
        show_trip: status,
        is_internship: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn image_model(id: i32, trip_id: i32, path: &str) -> trip_image::Model {
    let now = Utc::now().naive_utc();
    trip_image::Model {
        id,
        trip_id,
        image_path: path.to_string(),
        is_thumbnail: false,
        is_flyer: false,
        created_at: now,
        updated_at: now,
    }
}

/// Inserts `model` (its `id` is ignored) and returns the stored row.
pub async fn insert_trip(db: &DatabaseConnection, model: trip::Model) -> trip::Model {
    let mut active: trip::ActiveModel = model.into();
    active.id = sea_orm::ActiveValue::NotSet;
    active.insert(db).await.unwrap()
}

pub async fn insert_image(
    db: &DatabaseConnection,
    trip_pk: i32,
    path: &str,
    is_thumbnail: bool,
    is_flyer: bool,
) -> trip_image::Model {
    let now = Utc::now().naive_utc();
    trip_image::ActiveModel {
        trip_id: Set(trip_pk),
        image_path: Set(path.to_string()),
        is_thumbnail: Set(is_thumbnail),
        is_flyer: Set(is_flyer),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
