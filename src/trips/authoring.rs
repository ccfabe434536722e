//! Creating and editing trips, their images and their videos.
//!
//! Files are uploaded before the database transaction starts. If anything after
//! the first upload fails, the uploaded objects are removed again and the
//! transaction is rolled back, so a failed save leaves neither rows nor objects.

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info, warn};

use crate::entities::sea_orm_active_enums::TripStatus;
use crate::entities::{trip, trip_image, trip_video};
use crate::storage::{
    BROCHURE_PREFIX, GALLERY_PREFIX, ObjectStore, UploadedObjects, object_key,
};

use super::form::{TripInput, validate_video_link};
use super::images::is_absolute_url;
use super::store::next_trip_id;
use super::TripError;

/// A file received from the admin form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct TripUploads {
    pub brochure: Option<Upload>,
    pub gallery: Vec<Upload>,
}

impl TripUploads {
    pub fn is_empty(&self) -> bool {
        self.brochure.is_none() && self.gallery.is_empty()
    }
}

/// Uploads `file` under `prefix`, picking a key no earlier upload in this batch used.
async fn upload_file(
    uploaded: &mut UploadedObjects<'_>,
    prefix: &str,
    file: Upload,
) -> Result<String, TripError> {
    let mut key = object_key(prefix, &file.file_name);
    let mut n = 1;
    while uploaded.keys().contains(&key) {
        key = object_key(prefix, &format!("{n}-{}", file.file_name));
        n += 1;
    }
    let key = uploaded
        .upload(key, file.data, file.content_type.as_deref())
        .await?;
    Ok(key)
}

async fn upload_all(
    uploaded: &mut UploadedObjects<'_>,
    uploads: TripUploads,
) -> Result<(Option<String>, Vec<String>), TripError> {
    let brochure = match uploads.brochure {
        Some(file) => Some(upload_file(uploaded, BROCHURE_PREFIX, file).await?),
        None => None,
    };
    let mut gallery = Vec::with_capacity(uploads.gallery.len());
    for file in uploads.gallery {
        gallery.push(upload_file(uploaded, GALLERY_PREFIX, file).await?);
    }
    Ok((brochure, gallery))
}

fn apply_input(active: &mut trip::ActiveModel, input: TripInput) {
    active.name = Set(input.name);
    active.description = Set(input.description);
    active.start_date = Set(input.start_date);
    active.end_date = Set(input.end_date);
    active.location = Set(input.location);
    active.gender = Set(input.gender);
    active.spots = Set(input.spots);
    active.price = Set(input.price);
    active.website_url = Set(input.website_url);
    active.organizer_name = Set(input.organizer_name);
    active.organizer_contact = Set(input.organizer_contact);
    active.is_internship = Set(Some(input.is_internship));
}

pub(crate) async fn insert_images<C: ConnectionTrait>(
    db: &C,
    trip_pk: i32,
    paths: &[String],
    now: NaiveDateTime,
) -> Result<(), TripError> {
    for path in paths {
        trip_image::ActiveModel {
            trip_id: Set(trip_pk),
            image_path: Set(path.clone()),
            is_thumbnail: Set(false),
            is_flyer: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub(crate) async fn insert_videos<C: ConnectionTrait>(
    db: &C,
    trip_pk: i32,
    links: &[String],
    now: NaiveDateTime,
) -> Result<(), TripError> {
    for link in links {
        trip_video::ActiveModel {
            trip_id: Set(trip_pk),
            video_url: Set(link.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Deletes a stored object, logging instead of failing.
pub(crate) async fn remove_object(store: &dyn ObjectStore, path: &str) {
    if path.trim().is_empty() || is_absolute_url(path) {
        return;
    }
    if let Err(e) = store.delete(path).await {
        warn!("Failed to delete stored object {}: {}", path, e);
    }
}

/// Creates a new, hidden trip.
pub async fn create_trip(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    input: TripInput,
    uploads: TripUploads,
) -> Result<trip::Model, TripError> {
    let mut uploaded = UploadedObjects::new(store);
    match create_inner(db, &mut uploaded, input, uploads).await {
        Ok(trip) => Ok(trip),
        Err(e) => {
            uploaded.discard().await;
            Err(e)
        }
    }
}

async fn create_inner(
    db: &DatabaseConnection,
    uploaded: &mut UploadedObjects<'_>,
    input: TripInput,
    uploads: TripUploads,
) -> Result<trip::Model, TripError> {
    let (brochure, gallery) = upload_all(uploaded, uploads).await?;
    let video_links = input.video_links.clone();
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;
    let trip_id = next_trip_id(&txn).await?;
    let mut active = trip::ActiveModel {
        trip_id: Set(trip_id),
        brochure_image_path: Set(brochure),
        thumbnail_image: Set(None),
        show_trip: Set(TripStatus::default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_input(&mut active, input);
    debug!("Creating trip {}", trip_id);
    let trip = active.insert(&txn).await?;

    insert_images(&txn, trip.id, &gallery, now).await?;
    insert_videos(&txn, trip.id, &video_links, now).await?;
    txn.commit().await?;

    info!("Created trip {} ({})", trip.trip_id, trip.name);
    Ok(trip)
}

/// Replaces a trip's fields and video list, adding any uploaded images.
///
/// A new brochure replaces the old one, whose object is removed once the new
/// row is committed.
pub async fn update_trip(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    id: i32,
    input: TripInput,
    uploads: TripUploads,
) -> Result<trip::Model, TripError> {
    let existing = trip::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(TripError::NotFound)?;
    let old_brochure = existing.brochure_image_path.clone();

    let mut uploaded = UploadedObjects::new(store);
    let result = update_inner(db, &mut uploaded, existing, input, uploads).await;
    match result {
        Ok((trip, replaced_brochure)) => {
            if replaced_brochure {
                if let Some(old) = old_brochure {
                    remove_object(store, &old).await;
                }
            }
            Ok(trip)
        }
        Err(e) => {
            uploaded.discard().await;
            Err(e)
        }
    }
}

async fn update_inner(
    db: &DatabaseConnection,
    uploaded: &mut UploadedObjects<'_>,
    existing: trip::Model,
    input: TripInput,
    uploads: TripUploads,
) -> Result<(trip::Model, bool), TripError> {
    let (brochure, gallery) = upload_all(uploaded, uploads).await?;
    let replaced_brochure = brochure.is_some();
    let video_links = input.video_links.clone();
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;
    let mut active: trip::ActiveModel = existing.into();
    apply_input(&mut active, input);
    if let Some(path) = brochure {
        active.brochure_image_path = Set(Some(path));
    }
    active.updated_at = Set(now);
    let trip = active.update(&txn).await?;

    insert_images(&txn, trip.id, &gallery, now).await?;
    trip_video::Entity::delete_many()
        .filter(trip_video::Column::TripId.eq(trip.id))
        .exec(&txn)
        .await?;
    insert_videos(&txn, trip.id, &video_links, now).await?;
    txn.commit().await?;

    info!("Updated trip {}", trip.trip_id);
    Ok((trip, replaced_brochure))
}

async fn trip_image_of<C: ConnectionTrait>(
    db: &C,
    image_id: i32,
) -> Result<trip_image::Model, TripError> {
    trip_image::Entity::find_by_id(image_id)
        .one(db)
        .await?
        .ok_or(TripError::NotFound)
}

/// Makes `image_id` the trip's only thumbnail, or clears the choice with `None`
/// so the card falls back to the brochure.
pub async fn select_thumbnail(
    db: &DatabaseConnection,
    trip_pk: i32,
    image_id: Option<i32>,
) -> Result<trip::Model, TripError> {
    let txn = db.begin().await?;
    let trip = trip::Entity::find_by_id(trip_pk)
        .one(&txn)
        .await?
        .ok_or(TripError::NotFound)?;
    let image = match image_id {
        Some(image_id) => {
            let image = trip_image_of(&txn, image_id).await?;
            if image.trip_id != trip.id {
                return Err(TripError::NotFound);
            }
            Some(image)
        }
        None => None,
    };

    trip_image::Entity::update_many()
        .col_expr(trip_image::Column::IsThumbnail, Expr::value(false))
        .filter(trip_image::Column::TripId.eq(trip.id))
        .exec(&txn)
        .await?;

    let now = Utc::now().naive_utc();
    let pointer = match image {
        Some(image) => {
            let path = image.image_path.clone();
            let mut active: trip_image::ActiveModel = image.into();
            active.is_thumbnail = Set(true);
            active.updated_at = Set(now);
            active.update(&txn).await?;
            Some(path)
        }
        None => None,
    };

    let mut active: trip::ActiveModel = trip.into();
    active.thumbnail_image = Set(pointer);
    active.updated_at = Set(now);
    let trip = active.update(&txn).await?;
    txn.commit().await?;

    debug!(
        "Trip {} thumbnail set to {:?}",
        trip.trip_id, trip.thumbnail_image
    );
    Ok(trip)
}

/// Flags or unflags an image as its trip's flyer. At most one image per trip
/// carries the flag.
pub async fn set_flyer(
    db: &DatabaseConnection,
    image_id: i32,
    is_flyer: bool,
) -> Result<trip_image::Model, TripError> {
    let txn = db.begin().await?;
    let image = trip_image_of(&txn, image_id).await?;
    if is_flyer {
        trip_image::Entity::update_many()
            .col_expr(trip_image::Column::IsFlyer, Expr::value(false))
            .filter(trip_image::Column::TripId.eq(image.trip_id))
            .exec(&txn)
            .await?;
    }
    let mut active: trip_image::ActiveModel = image.into();
    active.is_flyer = Set(is_flyer);
    active.updated_at = Set(Utc::now().naive_utc());
    let image = active.update(&txn).await?;
    txn.commit().await?;
    Ok(image)
}

/// Removes an image row, then its stored object. Returns the owning trip's id.
pub async fn delete_image(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    image_id: i32,
) -> Result<i32, TripError> {
    let txn = db.begin().await?;
    let image = trip_image_of(&txn, image_id).await?;
    let trip_pk = image.trip_id;
    let path = image.image_path.clone();

    trip_image::Entity::delete_by_id(image.id).exec(&txn).await?;
    trip::Entity::update_many()
        .col_expr(trip::Column::ThumbnailImage, Expr::value(Option::<String>::None))
        .filter(trip::Column::Id.eq(trip_pk))
        .filter(trip::Column::ThumbnailImage.eq(path.as_str()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    remove_object(store, &path).await;
    debug!("Deleted image {} of trip {}", image_id, trip_pk);
    Ok(trip_pk)
}

pub async fn add_video(
    db: &DatabaseConnection,
    trip_pk: i32,
    link: &str,
) -> Result<trip_video::Model, TripError> {
    let link = link.trim();
    validate_video_link(link).map_err(|e| TripError::Validation(vec![e]))?;
    trip::Entity::find_by_id(trip_pk)
        .one(db)
        .await?
        .ok_or(TripError::NotFound)?;

    let now = Utc::now().naive_utc();
    let video = trip_video::ActiveModel {
        trip_id: Set(trip_pk),
        video_url: Set(link.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(video)
}

/// Returns the owning trip's id.
pub async fn delete_video(db: &DatabaseConnection, video_id: i32) -> Result<i32, TripError> {
    let video = trip_video::Entity::find_by_id(video_id)
        .one(db)
        .await?
        .ok_or(TripError::NotFound)?;
    trip_video::Entity::delete_by_id(video.id).exec(db).await?;
    Ok(video.trip_id)
}
