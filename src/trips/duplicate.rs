//! Copying a trip, including its stored images, into a new hidden trip.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::{debug, info};

use crate::entities::sea_orm_active_enums::TripStatus;
use crate::entities::{trip, trip_image, trip_video};
use crate::storage::{
    BROCHURE_PREFIX, GALLERY_PREFIX, ObjectStore, UploadedObjects, file_name_of, object_key,
    prefix_of,
};

use super::images::is_absolute_url;
use super::store::{find_by_id, next_trip_id};
use super::{TripError, TripRecord};

pub const COPY_SUFFIX: &str = " - Copy";

/// Downloads `path` and stores the bytes under a fresh key next to it.
/// Absolute URLs point outside the bucket and are shared as they are.
async fn copy_object(
    uploaded: &mut UploadedObjects<'_>,
    path: &str,
    default_prefix: &str,
) -> Result<String, TripError> {
    if is_absolute_url(path) {
        return Ok(path.to_string());
    }
    let data = uploaded.store().download(path).await?;
    let prefix = prefix_of(path).unwrap_or(default_prefix);
    let mut key = object_key(prefix, file_name_of(path));
    let mut n = 1;
    while uploaded.keys().contains(&key) {
        key = object_key(prefix, &format!("{n}-{}", file_name_of(path)));
        n += 1;
    }
    debug!("Copying object {} to {}", path, key);
    Ok(uploaded.upload(key, data, None).await?)
}

/// Duplicates trip `id` as `"<name> - Copy"` with the next public trip id.
///
/// The copy starts hidden, gets its own copies of the brochure and every image
/// (keeping their role flags), and the same video links.
pub async fn duplicate_trip(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    id: i32,
) -> Result<trip::Model, TripError> {
    let source = find_by_id(db, id).await?;
    let mut uploaded = UploadedObjects::new(store);
    match duplicate_inner(db, &mut uploaded, source).await {
        Ok(copy) => Ok(copy),
        Err(e) => {
            uploaded.discard().await;
            Err(e)
        }
    }
}

async fn duplicate_inner(
    db: &DatabaseConnection,
    uploaded: &mut UploadedObjects<'_>,
    source: TripRecord,
) -> Result<trip::Model, TripError> {
    let TripRecord {
        trip: original,
        images,
        videos,
    } = source;

    let brochure = match original
        .brochure_image_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        Some(path) => Some(copy_object(uploaded, path, BROCHURE_PREFIX).await?),
        None => None,
    };
    let mut copied: HashMap<String, String> = HashMap::new();
    let mut image_paths = Vec::with_capacity(images.len());
    for image in &images {
        let path = copy_object(uploaded, &image.image_path, GALLERY_PREFIX).await?;
        copied.insert(image.image_path.clone(), path.clone());
        image_paths.push(path);
    }
    let thumbnail = original
        .thumbnail_image
        .as_ref()
        .and_then(|pointer| copied.get(pointer).cloned());

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;
    let trip_id = next_trip_id(&txn).await?;
    let copy = trip::ActiveModel {
        trip_id: Set(trip_id),
        name: Set(format!("{}{}", original.name, COPY_SUFFIX)),
        description: Set(original.description.clone()),
        start_date: Set(original.start_date),
        end_date: Set(original.end_date),
        location: Set(original.location),
        gender: Set(original.gender),
        spots: Set(original.spots),
        price: Set(original.price.clone()),
        website_url: Set(original.website_url.clone()),
        organizer_name: Set(original.organizer_name.clone()),
        organizer_contact: Set(original.organizer_contact.clone()),
        brochure_image_path: Set(brochure),
        thumbnail_image: Set(thumbnail),
        show_trip: Set(TripStatus::default()),
        is_internship: Set(original.is_internship),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (image, path) in images.iter().zip(image_paths) {
        trip_image::ActiveModel {
            trip_id: Set(copy.id),
            image_path: Set(path),
            is_thumbnail: Set(image.is_thumbnail),
            is_flyer: Set(image.is_flyer),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    for video in &videos {
        trip_video::ActiveModel {
            trip_id: Set(copy.id),
            video_url: Set(video.video_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!(
        "Duplicated trip {} as trip {}",
        original.trip_id, copy.trip_id
    );
    Ok(copy)
}
