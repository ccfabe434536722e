//! The display model shared by the HTML pages and the JSON api.

use chrono::NaiveDate;
use reqwest::Url;
use serde::Serialize;

use crate::entities::sea_orm_active_enums::{TripGender, TripLocation, TripStatus};
use crate::entities::{trip, trip_image, trip_video};

use super::images::{self, ImageResolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organizer {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripImageView {
    pub id: i32,
    /// Storage key, kept for admin forms.
    pub path: String,
    pub url: String,
    pub is_thumbnail: bool,
    pub is_flyer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    pub id: i32,
    pub trip_id: i32,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub organizer: Organizer,
    pub gender: TripGender,
    pub location: TripLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spots: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub is_internship: bool,
    pub status: TripStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brochure_image: Option<String>,
    pub card_image: String,
    pub images: Vec<TripImageView>,
    pub video_links: Vec<String>,
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Player URL for YouTube and Vimeo links; `None` for anything else.
pub fn embed_url(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let youtube = |id: &str| {
        is_video_id(id).then(|| format!("https://www.youtube.com/embed/{id}"))
    };
    match (host, segments.as_slice()) {
        ("youtu.be", [id]) => youtube(id),
        ("youtube.com" | "youtube-nocookie.com", ["watch"]) => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .and_then(|(_, id)| youtube(id.as_ref())),
        ("youtube.com" | "youtube-nocookie.com", ["embed" | "shorts" | "live", id]) => youtube(id),
        ("vimeo.com", [id]) | ("player.vimeo.com", ["video", id])
            if id.chars().all(|c| c.is_ascii_digit()) =>
        {
            Some(format!("https://player.vimeo.com/video/{id}"))
        }
        _ => None,
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn to_view(
    trip: &trip::Model,
    images: &[trip_image::Model],
    videos: &[trip_video::Model],
    resolver: &ImageResolver,
) -> TripView {
    let mut images: Vec<&trip_image::Model> = images.iter().collect();
    images.sort_by_key(|img| (img.created_at, img.id));
    let mut videos: Vec<&trip_video::Model> = videos.iter().collect();
    videos.sort_by_key(|v| (v.created_at, v.id));

    let sorted_images: Vec<trip_image::Model> = images.into_iter().cloned().collect();
    let card_image = images::card_image(trip, &sorted_images, resolver);
    // The flyer fallback applies to cards only; the detail page shows the flyer on its own
    let brochure_image = trip
        .brochure_image_path
        .as_deref()
        .filter(|path| !path.trim().is_empty())
        .map(|path| resolver.resolve(Some(path)));

    TripView {
        id: trip.id,
        trip_id: trip.trip_id,
        name: trip.name.clone(),
        description: trip.description.clone().unwrap_or_default(),
        start_date: trip.start_date,
        end_date: trip.end_date,
        website_url: present(&trip.website_url),
        organizer: Organizer {
            name: trip.organizer_name.clone(),
            contact: trip.organizer_contact.clone(),
        },
        gender: trip.gender,
        location: trip.location,
        spots: trip.spots,
        price: present(&trip.price),
        is_internship: trip.is_internship.unwrap_or(false),
        status: trip.show_trip,
        brochure_image,
        card_image,
        images: sorted_images
            .iter()
            .map(|img| TripImageView {
                id: img.id,
                path: img.image_path.clone(),
                url: resolver.resolve(Some(&img.image_path)),
                is_thumbnail: img.is_thumbnail,
                is_flyer: img.is_flyer,
            })
            .collect(),
        video_links: videos.iter().map(|v| v.video_url.clone()).collect(),
    }
}
