//! Trip lifecycle and image roles.
//!
//! Rows come out of the database as [`TripRecord`]s and are turned into
//! [`view::TripView`]s for pages and the JSON api. Writes that touch both the
//! database and object storage live in [`authoring`] and [`duplicate`].

use sea_orm::DbErr;
use serde::Serialize;

use crate::entities::{trip, trip_image, trip_video};
use crate::storage::StorageError;

pub mod authoring;
pub mod duplicate;
pub mod form;
pub mod images;
pub mod status;
pub mod store;
pub mod view;

pub use images::ImageResolver;
pub use status::ListingScope;
pub use view::TripView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("invalid trip input")]
    Validation(Vec<FieldError>),

    #[error("trip not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A trip row together with its image and video rows.
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub trip: trip::Model,
    pub images: Vec<trip_image::Model>,
    pub videos: Vec<trip_video::Model>,
}

impl TripRecord {
    pub fn view(&self, resolver: &ImageResolver) -> TripView {
        view::to_view(&self.trip, &self.images, &self.videos, resolver)
    }
}
