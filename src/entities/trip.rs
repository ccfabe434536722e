use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TripGender, TripLocation, TripStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub trip_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub location: TripLocation,
    pub gender: TripGender,
    pub spots: Option<i32>,
    pub price: Option<String>,
    pub website_url: Option<String>,
    pub organizer_name: String,
    pub organizer_contact: String,
    pub brochure_image_path: Option<String>,
    pub thumbnail_image: Option<String>,
    pub show_trip: TripStatus,
    pub is_internship: Option<bool>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trip_image::Entity")]
    TripImage,
    #[sea_orm(has_many = "super::trip_video::Entity")]
    TripVideo,
}

impl Related<super::trip_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripImage.def()
    }
}

impl Related<super::trip_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripVideo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
