//! SeaORM entities for the trip tables.

pub mod prelude;

pub mod sea_orm_active_enums;
pub mod trip;
pub mod trip_image;
pub mod trip_video;
