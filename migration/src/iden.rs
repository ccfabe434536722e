use sea_orm_migration::prelude::*;

// Define table names
#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    TripId,
    Name,
    Description,
    StartDate,
    EndDate,
    Location,
    Gender,
    Spots,
    Price,
    WebsiteUrl,
    OrganizerName,
    OrganizerContact,
    BrochureImagePath,
    ThumbnailImage,
    ShowTrip,
    IsInternship,
    CreatedAt,
    UpdatedAt,
}

/// Image table of the first schema: plain gallery rows without roles.
/// Folded into `TripImage` by the image-roles migration.
#[derive(DeriveIden)]
pub enum TripGallery {
    Table,
    Id,
    TripId,
    ImagePath,
}

#[derive(DeriveIden)]
pub enum TripImage {
    Table,
    Id,
    TripId,
    ImagePath,
    IsThumbnail,
    IsFlyer,
}

#[derive(DeriveIden)]
pub enum TripVideo {
    Table,
    Id,
    TripId,
    VideoUrl,
}
