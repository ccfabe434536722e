pub use super::trip::Entity as Trip;
pub use super::trip_image::Entity as TripImage;
pub use super::trip_video::Entity as TripVideo;
