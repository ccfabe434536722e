//! Resolving stored image keys to URLs and deciding which image plays which role.

use tracing::{debug, warn};

use crate::entities::{trip, trip_image};
use crate::storage::supabase::encode_key;

use super::view::TripImageView;

/// Turns storage keys into URLs a browser can fetch.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    public_prefix: String,
    default_image: String,
}

impl ImageResolver {
    pub fn new(public_prefix: impl Into<String>, default_image: impl Into<String>) -> Self {
        let public_prefix: String = public_prefix.into();
        Self {
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            default_image: default_image.into(),
        }
    }

    pub fn default_image(&self) -> &str {
        &self.default_image
    }

    /// Never fails: anything unusable becomes the default image.
    pub fn resolve(&self, path: Option<&str>) -> String {
        let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
            return self.default_image.clone();
        };
        if is_absolute_url(path) {
            return path.to_string();
        }

        let key = path.trim_start_matches('/');
        if key.is_empty() || key.ends_with('/') {
            warn!("Unusable image path {:?}, using default image", path);
            return self.default_image.clone();
        }
        format!("{}/{}", self.public_prefix, encode_key(key))
    }
}

/// `http://…`, `https://…`, `data:…` and friends.
pub fn is_absolute_url(path: &str) -> bool {
    match path.split_once(':') {
        Some((scheme, rest)) => {
            scheme.len() > 1
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !rest.is_empty()
        }
        None => false,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Storage key of the image chosen as thumbnail, if any.
///
/// The pointer on the trip wins while it still names one of the trip's images.
/// A pointer left behind by a deleted image is ignored.
pub fn selected_thumbnail<'a>(
    trip: &'a trip::Model,
    images: &'a [trip_image::Model],
) -> Option<&'a str> {
    if let Some(pointer) = non_empty(trip.thumbnail_image.as_deref()) {
        if images.iter().any(|img| img.image_path == pointer) {
            return Some(pointer);
        }
        debug!(
            "Trip {} thumbnail pointer {} names no image, ignoring",
            trip.trip_id, pointer
        );
    }
    images
        .iter()
        .find(|img| img.is_thumbnail)
        .map(|img| img.image_path.as_str())
}

/// Storage key of the brochure: the dedicated column, else a flyer-flagged image.
pub fn brochure_path<'a>(
    trip: &'a trip::Model,
    images: &'a [trip_image::Model],
) -> Option<&'a str> {
    non_empty(trip.brochure_image_path.as_deref()).or_else(|| {
        images
            .iter()
            .find(|img| img.is_flyer)
            .map(|img| img.image_path.as_str())
    })
}

/// The image shown on listing cards: thumbnail, then brochure, then the default.
pub fn card_image(
    trip: &trip::Model,
    images: &[trip_image::Model],
    resolver: &ImageResolver,
) -> String {
    let chosen = selected_thumbnail(trip, images).or_else(|| brochure_path(trip, images));
    resolver.resolve(chosen)
}

/// Splits images for the detail page into the distinguished flyer and the gallery.
pub fn split_flyer(images: &[TripImageView]) -> (Option<&TripImageView>, Vec<&TripImageView>) {
    let flyer = images.iter().position(|img| img.is_flyer);
    let gallery = images
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != flyer)
        .map(|(_, img)| img)
        .collect();
    (flyer.map(|i| &images[i]), gallery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::TripStatus;
    use crate::storage::memory::PUBLIC_PREFIX;
    use crate::test_support::{DEFAULT_IMAGE, image_model, resolver, trip_model};

    #[test]
    fn resolves_missing_paths_to_default() {
        let r = resolver();
        assert_eq!(r.resolve(None), DEFAULT_IMAGE);
        assert_eq!(r.resolve(Some("")), DEFAULT_IMAGE);
        assert_eq!(r.resolve(Some("   ")), DEFAULT_IMAGE);
        assert_eq!(r.resolve(Some("/")), DEFAULT_IMAGE);
        assert_eq!(r.resolve(Some("gallery/")), DEFAULT_IMAGE);
    }

    #[test]
    fn keeps_absolute_urls() {
        let r = resolver();
        assert_eq!(r.resolve(Some("http://x/y.png")), "http://x/y.png");
        assert_eq!(
            r.resolve(Some("https://cdn.example.org/a b.png")),
            "https://cdn.example.org/a b.png"
        );
        assert_eq!(r.resolve(Some("data:image/png;base64,AAAA")), "data:image/png;base64,AAAA");
    }

    #[test]
    fn resolves_keys_against_bucket() {
        let r = resolver();
        let url = r.resolve(Some("gallery/abc.png"));
        assert!(url.starts_with(PUBLIC_PREFIX));
        assert!(url.ends_with("gallery/abc.png"));
        assert_eq!(r.resolve(Some("/gallery/abc.png")), url);
        assert_eq!(
            r.resolve(Some("flyer.png")),
            format!("{PUBLIC_PREFIX}/flyer.png")
        );
        assert_eq!(
            r.resolve(Some("gallery/my trip.png")),
            format!("{PUBLIC_PREFIX}/gallery/my%20trip.png")
        );
    }

    #[test]
    fn trailing_slash_on_prefix_is_ignored() {
        let r = ImageResolver::new("https://cdn.test/public/", DEFAULT_IMAGE);
        assert_eq!(r.resolve(Some("a.png")), "https://cdn.test/public/a.png");
    }

    #[test]
    fn detects_absolute_urls() {
        assert!(is_absolute_url("https://x.org/a.png"));
        assert!(is_absolute_url("data:image/png;base64,AA"));
        assert!(!is_absolute_url("gallery/a.png"));
        assert!(!is_absolute_url("C:\\images\\a.png") && !is_absolute_url("c:"));
        assert!(!is_absolute_url("gallery/12:30.png"));
    }

    #[test]
    fn card_prefers_selected_thumbnail_over_brochure() {
        let mut trip = trip_model(1, "Negev Trek", TripStatus::Show);
        trip.brochure_image_path = Some("brochures/b.png".into());
        trip.thumbnail_image = Some("gallery/t.png".into());
        let images = vec![
            image_model(1, trip.id, "gallery/g.png"),
            image_model(2, trip.id, "gallery/t.png"),
        ];
        let r = resolver();
        assert_eq!(
            card_image(&trip, &images, &r),
            r.resolve(Some("gallery/t.png"))
        );
    }

    #[test]
    fn card_uses_flagged_thumbnail_without_pointer() {
        let mut trip = trip_model(1, "Negev Trek", TripStatus::Show);
        trip.brochure_image_path = Some("brochures/b.png".into());
        let mut flagged = image_model(2, trip.id, "gallery/t.png");
        flagged.is_thumbnail = true;
        let images = vec![image_model(1, trip.id, "gallery/g.png"), flagged];
        let r = resolver();
        assert_eq!(
            card_image(&trip, &images, &r),
            r.resolve(Some("gallery/t.png"))
        );
    }

    #[test]
    fn card_falls_back_to_brochure() {
        let mut trip = trip_model(1, "Negev Trek", TripStatus::Show);
        trip.brochure_image_path = Some("brochures/b.png".into());
        let images = vec![image_model(1, trip.id, "gallery/g.png")];
        let r = resolver();
        assert_eq!(
            card_image(&trip, &images, &r),
            r.resolve(Some("brochures/b.png"))
        );
    }

    #[test]
    fn dangling_thumbnail_pointer_falls_back_to_brochure() {
        let mut trip = trip_model(1, "Negev Trek", TripStatus::Show);
        trip.brochure_image_path = Some("brochures/b.png".into());
        trip.thumbnail_image = Some("gallery/deleted.png".into());
        let r = resolver();
        assert_eq!(card_image(&trip, &[], &r), r.resolve(Some("brochures/b.png")));
    }

    #[test]
    fn card_uses_flyer_image_when_no_brochure_column() {
        let trip = trip_model(1, "Negev Trek", TripStatus::Show);
        let mut flyer = image_model(1, trip.id, "gallery/f.png");
        flyer.is_flyer = true;
        let r = resolver();
        assert_eq!(
            card_image(&trip, &[flyer], &r),
            r.resolve(Some("gallery/f.png"))
        );
    }

    #[test]
    fn card_defaults_without_any_image() {
        let mut trip = trip_model(1, "Negev Trek", TripStatus::Show);
        trip.brochure_image_path = Some("".into());
        let images = vec![image_model(1, trip.id, "gallery/g.png")];
        assert_eq!(card_image(&trip, &images, &resolver()), DEFAULT_IMAGE);
    }

    fn view(id: i32, path: &str, is_flyer: bool) -> TripImageView {
        TripImageView {
            id,
            path: path.to_string(),
            url: resolver().resolve(Some(path)),
            is_thumbnail: false,
            is_flyer,
        }
    }

    #[test]
    fn splits_first_flyer_from_gallery() {
        let images = vec![
            view(1, "gallery/g.png", false),
            view(2, "gallery/f.png", true),
            view(3, "gallery/f2.png", true),
        ];
        let (flyer, gallery) = split_flyer(&images);
        assert_eq!(flyer.map(|f| f.id), Some(2));
        let ids: Vec<i32> = gallery.iter().map(|img| img.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn split_without_flyer_keeps_everything_in_gallery() {
        let images = vec![view(1, "gallery/a.png", false), view(2, "gallery/b.png", false)];
        let (flyer, gallery) = split_flyer(&images);
        assert!(flyer.is_none());
        assert_eq!(gallery.len(), 2);
    }
}
