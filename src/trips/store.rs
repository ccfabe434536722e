//! Trip queries and the status transition.

use chrono::{Months, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::sea_orm_active_enums::{TripGender, TripLocation, TripStatus};
use crate::entities::{trip, trip_image, trip_video};

use super::{ListingScope, TripError, TripRecord};

/// Filters offered on the public listing. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    pub location: Option<TripLocation>,
    pub gender: Option<TripGender>,
    /// First day of the month a trip has to overlap.
    pub month: Option<NaiveDate>,
    pub internship: Option<bool>,
}

impl TripFilter {
    /// Builds a filter from query string values; blank or unparseable values are ignored.
    pub fn from_query(
        location: Option<&str>,
        gender: Option<&str>,
        month: Option<&str>,
        internship: Option<&str>,
    ) -> Self {
        fn value(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }
        TripFilter {
            location: value(location).and_then(|v| v.parse().ok()),
            gender: value(gender).and_then(|v| v.parse().ok()),
            month: value(month)
                .and_then(|v| NaiveDate::parse_from_str(&format!("{v}-01"), "%Y-%m-%d").ok()),
            internship: value(internship).and_then(|v| match v {
                "true" | "on" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TripFilter::default()
    }

    /// First and last day of the filtered month.
    pub fn month_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.month?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        Some((first, last))
    }

    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(location) = self.location {
            cond = cond.add(trip::Column::Location.eq(location));
        }
        if let Some(gender) = self.gender {
            cond = cond.add(trip::Column::Gender.eq(gender));
        }
        if let Some((first, last)) = self.month_range() {
            cond = cond
                .add(trip::Column::StartDate.lte(last))
                .add(trip::Column::EndDate.gte(first));
        }
        match self.internship {
            Some(true) => cond = cond.add(trip::Column::IsInternship.eq(true)),
            Some(false) => {
                cond = cond.add(
                    Condition::any()
                        .add(trip::Column::IsInternship.eq(false))
                        .add(trip::Column::IsInternship.is_null()),
                )
            }
            None => {}
        }
        cond
    }
}

/// Trips in `scope` matching `filter`, soonest first, with their images.
///
/// Videos are left out; listings never show them.
pub async fn list_trips<C: ConnectionTrait>(
    db: &C,
    scope: ListingScope,
    filter: &TripFilter,
) -> Result<Vec<TripRecord>, TripError> {
    let trips = trip::Entity::find()
        .filter(scope.condition())
        .filter(filter.condition())
        .order_by_asc(trip::Column::StartDate)
        .order_by_asc(trip::Column::TripId)
        .all(db)
        .await?;
    let images = trips
        .load_many(
            trip_image::Entity::find().order_by_asc(trip_image::Column::Id),
            db,
        )
        .await?;

    Ok(trips
        .into_iter()
        .zip(images)
        .map(|(trip, images)| TripRecord {
            trip,
            images,
            videos: Vec::new(),
        })
        .collect())
}

async fn load_record<C: ConnectionTrait>(db: &C, trip: trip::Model) -> Result<TripRecord, TripError> {
    let images = trip
        .find_related(trip_image::Entity)
        .order_by_asc(trip_image::Column::Id)
        .all(db)
        .await?;
    let videos = trip
        .find_related(trip_video::Entity)
        .order_by_asc(trip_video::Column::Id)
        .all(db)
        .await?;
    Ok(TripRecord {
        trip,
        images,
        videos,
    })
}

/// Looks a trip up by its public `trip_id`, within `scope`.
pub async fn find_by_trip_id<C: ConnectionTrait>(
    db: &C,
    trip_id: i32,
    scope: ListingScope,
) -> Result<TripRecord, TripError> {
    let trip = trip::Entity::find()
        .filter(trip::Column::TripId.eq(trip_id))
        .filter(scope.condition())
        .one(db)
        .await?
        .ok_or(TripError::NotFound)?;
    load_record(db, trip).await
}

/// Looks a trip up by its internal id, whatever its status.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<TripRecord, TripError> {
    let trip = trip::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(TripError::NotFound)?;
    load_record(db, trip).await
}

/// Next public trip id: one past the highest ever handed out, deleted trips included.
pub async fn next_trip_id<C: ConnectionTrait>(db: &C) -> Result<i32, TripError> {
    let last = trip::Entity::find()
        .order_by_desc(trip::Column::TripId)
        .one(db)
        .await?;
    Ok(last.map_or(1, |t| t.trip_id + 1))
}

pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status: TripStatus,
) -> Result<trip::Model, TripError> {
    let trip = trip::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(TripError::NotFound)?;
    let previous = trip.show_trip;

    let mut active: trip::ActiveModel = trip.into();
    active.show_trip = Set(status);
    active.updated_at = Set(Utc::now().naive_utc());
    let trip = active.update(db).await?;

    info!(
        "Trip {} status {} -> {}",
        trip.trip_id,
        previous.as_str(),
        status.as_str()
    );
    Ok(trip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, insert_image, insert_trip, test_db, trip_model};

    fn names(records: &[TripRecord]) -> Vec<&str> {
        records.iter().map(|r| r.trip.name.as_str()).collect()
    }

    #[tokio::test]
    async fn public_listing_excludes_hidden_and_deleted() {
        let db = test_db().await;
        insert_trip(&db, trip_model(1, "Shown", TripStatus::Show)).await;
        insert_trip(&db, trip_model(2, "Hidden", TripStatus::Hidden)).await;
        insert_trip(&db, trip_model(3, "Deleted", TripStatus::Deleted)).await;

        let public = list_trips(&db, ListingScope::Public, &TripFilter::default())
            .await
            .unwrap();
        assert_eq!(names(&public), vec!["Shown"]);

        let admin = list_trips(
            &db,
            ListingScope::Admin {
                show_deleted: false,
            },
            &TripFilter::default(),
        )
        .await
        .unwrap();
        assert_eq!(names(&admin), vec!["Shown", "Hidden"]);

        let everything = list_trips(
            &db,
            ListingScope::Admin { show_deleted: true },
            &TripFilter::default(),
        )
        .await
        .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn listing_orders_by_start_date_and_loads_images() {
        let db = test_db().await;
        let mut late = trip_model(1, "Late", TripStatus::Show);
        late.start_date = date(2025, 9, 1);
        late.end_date = date(2025, 9, 10);
        let late = insert_trip(&db, late).await;
        let early = insert_trip(&db, trip_model(2, "Early", TripStatus::Show)).await;
        insert_image(&db, late.id, "gallery/late.png", false, false).await;
        insert_image(&db, early.id, "gallery/e1.png", false, false).await;
        insert_image(&db, early.id, "gallery/e2.png", false, false).await;

        let trips = list_trips(&db, ListingScope::Public, &TripFilter::default())
            .await
            .unwrap();

        assert_eq!(names(&trips), vec!["Early", "Late"]);
        assert_eq!(trips[0].images.len(), 2);
        assert_eq!(trips[1].images[0].image_path, "gallery/late.png");
    }

    #[tokio::test]
    async fn filters_by_location_gender_month_and_internship() {
        let db = test_db().await;
        let mut us = trip_model(1, "Boston Internship", TripStatus::Show);
        us.location = TripLocation::UnitedStates;
        us.gender = TripGender::Male;
        us.start_date = date(2025, 5, 25);
        us.end_date = date(2025, 6, 3);
        us.is_internship = Some(true);
        insert_trip(&db, us).await;
        let mut abroad = trip_model(2, "Prague Seminar", TripStatus::Show);
        abroad.location = TripLocation::International;
        abroad.start_date = date(2025, 8, 1);
        abroad.end_date = date(2025, 8, 20);
        insert_trip(&db, abroad).await;
        insert_trip(&db, trip_model(3, "Israel Summer", TripStatus::Show)).await;

        let run = |filter: TripFilter| {
            let db = db.clone();
            async move {
                let trips = list_trips(&db, ListingScope::Public, &filter).await.unwrap();
                trips.into_iter().map(|r| r.trip.name).collect::<Vec<_>>()
            }
        };

        let by_location = TripFilter::from_query(Some("international"), None, None, None);
        assert_eq!(run(by_location).await, vec!["Prague Seminar"]);

        let by_gender = TripFilter::from_query(None, Some("male"), None, None);
        assert_eq!(run(by_gender).await, vec!["Boston Internship"]);

        let june = TripFilter::from_query(None, None, Some("2025-06"), None);
        assert_eq!(run(june).await, vec!["Boston Internship"]);

        let july = TripFilter::from_query(None, None, Some("2025-07"), None);
        assert_eq!(run(july).await, vec!["Israel Summer"]);

        let internships = TripFilter::from_query(None, None, None, Some("true"));
        assert_eq!(run(internships).await, vec!["Boston Internship"]);

        let not_internships = TripFilter::from_query(None, None, None, Some("false"));
        assert_eq!(
            run(not_internships).await,
            vec!["Israel Summer", "Prague Seminar"]
        );
    }

    #[test]
    fn ignores_unusable_query_values() {
        let filter = TripFilter::from_query(Some("mars"), Some(""), Some("June"), Some("maybe"));
        assert!(filter.is_empty());

        let dec = TripFilter::from_query(None, None, Some("2025-12"), None);
        assert_eq!(
            dec.month_range(),
            Some((date(2025, 12, 1), date(2025, 12, 31)))
        );
    }

    #[tokio::test]
    async fn next_trip_id_counts_deleted_trips() {
        let db = test_db().await;
        assert_eq!(next_trip_id(&db).await.unwrap(), 1);
        insert_trip(&db, trip_model(4, "Four", TripStatus::Show)).await;
        insert_trip(&db, trip_model(9, "Nine", TripStatus::Deleted)).await;
        assert_eq!(next_trip_id(&db).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn finds_trip_within_scope() {
        let db = test_db().await;
        let hidden = insert_trip(&db, trip_model(5, "Hidden", TripStatus::Hidden)).await;

        let err = find_by_trip_id(&db, 5, ListingScope::Public).await.unwrap_err();
        assert!(matches!(err, TripError::NotFound));

        let record = find_by_trip_id(
            &db,
            5,
            ListingScope::Admin {
                show_deleted: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(record.trip.id, hidden.id);
        assert!(matches!(
            find_by_id(&db, hidden.id + 100).await,
            Err(TripError::NotFound)
        ));
    }

    #[tokio::test]
    async fn status_lifecycle_moves_trip_between_listings() {
        let db = test_db().await;
        let trip = insert_trip(&db, trip_model(1, "Trip A", TripStatus::Hidden)).await;
        let admin = ListingScope::Admin {
            show_deleted: false,
        };
        let all = ListingScope::Admin { show_deleted: true };
        let none = TripFilter::default();

        assert!(list_trips(&db, ListingScope::Public, &none).await.unwrap().is_empty());

        set_status(&db, trip.id, TripStatus::Show).await.unwrap();
        assert_eq!(
            names(&list_trips(&db, ListingScope::Public, &none).await.unwrap()),
            vec!["Trip A"]
        );

        let deleted = set_status(&db, trip.id, TripStatus::Deleted).await.unwrap();
        assert_eq!(deleted.show_trip, TripStatus::Deleted);
        assert!(list_trips(&db, ListingScope::Public, &none).await.unwrap().is_empty());
        assert!(list_trips(&db, admin, &none).await.unwrap().is_empty());
        assert_eq!(list_trips(&db, all, &none).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_of_missing_trip_is_not_found() {
        let db = test_db().await;
        let err = set_status(&db, 42, TripStatus::Show).await.unwrap_err();
        assert!(matches!(err, TripError::NotFound));
    }
}
