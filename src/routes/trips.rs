use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use minijinja::context;
use serde::Deserialize;

use crate::error::AppError;
use crate::router::AppState;
use crate::routes::{gender_options, location_options};
use crate::trips::images::split_flyer;
use crate::trips::store::{self, TripFilter};
use crate::trips::{ListingScope, TripView};

/// Query string of the public listing. Values stay raw so the form can echo them.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub location: Option<String>,
    pub gender: Option<String>,
    pub month: Option<String>,
    pub internship: Option<String>,
}

impl ListingQuery {
    pub fn filter(&self) -> TripFilter {
        TripFilter::from_query(
            self.location.as_deref(),
            self.gender.as_deref(),
            self.month.as_deref(),
            self.internship.as_deref(),
        )
    }
}

pub(crate) async fn public_views(
    state: &AppState,
    filter: &TripFilter,
) -> Result<Vec<TripView>, AppError> {
    let records = store::list_trips(&state.db, ListingScope::Public, filter).await?;
    Ok(records.iter().map(|r| r.view(&state.resolver)).collect())
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Html<String>, AppError> {
    let filter = query.filter();
    let trips = public_views(&state, &filter).await?;

    state.render(
        "index.html",
        context! {
            trips => trips,
            filter => context! {
                location => filter.location.map(|l| l.as_str()),
                gender => filter.gender.map(|g| g.as_str()),
                month => filter.month.map(|m| m.format("%Y-%m").to_string()),
                internship => query.internship.as_deref().unwrap_or_default(),
                active => !filter.is_empty(),
            },
            locations => location_options(),
            genders => gender_options(),
        },
    )
}

pub async fn detail(
    State(state): State<AppState>,
    Path(trip_id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let record = store::find_by_trip_id(&state.db, trip_id, ListingScope::Public).await?;
    let trip = record.view(&state.resolver);
    let (flyer, gallery) = split_flyer(&trip.images);

    state.render(
        "trip.html",
        context! {
            trip => &trip,
            flyer => flyer,
            gallery => gallery,
        },
    )
}
