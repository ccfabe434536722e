use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::error::AppError;
use crate::router::AppState;
use crate::routes::trips::{ListingQuery, public_views};
use crate::trips::store;
use crate::trips::{ListingScope, TripView};

pub async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<TripView>>, AppError> {
    Ok(Json(public_views(&state, &query.filter()).await?))
}

pub async fn show_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i32>,
) -> Result<Json<TripView>, AppError> {
    let record = store::find_by_trip_id(&state.db, trip_id, ListingScope::Public).await?;
    Ok(Json(record.view(&state.resolver)))
}
