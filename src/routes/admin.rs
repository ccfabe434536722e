use std::collections::HashMap;

use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_login::tower_sessions::Session;
use minijinja::{Value, context};
use serde::Deserialize;
use tracing::error;

use crate::entities::sea_orm_active_enums::TripStatus;
use crate::error::AppError;
use crate::router::AppState;
use crate::routes::{Notice, NoticeKind, flash, gender_options, location_options, take_flash};
use crate::trips::authoring::{self, TripUploads, Upload};
use crate::trips::form::parse_trip_form;
use crate::trips::store::{self, TripFilter};
use crate::trips::{FieldError, ListingScope, TripError, TripRecord, TripView, duplicate};

const BROCHURE_FIELD: &str = "brochure";
const GALLERY_FIELD: &str = "gallery";

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub show_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub show_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailForm {
    pub image_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlyerForm {
    pub is_flyer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoForm {
    pub video_url: String,
}

fn edit_url(id: i32) -> String {
    format!("/admin/trips/{id}/edit")
}

fn admin_url(show_deleted: bool) -> &'static str {
    if show_deleted {
        "/admin?show_deleted=true"
    } else {
        "/admin"
    }
}

/// Turns an upstream failure into an error notice. A missing record stays a 404.
async fn report_failure(
    session: &Session,
    action: &str,
    err: TripError,
) -> Result<(), AppError> {
    match err {
        TripError::NotFound => Err(AppError::NotFound),
        TripError::Validation(errors) => {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(" ");
            flash(session, NoticeKind::Error, message).await
        }
        err => {
            error!("Failed to {}: {}", action, err);
            flash(
                session,
                NoticeKind::Error,
                format!("Could not {action}. Please try again."),
            )
            .await
        }
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AdminQuery>,
) -> Result<Html<String>, AppError> {
    let show_deleted = query.show_deleted.unwrap_or(false);
    let records = store::list_trips(
        &state.db,
        ListingScope::Admin { show_deleted },
        &TripFilter::default(),
    )
    .await?;
    let trips: Vec<TripView> = records.iter().map(|r| r.view(&state.resolver)).collect();

    state.render(
        "admin/trips.html",
        context! {
            trips => trips,
            show_deleted => show_deleted,
            statuses => [TripStatus::Show, TripStatus::Hidden, TripStatus::Deleted]
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
            notices => take_flash(&session).await?,
        },
    )
}

/// Splits the multipart trip form into text fields and uploaded files.
async fn read_trip_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, TripUploads), AppError> {
    let mut fields = HashMap::new();
    let mut uploads = TripUploads::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == BROCHURE_FIELD || name == GALLERY_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            // Browsers send an empty part when no file was picked
            if file_name.is_empty() || data.is_empty() {
                continue;
            }
            let upload = Upload {
                file_name,
                content_type,
                data: data.to_vec(),
            };
            if name == BROCHURE_FIELD {
                uploads.brochure = Some(upload);
            } else {
                uploads.gallery.push(upload);
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            fields.insert(name, value);
        }
    }
    Ok((fields, uploads))
}

fn render_form(
    state: &AppState,
    status: StatusCode,
    record: Option<&TripRecord>,
    values: &HashMap<String, String>,
    errors: &[FieldError],
    notices: Value,
) -> Result<Response, AppError> {
    let errors: HashMap<&str, &str> = errors
        .iter()
        .map(|e| (e.field.as_str(), e.message.as_str()))
        .collect();
    let html = state.render(
        "admin/trip_form.html",
        context! {
            trip => record.map(|r| r.view(&state.resolver)),
            videos => record.map(|r| r.videos.as_slice()).unwrap_or_default(),
            values => values,
            errors => errors,
            locations => location_options(),
            genders => gender_options(),
            notices => notices,
        },
    )?;
    Ok((status, html).into_response())
}

fn no_notices() -> Value {
    Value::from(Vec::<Value>::new())
}

/// Files attached to a rejected form are not kept; ask for them again.
fn rejected_form_notices(uploads: &TripUploads) -> Value {
    if uploads.is_empty() {
        return no_notices();
    }
    Value::from_serialize(vec![Notice {
        kind: NoticeKind::Error,
        message: "Attached images were not saved, please select them again".to_string(),
    }])
}

/// Form values that reproduce the stored trip.
fn values_of(trip: &TripView) -> HashMap<String, String> {
    let mut values = HashMap::from([
        ("name".to_string(), trip.name.clone()),
        ("description".to_string(), trip.description.clone()),
        ("start_date".to_string(), trip.start_date.to_string()),
        ("end_date".to_string(), trip.end_date.to_string()),
        ("location".to_string(), trip.location.as_str().to_string()),
        ("gender".to_string(), trip.gender.as_str().to_string()),
        ("organizer_name".to_string(), trip.organizer.name.clone()),
        ("organizer_contact".to_string(), trip.organizer.contact.clone()),
        ("video_links".to_string(), trip.video_links.join("\n")),
    ]);
    if let Some(spots) = trip.spots {
        values.insert("spots".into(), spots.to_string());
    }
    if let Some(price) = &trip.price {
        values.insert("price".into(), price.clone());
    }
    if let Some(url) = &trip.website_url {
        values.insert("website_url".into(), url.clone());
    }
    if trip.is_internship {
        values.insert("is_internship".into(), "on".into());
    }
    values
}

pub async fn new_trip(State(state): State<AppState>) -> Result<Response, AppError> {
    render_form(
        &state,
        StatusCode::OK,
        None,
        &HashMap::new(),
        &[],
        no_notices(),
    )
}

pub async fn create_trip(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (fields, uploads) = read_trip_form(multipart).await?;
    let input = match parse_trip_form(&fields) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                None,
                &fields,
                &errors,
                rejected_form_notices(&uploads),
            );
        }
    };

    match authoring::create_trip(&state.db, state.store.as_ref(), input, uploads).await {
        Ok(trip) => {
            flash(
                &session,
                NoticeKind::Success,
                format!("Created trip #{} (hidden until you show it)", trip.trip_id),
            )
            .await?;
            Ok(Redirect::to(&edit_url(trip.id)).into_response())
        }
        Err(e) => {
            report_failure(&session, "create the trip", e).await?;
            let notices = Value::from_serialize(take_flash(&session).await?);
            render_form(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                &fields,
                &[],
                notices,
            )
        }
    }
}

pub async fn edit_trip(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let record = store::find_by_id(&state.db, id).await?;
    let values = values_of(&record.view(&state.resolver));
    let notices = Value::from_serialize(take_flash(&session).await?);
    render_form(
        &state,
        StatusCode::OK,
        Some(&record),
        &values,
        &[],
        notices,
    )
}

pub async fn update_trip(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let record = store::find_by_id(&state.db, id).await?;
    let (fields, uploads) = read_trip_form(multipart).await?;
    let input = match parse_trip_form(&fields) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(&record),
                &fields,
                &errors,
                rejected_form_notices(&uploads),
            );
        }
    };

    match authoring::update_trip(&state.db, state.store.as_ref(), id, input, uploads).await {
        Ok(_) => flash(&session, NoticeKind::Success, "Trip saved").await?,
        Err(e) => report_failure(&session, "save the trip", e).await?,
    }
    Ok(Redirect::to(&edit_url(id)).into_response())
}

pub async fn set_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let status = form
        .status
        .parse::<TripStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    match store::set_status(&state.db, id, status).await {
        Ok(trip) => {
            flash(
                &session,
                NoticeKind::Success,
                format!("Trip #{} is now {}", trip.trip_id, status.as_str()),
            )
            .await?
        }
        Err(e) => report_failure(&session, "change the trip status", e).await?,
    }
    Ok(Redirect::to(admin_url(form.show_deleted.unwrap_or(false))))
}

pub async fn duplicate_trip(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    match duplicate::duplicate_trip(&state.db, state.store.as_ref(), id).await {
        Ok(copy) => {
            flash(
                &session,
                NoticeKind::Success,
                format!("Created {} as trip #{}", copy.name, copy.trip_id),
            )
            .await?;
            Ok(Redirect::to(&edit_url(copy.id)))
        }
        Err(e) => {
            report_failure(&session, "duplicate the trip", e).await?;
            Ok(Redirect::to(admin_url(false)))
        }
    }
}

pub async fn select_thumbnail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<ThumbnailForm>,
) -> Result<Redirect, AppError> {
    let image_id = match form.image_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| AppError::BadRequest(format!("invalid image id `{raw}`")))?,
        ),
    };
    match authoring::select_thumbnail(&state.db, id, image_id).await {
        Ok(_) => flash(&session, NoticeKind::Success, "Thumbnail updated").await?,
        Err(e) => report_failure(&session, "update the thumbnail", e).await?,
    }
    Ok(Redirect::to(&edit_url(id)))
}

pub async fn set_flyer(
    State(state): State<AppState>,
    session: Session,
    Path(image_id): Path<i32>,
    Form(form): Form<FlyerForm>,
) -> Result<Redirect, AppError> {
    let is_flyer = matches!(form.is_flyer.as_deref(), Some("on" | "true"));
    match authoring::set_flyer(&state.db, image_id, is_flyer).await {
        Ok(image) => {
            flash(&session, NoticeKind::Success, "Flyer updated").await?;
            Ok(Redirect::to(&edit_url(image.trip_id)))
        }
        Err(e) => {
            report_failure(&session, "update the flyer", e).await?;
            Ok(Redirect::to(admin_url(false)))
        }
    }
}

pub async fn delete_image(
    State(state): State<AppState>,
    session: Session,
    Path(image_id): Path<i32>,
) -> Result<Redirect, AppError> {
    match authoring::delete_image(&state.db, state.store.as_ref(), image_id).await {
        Ok(trip_pk) => {
            flash(&session, NoticeKind::Success, "Image removed").await?;
            Ok(Redirect::to(&edit_url(trip_pk)))
        }
        Err(e) => {
            report_failure(&session, "remove the image", e).await?;
            Ok(Redirect::to(admin_url(false)))
        }
    }
}

pub async fn add_video(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<VideoForm>,
) -> Result<Redirect, AppError> {
    match authoring::add_video(&state.db, id, &form.video_url).await {
        Ok(_) => flash(&session, NoticeKind::Success, "Video added").await?,
        Err(e) => report_failure(&session, "add the video", e).await?,
    }
    Ok(Redirect::to(&edit_url(id)))
}

pub async fn delete_video(
    State(state): State<AppState>,
    session: Session,
    Path(video_id): Path<i32>,
) -> Result<Redirect, AppError> {
    match authoring::delete_video(&state.db, video_id).await {
        Ok(trip_pk) => {
            flash(&session, NoticeKind::Success, "Video removed").await?;
            Ok(Redirect::to(&edit_url(trip_pk)))
        }
        Err(e) => {
            report_failure(&session, "remove the video", e).await?;
            Ok(Redirect::to(admin_url(false)))
        }
    }
}
