//! Parsing and validating the admin trip form.
//!
//! Everything here runs before any storage or database call, so a rejected form
//! never leaves anything behind.

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::Url;
use validator::{Validate, ValidationError};

use crate::entities::sea_orm_active_enums::{TripGender, TripLocation};

use super::FieldError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form values after type conversion, before validation.
#[derive(Debug, Clone, Default, Validate)]
#[validate(schema(function = "validate_date_range", skip_on_field_errors = false))]
pub struct TripForm {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(required(message = "Start date is required"))]
    pub start_date: Option<NaiveDate>,
    #[validate(required(message = "End date is required"))]
    pub end_date: Option<NaiveDate>,
    #[validate(required(message = "Pick a location"))]
    pub location: Option<TripLocation>,
    #[validate(required(message = "Pick who the trip is for"))]
    pub gender: Option<TripGender>,
    #[validate(range(min = 1, message = "Spots must be at least 1"))]
    pub spots: Option<i32>,
    #[validate(length(max = 100, message = "Price is too long"))]
    pub price: Option<String>,
    #[validate(url(message = "Website must be a full URL"))]
    pub website_url: Option<String>,
    #[validate(length(min = 1, message = "Organizer name is required"))]
    pub organizer_name: String,
    #[validate(length(min = 1, message = "Organizer contact is required"))]
    pub organizer_contact: String,
    pub is_internship: bool,
    pub video_links: Vec<String>,
}

fn validate_date_range(form: &TripForm) -> Result<(), ValidationError> {
    match (form.start_date, form.end_date) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::new("date_range")
            .with_message("End date must not be before the start date".into())),
        _ => Ok(()),
    }
}

/// A validated trip, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInput {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: TripLocation,
    pub gender: TripGender,
    pub spots: Option<i32>,
    pub price: Option<String>,
    pub website_url: Option<String>,
    pub organizer_name: String,
    pub organizer_contact: String,
    pub is_internship: bool,
    pub video_links: Vec<String>,
}

/// Video links must be absolute http(s) URLs.
pub fn validate_video_link(link: &str) -> Result<(), FieldError> {
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(FieldError::new(
            "video_links",
            format!("`{link}` is not a valid video link"),
        )),
    }
}

fn text(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parsed<T, E>(
    fields: &HashMap<String, String>,
    name: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = text(fields, name)?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(name, message));
            None
        }
    }
}

impl TripForm {
    /// Converts raw form fields, collecting conversion errors separately.
    pub fn from_fields(fields: &HashMap<String, String>) -> (TripForm, Vec<FieldError>) {
        let mut errors = Vec::new();
        let form = TripForm {
            name: text(fields, "name").unwrap_or_default(),
            description: text(fields, "description"),
            start_date: parsed(
                fields,
                "start_date",
                |s| NaiveDate::parse_from_str(s, DATE_FORMAT),
                "Start date must look like 2025-06-30",
                &mut errors,
            ),
            end_date: parsed(
                fields,
                "end_date",
                |s| NaiveDate::parse_from_str(s, DATE_FORMAT),
                "End date must look like 2025-06-30",
                &mut errors,
            ),
            location: parsed(
                fields,
                "location",
                str::parse::<TripLocation>,
                "Unknown location",
                &mut errors,
            ),
            gender: parsed(
                fields,
                "gender",
                str::parse::<TripGender>,
                "Unknown gender option",
                &mut errors,
            ),
            spots: parsed(
                fields,
                "spots",
                str::parse::<i32>,
                "Spots must be a whole number",
                &mut errors,
            ),
            price: text(fields, "price"),
            website_url: text(fields, "website_url"),
            organizer_name: text(fields, "organizer_name").unwrap_or_default(),
            organizer_contact: text(fields, "organizer_contact").unwrap_or_default(),
            is_internship: fields
                .get("is_internship")
                .is_some_and(|v| matches!(v.trim(), "on" | "true")),
            video_links: fields
                .get("video_links")
                .map(|raw| {
                    raw.lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };
        (form, errors)
    }
}

/// Parses and validates the trip form.
///
/// Errors are keyed by form field name and sorted, one entry per problem.
pub fn parse_trip_form(fields: &HashMap<String, String>) -> Result<TripInput, Vec<FieldError>> {
    let (form, mut errors) = TripForm::from_fields(fields);

    if let Err(validation) = form.validate() {
        for (field, field_errors) in validation.field_errors() {
            let field: &str = &field;
            let field = match field {
                "__all__" => "end_date",
                other => other,
            };
            if errors.iter().any(|e| e.field == field) {
                continue;
            }
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {field}"));
                errors.push(FieldError::new(field, message));
            }
        }
    }
    for link in &form.video_links {
        if let Err(e) = validate_video_link(link) {
            errors.push(e);
        }
    }

    match form {
        TripForm {
            name,
            description,
            start_date: Some(start_date),
            end_date: Some(end_date),
            location: Some(location),
            gender: Some(gender),
            spots,
            price,
            website_url,
            organizer_name,
            organizer_contact,
            is_internship,
            video_links,
        } if errors.is_empty() => Ok(TripInput {
            name,
            description,
            start_date,
            end_date,
            location,
            gender,
            spots,
            price,
            website_url,
            organizer_name,
            organizer_contact,
            is_internship,
            video_links,
        }),
        _ => {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            Err(errors)
        }
    }
}
