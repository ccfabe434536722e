use axum_login::tower_sessions::Session;
use serde::{Deserialize, Serialize};

use crate::entities::sea_orm_active_enums::{TripGender, TripLocation};
use crate::error::AppError;

pub mod admin;
pub mod api;
pub mod trips;

const FLASH_KEY: &str = "flash.notices";

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

pub async fn flash(
    session: &Session,
    kind: NoticeKind,
    message: impl Into<String>,
) -> Result<(), AppError> {
    let mut notices: Vec<Notice> = session.get(FLASH_KEY).await?.unwrap_or_default();
    notices.push(Notice {
        kind,
        message: message.into(),
    });
    session.insert(FLASH_KEY, notices).await?;
    Ok(())
}

pub async fn take_flash(session: &Session) -> Result<Vec<Notice>, AppError> {
    Ok(session
        .remove::<Vec<Notice>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn location_options() -> Vec<SelectOption> {
    [
        TripLocation::UnitedStates,
        TripLocation::International,
        TripLocation::Israel,
    ]
    .iter()
    .map(|l| SelectOption {
        value: l.as_str(),
        label: l.label(),
    })
    .collect()
}

pub fn gender_options() -> Vec<SelectOption> {
    [TripGender::Mixed, TripGender::Male, TripGender::Female]
        .iter()
        .map(|g| SelectOption {
            value: g.as_str(),
            label: g.label(),
        })
        .collect()
}
