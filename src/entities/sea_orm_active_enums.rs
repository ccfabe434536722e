use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visibility of a trip. `Deleted` is a soft delete.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TripStatus {
    #[sea_orm(string_value = "Show")]
    Show,
    #[default]
    #[sea_orm(string_value = "Hidden")]
    Hidden,
    #[sea_orm(string_value = "Deleted")]
    Deleted,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TripLocation {
    #[sea_orm(string_value = "united_states")]
    UnitedStates,
    #[sea_orm(string_value = "international")]
    International,
    #[sea_orm(string_value = "israel")]
    Israel,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TripGender {
    #[sea_orm(string_value = "mixed")]
    Mixed,
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Show => "Show",
            TripStatus::Hidden => "Hidden",
            TripStatus::Deleted => "Deleted",
        }
    }
}

impl FromStr for TripStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Show" => Ok(TripStatus::Show),
            "Hidden" => Ok(TripStatus::Hidden),
            "Deleted" => Ok(TripStatus::Deleted),
            _ => Err(UnknownVariant {
                kind: "trip status",
                value: s.to_string(),
            }),
        }
    }
}

impl TripLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripLocation::UnitedStates => "united_states",
            TripLocation::International => "international",
            TripLocation::Israel => "israel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripLocation::UnitedStates => "United States",
            TripLocation::International => "International",
            TripLocation::Israel => "Israel",
        }
    }
}

impl FromStr for TripLocation {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "united_states" => Ok(TripLocation::UnitedStates),
            "international" => Ok(TripLocation::International),
            "israel" => Ok(TripLocation::Israel),
            _ => Err(UnknownVariant {
                kind: "location",
                value: s.to_string(),
            }),
        }
    }
}

impl TripGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripGender::Mixed => "mixed",
            TripGender::Male => "male",
            TripGender::Female => "female",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripGender::Mixed => "Co-ed",
            TripGender::Male => "Men",
            TripGender::Female => "Women",
        }
    }
}

impl FromStr for TripGender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mixed" => Ok(TripGender::Mixed),
            "male" => Ok(TripGender::Male),
            "female" => Ok(TripGender::Female),
            _ => Err(UnknownVariant {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [TripStatus::Show, TripStatus::Hidden, TripStatus::Deleted] {
            assert_eq!(status.as_str().parse::<TripStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "Archived".parse::<TripStatus>().unwrap_err();
        assert_eq!(err.value, "Archived");
        assert!("show".parse::<TripStatus>().is_err());
    }

    #[test]
    fn new_trips_default_to_hidden() {
        assert_eq!(TripStatus::default(), TripStatus::Hidden);
    }

    #[test]
    fn location_and_gender_parse_their_stored_values() {
        assert_eq!("united_states".parse(), Ok(TripLocation::UnitedStates));
        assert_eq!("female".parse(), Ok(TripGender::Female));
        assert!("us".parse::<TripLocation>().is_err());
    }

    #[test]
    fn serde_uses_stored_values() {
        assert_eq!(
            serde_json::to_string(&TripLocation::UnitedStates).unwrap(),
            "\"united_states\""
        );
        assert_eq!(serde_json::to_string(&TripStatus::Deleted).unwrap(), "\"Deleted\"");
    }
}
