use sea_orm::{ColumnTrait, Condition};

use crate::entities::sea_orm_active_enums::TripStatus;
use crate::entities::trip;

/// Which statuses a listing may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    Public,
    Admin { show_deleted: bool },
}

impl ListingScope {
    pub fn statuses(self) -> &'static [TripStatus] {
        match self {
            ListingScope::Public => &[TripStatus::Show],
            ListingScope::Admin {
                show_deleted: false,
            } => &[TripStatus::Show, TripStatus::Hidden],
            ListingScope::Admin { show_deleted: true } => {
                &[TripStatus::Show, TripStatus::Hidden, TripStatus::Deleted]
            }
        }
    }

    pub fn includes(self, status: TripStatus) -> bool {
        self.statuses().contains(&status)
    }

    pub fn condition(self) -> Condition {
        Condition::all().add(trip::Column::ShowTrip.is_in(self.statuses().iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_scope_only_shows_visible_trips() {
        let scope = ListingScope::Public;
        assert!(scope.includes(TripStatus::Show));
        assert!(!scope.includes(TripStatus::Hidden));
        assert!(!scope.includes(TripStatus::Deleted));
    }

    #[test]
    fn admin_scope_hides_deleted_unless_asked() {
        let default = ListingScope::Admin {
            show_deleted: false,
        };
        assert!(default.includes(TripStatus::Hidden));
        assert!(!default.includes(TripStatus::Deleted));

        let all = ListingScope::Admin { show_deleted: true };
        assert!(all.includes(TripStatus::Deleted));
        assert_eq!(all.statuses().len(), 3);
    }
}
