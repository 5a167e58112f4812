//! Server-side sessions.
//!
//! A session is an opaque token handed to the client after a successful
//! login. The token maps to a [`Principal`] until it expires or is closed.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Who a session belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Principal {
    Voter(i32),
    Admin(i32),
}

impl Principal {
    pub(crate) fn role(self) -> &'static str {
        match self {
            Self::Voter(_) => "voter",
            Self::Admin(_) => "admin",
        }
    }

    pub(crate) fn subject_id(self) -> i32 {
        match self {
            Self::Voter(id) | Self::Admin(id) => id,
        }
    }

    pub(crate) fn from_row(role: &str, subject_id: i32) -> Option<Self> {
        match role {
            "voter" => Some(Self::Voter(subject_id)),
            "admin" => Some(Self::Admin(subject_id)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    pub role: String,
    pub subject_id: i32,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_round_trips_through_row_fields() {
        for principal in [Principal::Voter(7), Principal::Admin(3)] {
            assert_eq!(
                Principal::from_row(principal.role(), principal.subject_id()),
                Some(principal)
            );
        }
    }

    #[test]
    fn unknown_role_has_no_principal() {
        assert_eq!(Principal::from_row("root", 1), None);
    }
}
