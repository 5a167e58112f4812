//! The module contains `Election` and its lifecycle status.

use sea_orm::entity::prelude::*;

use crate::EngineError;

/// Lifecycle of an election.
///
/// Only `Closed` changes behavior: ballots are refused once an election is
/// closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ElectionStatus {
    #[default]
    Upcoming,
    Active,
    Closed,
}

impl ElectionStatus {
    /// Returns the canonical status string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for ElectionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            _ => Err(EngineError::InvalidStatus(value.to_string())),
        }
    }
}

/// A time-bounded voting event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Election {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub status: ElectionStatus,
    /// Free text kept for display; positions are modeled by `positions`.
    pub positions: Option<String>,
}

impl Election {
    pub fn is_closed(&self) -> bool {
        self.status == ElectionStatus::Closed
    }
}

impl From<Model> for Election {
    fn from(model: Model) -> Self {
        // Rows edited by hand may carry any text; unknown values read as upcoming.
        let status = ElectionStatus::try_from(model.status.as_str()).unwrap_or_default();
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            start_date: model.start_date,
            end_date: model.end_date,
            status,
            positions: model.positions,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "elections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
    pub positions: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::candidates::Entity")]
    Candidates,
}

impl Related<crate::candidates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(
            ElectionStatus::try_from(" Active ").unwrap(),
            ElectionStatus::Active
        );
        assert_eq!(
            ElectionStatus::try_from("CLOSED").unwrap(),
            ElectionStatus::Closed
        );
    }

    #[test]
    fn status_aliases_are_rejected() {
        assert_eq!(
            ElectionStatus::try_from("open"),
            Err(EngineError::InvalidStatus("open".to_string()))
        );
    }

    #[test]
    #[should_panic(expected = "InvalidStatus(\"paused\")")]
    fn fail_unknown_status() {
        ElectionStatus::try_from("paused").unwrap();
    }

    #[test]
    fn unknown_stored_status_reads_as_upcoming() {
        let model = Model {
            id: 1,
            title: "Council".to_string(),
            description: None,
            start_date: Date::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: Date::from_ymd_opt(2026, 3, 2).unwrap(),
            status: "garbage".to_string(),
            positions: None,
        };
        assert_eq!(Election::from(model).status, ElectionStatus::Upcoming);
    }
}
