//! Voters table.
//!
//! A voter registers once with a school id; the engine never updates or
//! deletes voter rows.

use sea_orm::entity::prelude::*;

/// A registered voter, without credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voter {
    pub id: i32,
    pub school_id: String,
    pub full_name: String,
    pub grade: Option<String>,
}

impl From<Model> for Voter {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            school_id: model.school_id,
            full_name: model.full_name,
            grade: model.grade,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "voters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub school_id: String,
    pub full_name: String,
    pub grade: Option<String>,
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
