//! Positions table.

use sea_orm::entity::prelude::*;

/// A contested role with a winner count and a per-voter vote allowance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub max_winners: i32,
    pub votes_allowed: i32,
}

impl From<Model> for Position {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            max_winners: model.max_winners,
            votes_allowed: model.votes_allowed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "positions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub max_winners: i32,
    pub votes_allowed: i32,
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
