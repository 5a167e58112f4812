//! Votes table: one row per candidate selected on a ballot.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ballot_id: i32,
    pub candidate_id: i32,
    pub position_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::ballots::Entity",
        from = "Column::BallotId",
        to = "crate::ballots::Column::Id",
        on_delete = "Cascade"
    )]
    Ballot,
}

impl Related<crate::ballots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ballot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
