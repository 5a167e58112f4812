//! Candidates table.
//!
//! A candidate references its position and election by nullable foreign keys;
//! both are cleared by the database when the referenced row is deleted.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: i32,
    pub full_name: String,
    /// Name of the stored photo inside the uploads directory.
    pub photo_filename: Option<String>,
    pub position_id: Option<i32>,
    pub party: Option<String>,
    pub bio: Option<String>,
    pub election_id: Option<i32>,
}

impl From<Model> for Candidate {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            photo_filename: model.photo_filename,
            position_id: model.position_id,
            party: model.party,
            bio: model.bio,
            election_id: model.election_id,
        }
    }
}

/// A candidate joined with the titles of what it references, for listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateDetail {
    pub candidate: Candidate,
    pub position_title: Option<String>,
    pub election_title: Option<String>,
}

/// Result of a create-or-update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedCandidate {
    pub candidate: Candidate,
    pub created: bool,
    /// Photo that was replaced by this save and is no longer referenced.
    pub replaced_photo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "candidates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    pub photo_filename: Option<String>,
    pub position_id: Option<i32>,
    pub party: Option<String>,
    pub bio: Option<String>,
    pub election_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::positions::Entity",
        from = "Column::PositionId",
        to = "crate::positions::Column::Id",
        on_delete = "SetNull"
    )]
    Position,
    #[sea_orm(
        belongs_to = "crate::elections::Entity",
        from = "Column::ElectionId",
        to = "crate::elections::Column::Id",
        on_delete = "SetNull"
    )]
    Election,
}

impl Related<crate::positions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Position.def()
    }
}

impl Related<crate::elections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Election.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
