//! Ballots and the ballot sheet shown to voters.
//!
//! A ballot sheet groups the candidates of one election by position, in the
//! order the candidates were first seen. Candidates without a position are
//! collected in the "Other" group, keyed [`OTHER_GROUP_KEY`].

use sea_orm::entity::prelude::*;

use crate::{Candidate, Election};

/// Group key used for candidates that do not reference a position.
pub const OTHER_GROUP_KEY: &str = "other";
/// Title displayed for the "Other" group.
pub const OTHER_GROUP_TITLE: &str = "Other";

/// Candidates competing for the same position inside one election.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionGroup {
    pub position_id: Option<i32>,
    pub title: String,
    pub max_winners: i32,
    pub votes_allowed: i32,
    pub candidates: Vec<Candidate>,
}

impl PositionGroup {
    /// Key a ballot submission uses to address this group.
    pub fn key(&self) -> String {
        group_key(self.position_id)
    }
}

pub(crate) fn group_key(position_id: Option<i32>) -> String {
    match position_id {
        Some(id) => id.to_string(),
        None => OTHER_GROUP_KEY.to_string(),
    }
}

/// Everything a voter needs to fill a ballot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallotSheet {
    pub election: Election,
    pub groups: Vec<PositionGroup>,
}

/// Acknowledgement of a stored ballot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallotReceipt {
    pub ballot_id: i32,
    pub election_id: i32,
    pub votes_cast: usize,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ballots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub voter_id: i32,
    pub election_id: i32,
    pub cast_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::votes::Entity")]
    Votes,
}

impl Related<crate::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
