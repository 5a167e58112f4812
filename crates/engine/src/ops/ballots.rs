use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    BallotInput, BallotReceipt, BallotSheet, Candidate, Election, EngineError, OTHER_GROUP_TITLE,
    PositionGroup, ResultEngine, ballots,
    ballots::group_key,
    candidates, elections, positions,
    util::{is_unique_violation, non_blank, parse_election_id},
    votes,
};

use super::{Engine, with_tx};

impl Engine {
    /// Build the ballot of an election from its raw query id.
    ///
    /// Groups appear in the order their first candidate appears; candidates
    /// without a position share the "Other" group.
    pub async fn ballot_sheet(&self, election_id: Option<&str>) -> ResultEngine<BallotSheet> {
        let election_id = parse_election_id(election_id)?;
        let election = self.election(election_id).await?;
        let candidates = self.candidates_for_election(election_id).await?;
        let positions = load_positions(&self.database).await?;

        Ok(BallotSheet {
            election,
            groups: group_candidates(candidates, &positions),
        })
    }

    /// `true` when the voter already cast a ballot in this election.
    pub async fn has_voted(&self, voter_id: i32, election_id: i32) -> ResultEngine<bool> {
        let ballot = ballots::Entity::find()
            .filter(ballots::Column::VoterId.eq(voter_id))
            .filter(ballots::Column::ElectionId.eq(election_id))
            .one(&self.database)
            .await?;
        Ok(ballot.is_some())
    }

    /// Validate and store a ballot.
    ///
    /// Every selected candidate must run in the election under the group its
    /// key names, and no group may receive more selections than its position
    /// allows. A voter casts at most one ballot per election.
    pub async fn submit_ballot(
        &self,
        voter_id: i32,
        input: BallotInput,
    ) -> ResultEngine<BallotReceipt> {
        let raw_election = non_blank(input.election_id.as_deref())
            .ok_or_else(|| EngineError::MissingPayload("election_id".to_string()))?
            .to_string();
        let selections = input
            .selections
            .filter(|s| s.values().any(|ids| !ids.is_empty()))
            .ok_or_else(|| EngineError::MissingPayload("selections".to_string()))?;
        let election_id = parse_election_id(Some(&raw_election))?;

        with_tx!(self, |db_tx| {
            let election = load_election(&db_tx, election_id).await?;
            if election.is_closed() {
                return Err(EngineError::ElectionClosed(election_id));
            }
            let already_voted = ballots::Entity::find()
                .filter(ballots::Column::VoterId.eq(voter_id))
                .filter(ballots::Column::ElectionId.eq(election_id))
                .one(&db_tx)
                .await?
                .is_some();
            if already_voted {
                return Err(EngineError::AlreadyVoted);
            }

            let candidates = load_candidates(&db_tx, election_id).await?;
            let positions = load_positions(&db_tx).await?;
            let groups: HashMap<String, PositionGroup> = group_candidates(candidates, &positions)
                .into_iter()
                .map(|g| (g.key(), g))
                .collect();

            let mut chosen: Vec<(i32, Option<i32>)> = Vec::new();
            for (key, ids) in &selections {
                if ids.is_empty() {
                    continue;
                }
                let group = groups.get(key.trim()).ok_or_else(|| {
                    EngineError::InvalidSelection(format!(
                        "\"{key}\" is not a position on this ballot."
                    ))
                })?;
                if ids.len() > group.votes_allowed as usize {
                    return Err(EngineError::TooManySelections {
                        position: group.title.clone(),
                        allowed: group.votes_allowed,
                    });
                }
                let mut seen = BTreeSet::new();
                for raw in ids {
                    let candidate_id: i32 = raw.trim().parse().map_err(|_| {
                        EngineError::InvalidSelection(format!("\"{raw}\" is not a candidate id."))
                    })?;
                    if !group.candidates.iter().any(|c| c.id == candidate_id) {
                        return Err(EngineError::InvalidSelection(format!(
                            "candidate {candidate_id} does not run for {}.",
                            group.title
                        )));
                    }
                    if !seen.insert(candidate_id) {
                        return Err(EngineError::InvalidSelection(format!(
                            "candidate {candidate_id} was selected twice."
                        )));
                    }
                    chosen.push((candidate_id, group.position_id));
                }
            }

            let ballot = ballots::ActiveModel {
                voter_id: ActiveValue::Set(voter_id),
                election_id: ActiveValue::Set(election_id),
                cast_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    EngineError::AlreadyVoted
                } else {
                    err.into()
                }
            })?;

            for (candidate_id, position_id) in &chosen {
                votes::ActiveModel {
                    ballot_id: ActiveValue::Set(ballot.id),
                    candidate_id: ActiveValue::Set(*candidate_id),
                    position_id: ActiveValue::Set(*position_id),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;
            }

            Ok(BallotReceipt {
                ballot_id: ballot.id,
                election_id,
                votes_cast: chosen.len(),
            })
        })
    }
}

pub(super) async fn load_election<C: ConnectionTrait>(db: &C, election_id: i32) -> ResultEngine<Election> {
    elections::Entity::find_by_id(election_id)
        .one(db)
        .await?
        .map(Election::from)
        .ok_or(EngineError::ElectionNotFound(election_id))
}

pub(super) async fn load_candidates<C: ConnectionTrait>(
    db: &C,
    election_id: i32,
) -> ResultEngine<Vec<Candidate>> {
    Ok(candidates::Entity::find()
        .filter(candidates::Column::ElectionId.eq(election_id))
        .order_by_asc(candidates::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Candidate::from)
        .collect())
}

async fn load_positions<C: ConnectionTrait>(
    db: &C,
) -> ResultEngine<HashMap<i32, positions::Model>> {
    Ok(positions::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect())
}

/// Group candidates by position in first-seen order. A position id that no
/// longer resolves counts as no position.
fn group_candidates(
    candidates: Vec<Candidate>,
    positions: &HashMap<i32, positions::Model>,
) -> Vec<PositionGroup> {
    let mut groups: Vec<PositionGroup> = Vec::new();
    for candidate in candidates {
        let position = candidate.position_id.and_then(|id| positions.get(&id));
        let position_id = position.map(|p| p.id);
        let key = group_key(position_id);
        match groups.iter_mut().find(|g| g.key() == key) {
            Some(group) => group.candidates.push(candidate),
            None => groups.push(PositionGroup {
                position_id,
                title: position
                    .map(|p| p.title.clone())
                    .unwrap_or_else(|| OTHER_GROUP_TITLE.to_string()),
                max_winners: position.map_or(1, |p| p.max_winners),
                votes_allowed: position.map_or(1, |p| p.votes_allowed),
                candidates: vec![candidate],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i32, position_id: Option<i32>) -> Candidate {
        Candidate {
            id,
            full_name: format!("Candidate {id}"),
            photo_filename: None,
            position_id,
            party: None,
            bio: None,
            election_id: Some(1),
        }
    }

    fn position(id: i32, title: &str, votes_allowed: i32) -> (i32, positions::Model) {
        (
            id,
            positions::Model {
                id,
                title: title.to_string(),
                description: None,
                max_winners: 1,
                votes_allowed,
            },
        )
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let positions = HashMap::from([position(1, "President", 1), position(2, "Treasurer", 2)]);
        let groups = group_candidates(
            vec![
                candidate(10, Some(2)),
                candidate(11, None),
                candidate(12, Some(1)),
                candidate(13, Some(2)),
            ],
            &positions,
        );

        let keys: Vec<String> = groups.iter().map(PositionGroup::key).collect();
        assert_eq!(keys, vec!["2", "other", "1"]);
        assert_eq!(groups[0].title, "Treasurer");
        assert_eq!(groups[0].votes_allowed, 2);
        assert_eq!(groups[0].candidates.len(), 2);
        assert_eq!(groups[1].title, OTHER_GROUP_TITLE);
        assert_eq!(groups[1].votes_allowed, 1);
    }

    #[test]
    fn dangling_position_falls_into_other() {
        let groups = group_candidates(vec![candidate(1, Some(99))], &HashMap::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].position_id, None);
        assert_eq!(groups[0].key(), "other");
    }

    #[test]
    fn no_candidates_no_groups() {
        assert!(group_candidates(Vec::new(), &HashMap::new()).is_empty());
    }
}
