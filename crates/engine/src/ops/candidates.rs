use std::collections::HashMap;

use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Candidate, CandidateDetail, CandidateInput, EngineError, ResultEngine, SavedCandidate,
    candidates, elections, positions,
    util::{
        non_blank, parse_optional_election_id, parse_optional_id, parse_required_id,
        required_text,
    },
    votes,
};

use super::{Engine, ballots::load_candidates, with_tx};

impl Engine {
    /// Every candidate with the titles of its position and election.
    pub async fn list_candidates(&self) -> ResultEngine<Vec<CandidateDetail>> {
        let position_titles: HashMap<i32, String> = positions::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|p| (p.id, p.title))
            .collect();
        let election_titles: HashMap<i32, String> = elections::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|e| (e.id, e.title))
            .collect();

        let details = candidates::Entity::find()
            .order_by_asc(candidates::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| {
                let candidate = Candidate::from(model);
                CandidateDetail {
                    position_title: candidate
                        .position_id
                        .and_then(|id| position_titles.get(&id).cloned()),
                    election_title: candidate
                        .election_id
                        .and_then(|id| election_titles.get(&id).cloned()),
                    candidate,
                }
            })
            .collect();
        Ok(details)
    }

    /// Candidates running in `election_id`, by id.
    pub async fn candidates_for_election(&self, election_id: i32) -> ResultEngine<Vec<Candidate>> {
        load_candidates(&self.database, election_id).await
    }

    /// Create a candidate, or update it when `input.candidate_id` is set.
    ///
    /// A `None` photo keeps the stored one. When a new photo replaces an old
    /// one, the old filename is returned so the caller can remove the file.
    pub async fn save_candidate(&self, input: CandidateInput) -> ResultEngine<SavedCandidate> {
        let candidate_id = parse_optional_id(input.candidate_id.as_deref(), "candidate")?;
        let full_name = required_text(input.full_name.as_deref(), "Full name")?;
        let position_id = parse_required_id(input.position_id.as_deref(), "position")?;
        let election_id = parse_optional_election_id(input.election_id.as_deref())?;
        let party = non_blank(input.party.as_deref()).map(ToString::to_string);
        let bio = non_blank(input.bio.as_deref()).map(ToString::to_string);
        let photo = non_blank(input.photo_filename.as_deref()).map(ToString::to_string);

        with_tx!(self, |db_tx| {
            if positions::Entity::find_by_id(position_id)
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::PositionNotFound(position_id));
            }
            if let Some(id) = election_id
                && elections::Entity::find_by_id(id).one(&db_tx).await?.is_none()
            {
                return Err(EngineError::ElectionNotFound(id));
            }

            let saved = match candidate_id {
                Some(id) => {
                    let existing = candidates::Entity::find_by_id(id)
                        .one(&db_tx)
                        .await?
                        .ok_or(EngineError::CandidateNotFound(id))?;
                    let replaced_photo = match &photo {
                        Some(new) if existing.photo_filename.as_deref() != Some(new.as_str()) => {
                            existing.photo_filename.clone()
                        }
                        _ => None,
                    };
                    let mut active: candidates::ActiveModel = existing.into();
                    active.full_name = ActiveValue::Set(full_name);
                    active.position_id = ActiveValue::Set(Some(position_id));
                    active.party = ActiveValue::Set(party);
                    active.bio = ActiveValue::Set(bio);
                    active.election_id = ActiveValue::Set(election_id);
                    if photo.is_some() {
                        active.photo_filename = ActiveValue::Set(photo);
                    }
                    SavedCandidate {
                        candidate: Candidate::from(active.update(&db_tx).await?),
                        created: false,
                        replaced_photo,
                    }
                }
                None => {
                    let model = candidates::ActiveModel {
                        full_name: ActiveValue::Set(full_name),
                        photo_filename: ActiveValue::Set(photo),
                        position_id: ActiveValue::Set(Some(position_id)),
                        party: ActiveValue::Set(party),
                        bio: ActiveValue::Set(bio),
                        election_id: ActiveValue::Set(election_id),
                        ..Default::default()
                    }
                    .insert(&db_tx)
                    .await?;
                    SavedCandidate {
                        candidate: Candidate::from(model),
                        created: true,
                        replaced_photo: None,
                    }
                }
            };
            Ok(saved)
        })
    }

    /// Delete a candidate by its raw form id, returning the removed row so the
    /// caller can clean up its photo.
    ///
    /// Cast ballots are never rewritten: a candidate somebody voted for stays.
    pub async fn delete_candidate(&self, candidate_id: Option<&str>) -> ResultEngine<Candidate> {
        let candidate_id = parse_required_id(candidate_id, "candidate")?;

        with_tx!(self, |db_tx| {
            let model = candidates::Entity::find_by_id(candidate_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::CandidateNotFound(candidate_id))?;
            let votes = votes::Entity::find()
                .filter(votes::Column::CandidateId.eq(candidate_id))
                .count(&db_tx)
                .await?;
            if votes > 0 {
                return Err(EngineError::CandidateHasVotes(candidate_id));
            }
            candidates::Entity::delete_by_id(candidate_id)
                .exec(&db_tx)
                .await?;
            Ok(Candidate::from(model))
        })
    }
}
