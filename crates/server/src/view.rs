//! Page rendering and form redirects.

use api_types::{
    admin::{CandidateRow, PositionRow, VoterRow},
    flash::FlashMessage,
    view::View,
    voter::{BallotGroup, CandidateCard, ElectionSummary},
};
use axum::{Json, response::Redirect};
use axum_extra::extract::cookie::SignedCookieJar;
use engine::{
    Candidate, CandidateDetail, Election, EngineError, Position, PositionGroup, Voter,
};
use serde::Serialize;

use crate::{ServerError, flash, uploads::photo_url};

pub(crate) type Page<T> = (SignedCookieJar, Json<View<T>>);
pub(crate) type FormResult = Result<(SignedCookieJar, Redirect), ServerError>;

/// Render `template` with `context`, consuming pending flash messages.
pub(crate) fn render<T: Serialize>(jar: SignedCookieJar, template: &str, context: T) -> Page<T> {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        Json(View {
            template: template.to_string(),
            flash,
            context,
        }),
    )
}

/// Redirect with a flash message (303 See Other).
pub(crate) fn redirect(jar: SignedCookieJar, to: &str, message: FlashMessage) -> FormResult {
    Ok((flash::push(jar, message), Redirect::to(to)))
}

/// Turn the outcome of a form operation into a redirect: success goes to
/// `ok_to`, a user error is flashed back to `err_to`, and storage failures
/// become a 500.
pub(crate) fn form_outcome(
    jar: SignedCookieJar,
    outcome: Result<String, EngineError>,
    ok_to: &str,
    err_to: &str,
) -> FormResult {
    match outcome {
        Ok(message) => redirect(jar, ok_to, FlashMessage::success(message)),
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => redirect(jar, err_to, FlashMessage::error(err.to_string())),
    }
}

pub(crate) fn election_summary(election: &Election) -> ElectionSummary {
    ElectionSummary {
        id: election.id,
        title: election.title.clone(),
        description: election.description.clone(),
        start_date: election.start_date,
        end_date: election.end_date,
        status: election.status.as_str().to_string(),
        positions: election.positions.clone(),
    }
}

pub(crate) fn candidate_card(candidate: &Candidate) -> CandidateCard {
    CandidateCard {
        id: candidate.id,
        full_name: candidate.full_name.clone(),
        party: candidate.party.clone(),
        bio: candidate.bio.clone(),
        photo_url: candidate.photo_filename.as_deref().map(photo_url),
    }
}

pub(crate) fn ballot_group(group: &PositionGroup) -> BallotGroup {
    BallotGroup {
        key: group.key(),
        title: group.title.clone(),
        max_winners: group.max_winners,
        votes_allowed: group.votes_allowed,
        candidates: group.candidates.iter().map(candidate_card).collect(),
    }
}

pub(crate) fn voter_row(voter: Voter) -> VoterRow {
    VoterRow {
        id: voter.id,
        school_id: voter.school_id,
        full_name: voter.full_name,
        grade: voter.grade,
    }
}

pub(crate) fn position_row(position: Position) -> PositionRow {
    PositionRow {
        id: position.id,
        title: position.title,
        description: position.description,
        max_winners: position.max_winners,
        votes_allowed: position.votes_allowed,
    }
}

pub(crate) fn candidate_row(detail: CandidateDetail) -> CandidateRow {
    let candidate = detail.candidate;
    CandidateRow {
        id: candidate.id,
        photo_url: candidate.photo_filename.as_deref().map(photo_url),
        full_name: candidate.full_name,
        party: candidate.party,
        bio: candidate.bio,
        photo_filename: candidate.photo_filename,
        position_id: candidate.position_id,
        position_title: detail.position_title,
        election_id: candidate.election_id,
        election_title: detail.election_title,
    }
}
