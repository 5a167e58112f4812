//! Input structs for engine write operations.
//!
//! Fields carry the raw text submitted by a form: the engine owns trimming,
//! presence checks and parsing so every caller gets the same validation.

use std::collections::BTreeMap;

/// Register a new voter.
#[derive(Clone, Debug, Default)]
pub struct NewVoter {
    pub school_id: Option<String>,
    pub full_name: Option<String>,
    pub grade: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Create (no `election_id`) or update an election.
#[derive(Clone, Debug, Default)]
pub struct ElectionInput {
    pub election_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub positions: Option<String>,
}

/// Create (no `position_id`) or update a position.
#[derive(Clone, Debug, Default)]
pub struct PositionInput {
    pub position_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub max_winners: Option<String>,
    pub votes_allowed: Option<String>,
}

/// Create (no `candidate_id`) or update a candidate.
#[derive(Clone, Debug, Default)]
pub struct CandidateInput {
    pub candidate_id: Option<String>,
    pub full_name: Option<String>,
    pub position_id: Option<String>,
    pub party: Option<String>,
    pub bio: Option<String>,
    pub election_id: Option<String>,
    /// Already-stored photo file; `None` keeps the current photo on update.
    pub photo_filename: Option<String>,
}

/// A ballot as submitted by a voter.
///
/// `selections` maps a group key (position id, or `"other"`) to the ids of the
/// chosen candidates.
#[derive(Clone, Debug, Default)]
pub struct BallotInput {
    pub election_id: Option<String>,
    pub selections: Option<BTreeMap<String, Vec<String>>>,
}
