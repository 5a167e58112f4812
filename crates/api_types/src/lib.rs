use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod flash {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum FlashLevel {
        Success,
        Info,
        Error,
    }

    /// One-shot message shown by the next rendered page.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FlashMessage {
        pub level: FlashLevel,
        pub message: String,
    }

    impl FlashMessage {
        pub fn success(message: impl Into<String>) -> Self {
            Self {
                level: FlashLevel::Success,
                message: message.into(),
            }
        }

        pub fn info(message: impl Into<String>) -> Self {
            Self {
                level: FlashLevel::Info,
                message: message.into(),
            }
        }

        pub fn error(message: impl Into<String>) -> Self {
            Self {
                level: FlashLevel::Error,
                message: message.into(),
            }
        }
    }
}

pub mod view {
    use super::*;
    use crate::flash::FlashMessage;

    /// A rendered page: the template to fill, pending flash messages and the
    /// template context.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct View<T> {
        pub template: String,
        pub flash: Vec<FlashMessage>,
        pub context: T,
    }

    /// Context of pages that only need the flash messages.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Empty {}
}

pub mod voter {
    use super::*;

    /// `POST /` body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LoginForm {
        pub school_id: Option<String>,
        pub password: Option<String>,
    }

    /// `POST /voter/register` body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct RegisterForm {
        pub school_id: Option<String>,
        pub full_name: Option<String>,
        pub grade: Option<String>,
        pub password: Option<String>,
        pub confirm_password: Option<String>,
    }

    /// `GET /voter/vote` query.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct BallotQuery {
        pub election_id: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ElectionSummary {
        pub id: i32,
        pub title: String,
        pub description: Option<String>,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub status: String,
        pub positions: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SelectPage {
        pub voter_name: String,
        pub elections: Vec<ElectionSummary>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CandidateCard {
        pub id: i32,
        pub full_name: String,
        pub party: Option<String>,
        pub bio: Option<String>,
        /// Public URL of the photo, when one was uploaded.
        pub photo_url: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BallotGroup {
        /// Key to use in `selections`: the position id, or `"other"`.
        pub key: String,
        pub title: String,
        pub max_winners: i32,
        pub votes_allowed: i32,
        pub candidates: Vec<CandidateCard>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BallotPage {
        pub election: ElectionSummary,
        pub groups: Vec<BallotGroup>,
        pub already_voted: bool,
    }
}

pub mod ballot {
    use super::*;

    /// An id sent either as a JSON number or as a string.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum IdValue {
        Number(i64),
        Text(String),
    }

    impl IdValue {
        pub fn into_text(self) -> String {
            match self {
                Self::Number(n) => n.to_string(),
                Self::Text(s) => s,
            }
        }
    }

    /// Candidates chosen for one group: a single id or a list.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Selection {
        One(IdValue),
        Many(Vec<IdValue>),
    }

    impl Selection {
        pub fn into_ids(self) -> Vec<String> {
            match self {
                Self::One(id) => vec![id.into_text()],
                Self::Many(ids) => ids.into_iter().map(IdValue::into_text).collect(),
            }
        }
    }

    /// `POST /voter/submit_votes` body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct BallotSubmission {
        pub election_id: Option<IdValue>,
        pub selections: Option<BTreeMap<String, Selection>>,
    }

    /// Outcome of a JSON request.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BallotResponse {
        pub success: bool,
        pub message: String,
    }
}

pub mod admin {
    use super::*;
    use crate::voter::ElectionSummary;

    /// `POST /admin/login` body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct AdminLoginForm {
        pub username: Option<String>,
        pub password: Option<String>,
    }

    /// `POST /admin/elections` body; no `election_id` creates.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ElectionForm {
        pub election_id: Option<String>,
        pub title: Option<String>,
        pub description: Option<String>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub status: Option<String>,
        pub positions: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct DeleteElectionForm {
        pub election_id: Option<String>,
    }

    /// `POST /admin/position` body; no `position_id` creates.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct PositionForm {
        pub position_id: Option<String>,
        pub title: Option<String>,
        pub description: Option<String>,
        pub max_winners: Option<String>,
        pub votes_allowed: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct DeletePositionForm {
        pub position_id: Option<String>,
    }

    /// Text fields of the multipart `POST /admin/candidates` body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct CandidateForm {
        pub candidate_id: Option<String>,
        pub full_name: Option<String>,
        pub position_id: Option<String>,
        pub party: Option<String>,
        pub bio: Option<String>,
        pub election_id: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct DeleteCandidateForm {
        pub candidate_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardPage {
        pub username: String,
        pub voters: u64,
        pub elections: u64,
        pub positions: u64,
        pub candidates: u64,
        pub ballots: u64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct VoterRow {
        pub id: i32,
        pub school_id: String,
        pub full_name: String,
        pub grade: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VotersPage {
        pub voters: Vec<VoterRow>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ElectionsPage {
        pub elections: Vec<ElectionSummary>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PositionRow {
        pub id: i32,
        pub title: String,
        pub description: Option<String>,
        pub max_winners: i32,
        pub votes_allowed: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PositionsPage {
        pub positions: Vec<PositionRow>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CandidateRow {
        pub id: i32,
        pub full_name: String,
        pub party: Option<String>,
        pub bio: Option<String>,
        pub photo_filename: Option<String>,
        pub photo_url: Option<String>,
        pub position_id: Option<i32>,
        pub position_title: Option<String>,
        pub election_id: Option<i32>,
        pub election_title: Option<String>,
    }

    /// Candidate listing plus the choices the edit form offers.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CandidatesPage {
        pub candidates: Vec<CandidateRow>,
        pub positions: Vec<PositionRow>,
        pub elections: Vec<ElectionSummary>,
    }
}

#[cfg(test)]
mod tests {
    use super::ballot::*;

    #[test]
    fn selections_accept_numbers_strings_and_lists() {
        let body = r#"{"election_id": 3, "selections": {"1": 7, "2": ["8", 9], "other": "10"}}"#;
        let parsed: BallotSubmission = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.election_id, Some(IdValue::Number(3)));
        let selections = parsed.selections.unwrap();
        assert_eq!(selections["1"].clone().into_ids(), vec!["7"]);
        assert_eq!(selections["2"].clone().into_ids(), vec!["8", "9"]);
        assert_eq!(selections["other"].clone().into_ids(), vec!["10"]);
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let parsed: BallotSubmission = serde_json::from_str(r#"{"election_id": "4"}"#).unwrap();
        assert_eq!(parsed.election_id, Some(IdValue::Text("4".to_string())));
        assert!(parsed.selections.is_none());
    }
}
