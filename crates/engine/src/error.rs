//! The module contains the errors the engine can throw.
//!
//! Every variant except [`Database`] and [`PasswordHash`] is a user-facing
//! validation failure: its `Display` text is safe to show back to the person
//! who filled the form.
//!
//!  [`Database`]: EngineError::Database
//!  [`PasswordHash`]: EngineError::PasswordHash
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Please log in to continue.")]
    Unauthorized,
    #[error("{0} is required.")]
    MissingField(String),
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("School ID \"{0}\" is already registered.")]
    DuplicateSchoolId(String),
    #[error("Username \"{0}\" is already taken.")]
    DuplicateUsername(String),
    #[error("No election selected.")]
    MissingElection,
    #[error("Invalid election id \"{0}\".")]
    InvalidElection(String),
    #[error("Election {0} not found.")]
    ElectionNotFound(i32),
    #[error("Invalid {0}.")]
    InvalidId(String),
    #[error("Candidate {0} not found.")]
    CandidateNotFound(i32),
    #[error("Position {0} not found.")]
    PositionNotFound(i32),
    #[error("Invalid date \"{0}\", expected YYYY-MM-DD.")]
    BadDateFormat(String),
    #[error("Start date must be on or before the end date.")]
    DateRangeInvalid,
    #[error("Invalid election status \"{0}\".")]
    InvalidStatus(String),
    #[error("{0} must be a positive integer.")]
    InvalidPositiveInteger(String),
    #[error("Missing {0}.")]
    MissingPayload(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Too many selections for {position}: at most {allowed} allowed.")]
    TooManySelections { position: String, allowed: i32 },
    #[error("Election {0} is closed.")]
    ElectionClosed(i32),
    #[error("You have already voted in this election.")]
    AlreadyVoted,
    #[error("Candidate {0} already has votes on cast ballots.")]
    CandidateHasVotes(i32),
    #[error("Unknown table \"{0}\".")]
    UnknownTable(String),
    #[error("Unknown column \"{0}\".")]
    UnknownColumn(String),
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for failures of the storage layer rather than of the input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::PasswordHash(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCredentials, Self::InvalidCredentials)
            | (Self::Unauthorized, Self::Unauthorized)
            | (Self::PasswordMismatch, Self::PasswordMismatch)
            | (Self::MissingElection, Self::MissingElection)
            | (Self::DateRangeInvalid, Self::DateRangeInvalid)
            | (Self::AlreadyVoted, Self::AlreadyVoted) => true,
            (Self::MissingField(a), Self::MissingField(b))
            | (Self::DuplicateSchoolId(a), Self::DuplicateSchoolId(b))
            | (Self::DuplicateUsername(a), Self::DuplicateUsername(b))
            | (Self::InvalidElection(a), Self::InvalidElection(b))
            | (Self::InvalidId(a), Self::InvalidId(b))
            | (Self::BadDateFormat(a), Self::BadDateFormat(b))
            | (Self::InvalidStatus(a), Self::InvalidStatus(b))
            | (Self::InvalidPositiveInteger(a), Self::InvalidPositiveInteger(b))
            | (Self::MissingPayload(a), Self::MissingPayload(b))
            | (Self::InvalidSelection(a), Self::InvalidSelection(b))
            | (Self::UnknownTable(a), Self::UnknownTable(b))
            | (Self::UnknownColumn(a), Self::UnknownColumn(b)) => a == b,
            (Self::ElectionNotFound(a), Self::ElectionNotFound(b))
            | (Self::CandidateNotFound(a), Self::CandidateNotFound(b))
            | (Self::PositionNotFound(a), Self::PositionNotFound(b))
            | (Self::ElectionClosed(a), Self::ElectionClosed(b))
            | (Self::CandidateHasVotes(a), Self::CandidateHasVotes(b)) => a == b,
            (
                Self::TooManySelections {
                    position: a,
                    allowed: x,
                },
                Self::TooManySelections {
                    position: b,
                    allowed: y,
                },
            ) => a == b && x == y,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
