//! Storage component of the voting portal.
//!
//! [`Engine`] owns the database connection and exposes every validated
//! operation the web service and the maintenance tools perform. Writes run
//! inside a database transaction, so concurrent clients of the same SQLite
//! file serialize instead of interleaving half-applied changes.

pub use admins::Admin;
pub use ballots::{
    BallotReceipt, BallotSheet, OTHER_GROUP_KEY, OTHER_GROUP_TITLE, PositionGroup,
};
pub use candidates::{Candidate, CandidateDetail, SavedCandidate};
pub use commands::{BallotInput, CandidateInput, ElectionInput, NewVoter, PositionInput};
pub use elections::{Election, ElectionStatus};
pub use error::EngineError;
pub use ops::{Dashboard, Engine, EngineBuilder};
pub use positions::Position;
pub use sessions::{Principal, Session};
pub use tables::{CellAssignment, TableColumn, TableData};
pub use voters::Voter;

mod admins;
mod ballots;
mod candidates;
mod commands;
mod elections;
mod error;
mod ops;
mod password;
mod positions;
mod sessions;
mod tables;
mod util;
mod voters;
mod votes;

type ResultEngine<T> = Result<T, EngineError>;
