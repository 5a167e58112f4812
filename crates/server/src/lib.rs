use api_types::ballot::BallotResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{Config, ServerState, router, run_with_listener, spawn_with_listener};

mod admin;
mod candidates;
mod elections;
mod flash;
mod positions;
mod server;
mod session;
mod uploads;
mod view;
mod voter;

pub mod types {
    pub use api_types::{
        admin::{
            CandidatesPage, DashboardPage, ElectionsPage, PositionsPage, VoterRow, VotersPage,
        },
        ballot::{BallotResponse, BallotSubmission, IdValue, Selection},
        flash::{FlashLevel, FlashMessage},
        view::View,
        voter::{BallotGroup, BallotPage, CandidateCard, ElectionSummary, SelectPage},
    };
}

pub use axum_extra::extract::cookie::Key;
pub use server::DEFAULT_MAX_UPLOAD_BYTES;
pub use uploads::sanitize_filename;

pub enum ServerError {
    Engine(EngineError),
    Io(std::io::Error),
}

const INTERNAL_MESSAGE: &str = "Internal server error.";

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidCredentials | EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::ElectionNotFound(_)
        | EngineError::CandidateNotFound(_)
        | EngineError::PositionNotFound(_)
        | EngineError::UnknownTable(_)
        | EngineError::UnknownColumn(_) => StatusCode::NOT_FOUND,
        EngineError::DuplicateSchoolId(_)
        | EngineError::DuplicateUsername(_)
        | EngineError::AlreadyVoted
        | EngineError::CandidateHasVotes(_)
        | EngineError::ElectionClosed(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::PasswordHash(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::MissingField(_)
        | EngineError::PasswordMismatch
        | EngineError::MissingElection
        | EngineError::InvalidElection(_)
        | EngineError::InvalidId(_)
        | EngineError::BadDateFormat(_)
        | EngineError::DateRangeInvalid
        | EngineError::InvalidStatus(_)
        | EngineError::InvalidPositiveInteger(_)
        | EngineError::MissingPayload(_)
        | EngineError::InvalidSelection(_)
        | EngineError::TooManySelections { .. } => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_internal() {
        tracing::error!("engine failure: {err}");
        INTERNAL_MESSAGE.to_string()
    } else {
        err.to_string()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                message_for_engine_error(err),
            ),
            ServerError::Io(err) => {
                tracing::error!("i/o failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        (
            status,
            Json(BallotResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::ElectionNotFound(4)).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn already_voted_maps_to_409() {
        let res = ServerError::from(EngineError::AlreadyVoted).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn candidate_with_votes_maps_to_409() {
        let res = ServerError::from(EngineError::CandidateHasVotes(3)).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::MissingPayload("selections".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = EngineError::Database(sea_orm_err());
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let parsed: BallotResponse = serde_json::from_slice(&body).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn io_maps_to_500() {
        let res = ServerError::from(std::io::Error::other("disk full")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn sea_orm_err() -> sea_orm::DbErr {
        sea_orm::DbErr::Custom("secret table layout".to_string())
    }
}
