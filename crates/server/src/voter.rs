//! Voter-facing pages and the ballot endpoint.

use api_types::{
    ballot::{BallotResponse, BallotSubmission, IdValue},
    flash::FlashMessage,
    view::Empty,
    voter::{BallotPage, BallotQuery, LoginForm, RegisterForm, SelectPage},
};
use axum::{
    Extension, Form, Json,
    extract::{Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use engine::{BallotInput, EngineError, NewVoter, Principal, Voter};

use crate::{
    ServerError, session,
    server::ServerState,
    view::{self, FormResult, Page},
};

pub async fn login_page(jar: SignedCookieJar) -> Page<Empty> {
    view::render(jar, "voter/login.html", Empty {})
}

pub async fn login(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> FormResult {
    let school_id = form.school_id.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    let voter = match state.engine.authenticate_voter(&school_id, &password).await {
        Ok(voter) => voter,
        Err(err) if err.is_internal() => return Err(err.into()),
        Err(err) => {
            tracing::warn!("rejected voter login for {:?}", school_id.trim());
            return view::redirect(jar, "/", FlashMessage::error(err.to_string()));
        }
    };

    let jar = session::end(&state, jar).await?;
    let session = state.engine.open_session(Principal::Voter(voter.id)).await?;
    let jar = session::attach(jar, &session, state.config.secure_cookies);
    view::redirect(
        jar,
        "/voter/select",
        FlashMessage::success(format!("Welcome, {}!", voter.full_name)),
    )
}

pub async fn register_page(jar: SignedCookieJar) -> Page<Empty> {
    view::render(jar, "voter/register.html", Empty {})
}

pub async fn register(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> FormResult {
    let outcome = state
        .engine
        .register_voter(NewVoter {
            school_id: form.school_id,
            full_name: form.full_name,
            grade: form.grade,
            password: form.password,
            confirm_password: form.confirm_password,
        })
        .await
        .map(|voter| {
            tracing::info!("registered voter {}", voter.school_id);
            "Registration successful. Please log in.".to_string()
        });
    view::form_outcome(jar, outcome, "/", "/voter/register")
}

pub async fn select(
    Extension(voter): Extension<Voter>,
    State(state): State<ServerState>,
    jar: SignedCookieJar,
) -> Result<Page<SelectPage>, ServerError> {
    let elections = state.engine.list_elections().await?;
    Ok(view::render(
        jar,
        "voter/select.html",
        SelectPage {
            voter_name: voter.full_name,
            elections: elections.iter().map(view::election_summary).collect(),
        },
    ))
}

pub async fn ballot(
    Extension(voter): Extension<Voter>,
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Query(query): Query<BallotQuery>,
) -> Result<Response, ServerError> {
    let sheet = match state.engine.ballot_sheet(query.election_id.as_deref()).await {
        Ok(sheet) => sheet,
        Err(err) if err.is_internal() => return Err(err.into()),
        Err(err) => {
            let redirect =
                view::redirect(jar, "/voter/select", FlashMessage::error(err.to_string()))?;
            return Ok(redirect.into_response());
        }
    };
    let already_voted = state
        .engine
        .has_voted(voter.id, sheet.election.id)
        .await?;

    Ok(view::render(
        jar,
        "voter/vote.html",
        BallotPage {
            election: view::election_summary(&sheet.election),
            groups: sheet.groups.iter().map(view::ballot_group).collect(),
            already_voted,
        },
    )
    .into_response())
}

pub async fn submit_votes(
    Extension(voter): Extension<Voter>,
    State(state): State<ServerState>,
    payload: Result<Json<BallotSubmission>, JsonRejection>,
) -> Result<Json<BallotResponse>, ServerError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("unreadable ballot: {rejection}");
        EngineError::MissingPayload("ballot data".to_string())
    })?;

    let input = BallotInput {
        election_id: payload.election_id.map(IdValue::into_text),
        selections: payload.selections.map(|selections| {
            selections
                .into_iter()
                .map(|(key, selection)| (key, selection.into_ids()))
                .collect()
        }),
    };
    let receipt = state.engine.submit_ballot(voter.id, input).await?;
    tracing::info!(
        "voter {} cast ballot {} in election {}",
        voter.id,
        receipt.ballot_id,
        receipt.election_id
    );

    Ok(Json(BallotResponse {
        success: true,
        message: "Your ballot has been recorded.".to_string(),
    }))
}
