use api_types::admin::{DeletePositionForm, PositionForm, PositionsPage};
use axum::{Form, extract::State};
use axum_extra::extract::cookie::SignedCookieJar;
use engine::PositionInput;

use crate::{
    ServerError,
    server::ServerState,
    view::{self, FormResult, Page},
};

const PAGE: &str = "/admin/position";

pub async fn list(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
) -> Result<Page<PositionsPage>, ServerError> {
    let positions = state.engine.list_positions().await?;
    Ok(view::render(
        jar,
        "admin/position.html",
        PositionsPage {
            positions: positions.into_iter().map(view::position_row).collect(),
        },
    ))
}

pub async fn save(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<PositionForm>,
) -> FormResult {
    let updating = form
        .position_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    let outcome = state
        .engine
        .save_position(PositionInput {
            position_id: form.position_id,
            title: form.title,
            description: form.description,
            max_winners: form.max_winners,
            votes_allowed: form.votes_allowed,
        })
        .await
        .map(|position| {
            if updating {
                format!("Position \"{}\" updated.", position.title)
            } else {
                format!("Position \"{}\" created.", position.title)
            }
        });
    view::form_outcome(jar, outcome, PAGE, PAGE)
}

pub async fn delete(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<DeletePositionForm>,
) -> FormResult {
    let outcome = state
        .engine
        .delete_position(form.position_id.as_deref())
        .await
        .map(|position| format!("Position \"{}\" deleted.", position.title));
    view::form_outcome(jar, outcome, PAGE, PAGE)
}
