use api_types::admin::{DeleteElectionForm, ElectionForm, ElectionsPage};
use axum::{Form, extract::State};
use axum_extra::extract::cookie::SignedCookieJar;
use engine::ElectionInput;

use crate::{
    ServerError,
    server::ServerState,
    view::{self, FormResult, Page},
};

const PAGE: &str = "/admin/elections";

pub async fn list(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
) -> Result<Page<ElectionsPage>, ServerError> {
    let elections = state.engine.list_elections().await?;
    Ok(view::render(
        jar,
        "admin/elections.html",
        ElectionsPage {
            elections: elections.iter().map(view::election_summary).collect(),
        },
    ))
}

pub async fn save(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<ElectionForm>,
) -> FormResult {
    let updating = form
        .election_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    let outcome = state
        .engine
        .save_election(ElectionInput {
            election_id: form.election_id,
            title: form.title,
            description: form.description,
            start_date: form.start_date,
            end_date: form.end_date,
            status: form.status,
            positions: form.positions,
        })
        .await
        .map(|election| {
            if updating {
                format!("Election \"{}\" updated.", election.title)
            } else {
                format!("Election \"{}\" created.", election.title)
            }
        });
    view::form_outcome(jar, outcome, PAGE, PAGE)
}

pub async fn delete(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<DeleteElectionForm>,
) -> FormResult {
    let outcome = state
        .engine
        .delete_election(form.election_id.as_deref())
        .await
        .map(|election| format!("Election \"{}\" deleted.", election.title));
    view::form_outcome(jar, outcome, PAGE, PAGE)
}
