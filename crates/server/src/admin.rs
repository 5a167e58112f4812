//! Admin login, dashboard and voter list.

use api_types::{
    admin::{AdminLoginForm, DashboardPage, VotersPage},
    flash::FlashMessage,
    view::Empty,
};
use axum::{Extension, Form, extract::State};
use axum_extra::extract::cookie::SignedCookieJar;
use engine::{Admin, Principal};

use crate::{
    ServerError, session,
    server::ServerState,
    view::{self, FormResult, Page},
};

pub async fn login_page(jar: SignedCookieJar) -> Page<Empty> {
    view::render(jar, "admin/login.html", Empty {})
}

pub async fn login(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<AdminLoginForm>,
) -> FormResult {
    let username = form.username.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    let admin = match state.engine.authenticate_admin(&username, &password).await {
        Ok(admin) => admin,
        Err(err) if err.is_internal() => return Err(err.into()),
        Err(err) => {
            tracing::warn!("rejected admin login for {:?}", username.trim());
            return view::redirect(jar, "/admin/login", FlashMessage::error(err.to_string()));
        }
    };

    let jar = session::end(&state, jar).await?;
    let session = state.engine.open_session(Principal::Admin(admin.id)).await?;
    let jar = session::attach(jar, &session, state.config.secure_cookies);
    view::redirect(
        jar,
        "/admin/dashboard",
        FlashMessage::success("Logged in successfully."),
    )
}

pub async fn logout(State(state): State<ServerState>, jar: SignedCookieJar) -> FormResult {
    let jar = session::end(&state, jar).await?;
    view::redirect(
        jar,
        "/admin/login",
        FlashMessage::info("You have been logged out."),
    )
}

pub async fn dashboard(
    Extension(admin): Extension<Admin>,
    State(state): State<ServerState>,
    jar: SignedCookieJar,
) -> Result<Page<DashboardPage>, ServerError> {
    let counts = state.engine.dashboard().await?;
    Ok(view::render(
        jar,
        "admin/dashboard.html",
        DashboardPage {
            username: admin.username,
            voters: counts.voters,
            elections: counts.elections,
            positions: counts.positions,
            candidates: counts.candidates,
            ballots: counts.ballots,
        },
    ))
}

pub async fn voters(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
) -> Result<Page<VotersPage>, ServerError> {
    let voters = state.engine.list_voters().await?;
    Ok(view::render(
        jar,
        "admin/voters.html",
        VotersPage {
            voters: voters.into_iter().map(view::voter_row).collect(),
        },
    ))
}
