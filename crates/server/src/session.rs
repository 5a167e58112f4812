//! Session cookie handling and the route guards built on it.

use api_types::flash::FlashMessage;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use engine::{EngineError, Session};

use crate::{ServerError, flash, server::ServerState};

pub(crate) const SESSION_COOKIE: &str = "session";

/// Token carried by the request, if its signature checks out.
pub(crate) fn token(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Attach a freshly opened session to the response.
pub(crate) fn attach(jar: SignedCookieJar, session: &Session, secure: bool) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session.token.clone()))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax),
    )
}

/// Close the current session, if any, and clear the cookie.
pub(crate) async fn end(
    state: &ServerState,
    jar: SignedCookieJar,
) -> Result<SignedCookieJar, ServerError> {
    let Some(token) = token(&jar) else {
        return Ok(jar);
    };
    state.engine.close_session(&token).await?;
    Ok(jar.remove(Cookie::build(SESSION_COOKIE).path("/")))
}

/// Admin pages: resolve the session to an [`engine::Admin`] or send the
/// client to the admin login page.
pub(crate) async fn require_admin(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let admin = match token(&jar) {
        Some(token) => state.engine.session_admin(&token).await?,
        None => None,
    };
    let Some(admin) = admin else {
        let jar = flash::push(jar, FlashMessage::error("Please log in as an administrator."));
        return Ok((jar, Redirect::to("/admin/login")).into_response());
    };

    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

/// Voter pages: resolve the session to an [`engine::Voter`] or send the
/// client to the voter login page.
pub(crate) async fn require_voter(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let voter = match token(&jar) {
        Some(token) => state.engine.session_voter(&token).await?,
        None => None,
    };
    let Some(voter) = voter else {
        let jar = flash::push(jar, FlashMessage::error("Please log in to vote."));
        return Ok((jar, Redirect::to("/")).into_response());
    };

    request.extensions_mut().insert(voter);
    Ok(next.run(request).await)
}

/// JSON endpoints answer 401 instead of redirecting.
pub(crate) async fn require_voter_json(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let voter = match token(&jar) {
        Some(token) => state.engine.session_voter(&token).await?,
        None => None,
    };
    let voter = voter.ok_or(ServerError::Engine(EngineError::Unauthorized))?;

    request.extensions_mut().insert(voter);
    Ok(next.run(request).await)
}
