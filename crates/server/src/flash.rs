//! One-shot messages carried between a redirect and the next page.
//!
//! Messages live in a signed cookie as base64url-encoded JSON and are cleared
//! by the first view that renders them.

use api_types::flash::FlashMessage;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

pub(crate) const FLASH_COOKIE: &str = "flash";

/// Queue `message` for the next rendered page.
pub(crate) fn push(jar: SignedCookieJar, message: FlashMessage) -> SignedCookieJar {
    let mut messages = read(&jar);
    messages.push(message);
    match encode(&messages) {
        Some(value) => jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        ),
        None => jar,
    }
}

/// Drain the queued messages.
pub(crate) fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<FlashMessage>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }
    let messages = read(&jar);
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

fn read(jar: &SignedCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

fn encode(messages: &[FlashMessage]) -> Option<String> {
    match serde_json::to_vec(messages) {
        Ok(json) => Some(URL_SAFE_NO_PAD.encode(json)),
        Err(err) => {
            tracing::error!("failed to encode flash messages: {err}");
            None
        }
    }
}

fn decode(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(Key::derive_from(&[7; 64]))
    }

    #[test]
    fn messages_accumulate_until_taken() {
        let jar = push(jar(), FlashMessage::success("Saved."));
        let jar = push(jar, FlashMessage::error("But also this."));

        let (jar, messages) = take(jar);
        assert_eq!(
            messages,
            vec![
                FlashMessage::success("Saved."),
                FlashMessage::error("But also this.")
            ]
        );
        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn garbage_decodes_to_nothing() {
        assert!(decode("not base64 !!").is_empty());
        assert!(decode(&URL_SAFE_NO_PAD.encode(b"{not json")).is_empty());
    }
}
