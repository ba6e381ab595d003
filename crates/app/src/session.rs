//! Session id carried in the `session` cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use quiz_core::model::SessionId;

pub const SESSION_COOKIE: &str = "session";

/// The session id the client already holds, if it is well formed.
#[must_use]
pub fn current(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::parse(cookie.value()).ok())
}

/// Cookie lifetime matching a session idle timeout.
#[must_use]
pub fn cookie_max_age(idle_timeout: chrono::Duration) -> time::Duration {
    time::Duration::seconds(idle_timeout.num_seconds())
}

/// The client's session id, minting and setting a fresh one if absent.
#[must_use]
pub fn ensure(jar: CookieJar, max_age: time::Duration) -> (CookieJar, SessionId) {
    if let Some(id) = current(&jar) {
        return (jar, id);
    }
    let id = SessionId::generate();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build();
    (jar.add(cookie), id)
}
