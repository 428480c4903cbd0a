//! Session cookie construction, shared by every route that sets or
//! clears the session.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE: &str = "session";

/// Cookie carrying the session token. `secure` follows the runtime
/// environment so local HTTP development still works.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(Duration::days(30))
        .finish()
}

/// Expired cookie that clears the session.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}
