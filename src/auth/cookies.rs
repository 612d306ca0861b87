//! OAuth state cookie

use axum::http::{header::COOKIE, HeaderMap};

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
pub const OAUTH_STATE_MAX_AGE_SECS: u32 = 600;

/// `Set-Cookie` value binding `state` to this browser for ten minutes.
pub fn state_cookie(state: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        OAUTH_STATE_COOKIE, state, OAUTH_STATE_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the state cookie immediately.
pub fn clear_state_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", OAUTH_STATE_COOKIE);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// First value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
