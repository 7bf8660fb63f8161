//! Small helpers for session ids, request credentials and path exclusion.

use anyhow::{Context, Result};
use axum::http::{
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

/// Create a new opaque session id for the auth cookie.
pub(crate) fn generate_session_id() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session id")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Return the `Authorization` header verbatim.
pub(crate) fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION)?.to_str().ok()
}

/// Find the value of cookie `name` across every `Cookie` header.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
}

/// Decide whether `path` is outside every excluded path.
///
/// `/a/b` and `/a/b/` are equivalent; a pattern ending in `*` matches any path
/// whose slash-terminated form starts with the text before the `*`, so
/// `/a/b/*` covers `/a/b` as well as everything below it.
pub(crate) fn path_requires_auth(path: &str, excluded_paths: &[String]) -> bool {
    if path.is_empty() {
        return false;
    }
    let normalized = with_trailing_slash(path);
    !excluded_paths.iter().any(|pattern| {
        if let Some(prefix) = pattern.strip_suffix('*') {
            normalized.starts_with(prefix)
        } else {
            with_trailing_slash(pattern) == normalized
        }
    })
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Build the session cookie; `Max-Age` is only set when sessions expire.
pub(crate) fn session_cookie_header(
    name: &str,
    session_id: &str,
    max_age_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    if max_age_seconds > 0 {
        cookie.push_str(&format!("; Max-Age={max_age_seconds}"));
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_session_cookie_header(name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"))
}
