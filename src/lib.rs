//! # Sessiongate (request authentication layer)
//!
//! `sessiongate` gates an HTTP API behind one authentication strategy chosen at
//! process start, and exposes login/logout endpoints for the session-based ones.
//!
//! ## Strategies
//!
//! - **`auth`:** no-op strategy, nothing is gated.
//! - **`basic_auth`:** `Authorization: Basic` credentials checked against the user store.
//! - **`session_auth`:** opaque session id cookie, kept in process memory.
//! - **`session_exp_auth`:** same as above, ids stop resolving after `SESSION_DURATION` seconds.
//! - **`session_db_auth`:** expiring sessions persisted in the `user_sessions` table.
//!
//! When `AUTH_TYPE` is unset no strategy is installed and every request passes.
//!
//! ## Sessions
//!
//! Session ids are 32 random bytes from the OS RNG, URL-safe base64 encoded.
//! A session created at `t0` with a duration `d > 0` resolves to its user while
//! `t0 + d >= now`; a duration `<= 0` disables expiration.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
