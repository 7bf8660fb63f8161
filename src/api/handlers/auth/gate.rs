//! Request gate applied to every route.
//!
//! 1. no strategy configured: pass through
//! 2. path excluded (or no-op strategy): pass through
//! 3. neither `Authorization` nor session cookie: 401
//! 4. credentials do not resolve to a user: 403
//! 5. otherwise the user is stored as [`CurrentUser`] for the handler

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::state::AuthState;
use super::types::{forbidden, unauthorized, CurrentUser};

pub async fn require_auth(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(strategy) = auth_state.strategy() else {
        return next.run(request).await;
    };

    if !strategy.require_auth(request.uri().path(), auth_state.config().excluded_paths()) {
        return next.run(request).await;
    }

    if strategy.authorization_header(request.headers()).is_none()
        && strategy.session_cookie(request.headers()).is_none()
    {
        debug!(path = request.uri().path(), "no credentials");
        return unauthorized();
    }

    let Some(user) = strategy.current_user(request.headers()).await else {
        debug!(path = request.uri().path(), "credentials did not resolve to a user");
        return forbidden();
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}
