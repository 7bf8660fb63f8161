//! Session login/logout endpoints.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    state::AuthState,
    types::{error_response, not_found, ErrorResponse, LoginForm, UserResponse},
    utils::{clear_session_cookie_header, session_cookie_header},
};

#[utoipa::path(
    post,
    path = "/api/v1/auth_session/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session created; cookie set", body = UserResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "No user for this email", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    form: Option<Form<LoginForm>>,
) -> Response {
    let (email, password) = match form {
        Some(Form(LoginForm { email, password })) => (email, password),
        None => (None, None),
    };

    let Some(email) = email.filter(|email| !email.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "email missing");
    };
    let Some(password) = password.filter(|password| !password.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "password missing");
    };

    let users = match auth_state.users().search_by_email(&email).await {
        Ok(users) => users,
        Err(err) => {
            error!("Failed to search users: {err:#}");
            Vec::new()
        }
    };
    let Some(user) = users.into_iter().next() else {
        debug!("no user for login email");
        return error_response(StatusCode::NOT_FOUND, "no user found for this email");
    };

    if !user.is_valid_password(&password) {
        return error_response(StatusCode::UNAUTHORIZED, "wrong password");
    }

    let Some(strategy) = auth_state.strategy() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "session unavailable");
    };
    let Some(session_id) = strategy.create_session(Some(user.id)).await else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "session unavailable");
    };

    let mut headers = HeaderMap::new();
    if let Some(name) = strategy.session_name() {
        let max_age = strategy
            .sessions()
            .map_or(0, |sessions| sessions.config().duration_seconds());
        match session_cookie_header(name, &session_id, max_age) {
            Ok(cookie) => {
                headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build session cookie: {err}"),
        }
    }

    (StatusCode::OK, headers, Json(UserResponse::from(&user))).into_response()
}

#[utoipa::path(
    delete,
    path = "/api/v1/auth_session/logout",
    responses(
        (status = 200, description = "Session destroyed"),
        (status = 404, description = "No session to destroy", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>, headers: HeaderMap) -> Response {
    let Some(strategy) = auth_state.strategy() else {
        return not_found();
    };
    if !strategy.destroy_session(&headers).await {
        return not_found();
    }

    let mut response_headers = HeaderMap::new();
    if let Some(cookie) = strategy
        .session_name()
        .and_then(|name| clear_session_cookie_header(name).ok())
    {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::OK, response_headers, Json(json!({}))).into_response()
}
