use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};

use super::auth::types::{not_found, CurrentUser, ErrorResponse, UserResponse};

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "No credentials", body = ErrorResponse),
        (status = 403, description = "Credentials did not resolve", body = ErrorResponse),
        (status = 404, description = "No user attached to the request", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn me(current_user: Option<Extension<CurrentUser>>) -> Response {
    match current_user {
        Some(Extension(CurrentUser(user))) => Json(UserResponse::from(&user)).into_response(),
        None => not_found(),
    }
}
