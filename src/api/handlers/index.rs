//! Public views; none of them need credentials under the default exclusions.

use axum::{response::Response, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::auth::types::{forbidden, unauthorized, ErrorResponse};

#[derive(ToSchema, Serialize, Debug)]
pub struct Status {
    status: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "API is up", body = Status)),
    tag = "index"
)]
pub async fn status() -> Json<Status> {
    Json(Status {
        status: "OK".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/unauthorized",
    responses((status = 401, description = "Always unauthorized", body = ErrorResponse)),
    tag = "index"
)]
pub async fn unauthorized_view() -> Response {
    unauthorized()
}

#[utoipa::path(
    get,
    path = "/api/v1/forbidden",
    responses((status = 403, description = "Always forbidden", body = ErrorResponse)),
    tag = "index"
)]
pub async fn forbidden_view() -> Response {
    forbidden()
}
