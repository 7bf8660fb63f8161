//! Request/response types shared by the auth handlers and the gate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::users::User;

/// Form body for `POST /api/v1/auth_session/login`.
#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Public JSON view of a user.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// The user resolved by the gate, stored in request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// `{"error": message}` with `status`.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

pub fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
}

pub fn forbidden() -> Response {
    error_response(StatusCode::FORBIDDEN, "Forbidden")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_omits_password_hash() {
        let json = User::new("bob@hbtn.io", "pwd")
            .map(|user| user.with_name("Bob", "Dylan"))
            .ok()
            .and_then(|user| serde_json::to_value(UserResponse::from(&user)).ok());
        assert!(json.is_some());
        if let Some(json) = json {
            assert_eq!(json["email"], "bob@hbtn.io");
            assert_eq!(json["first_name"], "Bob");
            assert_eq!(json["last_name"], "Dylan");
            assert!(json.get("password_hash").is_none());
            assert!(json.get("id").is_some());
        }
    }

    #[test]
    fn login_form_debug_hides_password() {
        let form = LoginForm {
            email: Some("bob@hbtn.io".to_string()),
            password: Some("H0lbertonSchool98!".to_string()),
        };
        let debug = format!("{form:?}");
        assert!(debug.contains("bob@hbtn.io"));
        assert!(!debug.contains("H0lbertonSchool98!"));
    }

    #[test]
    fn generic_error_statuses() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden().status(), StatusCode::FORBIDDEN);
    }
}
