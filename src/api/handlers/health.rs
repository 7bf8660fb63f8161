use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::auth::AuthState;
use crate::GIT_COMMIT_HASH;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    auth_type: Option<String>,
    session_storage: Option<String>,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Service is up", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let strategy = auth_state.strategy();

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        auth_type: strategy.map(|s| s.auth_type().to_string()),
        session_storage: strategy
            .and_then(|s| s.sessions())
            .map(|sessions| sessions.config().storage().as_str().to_string()),
    };

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or("");

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )) {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to build X-App header: {err}"),
    }

    (StatusCode::OK, headers, Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::{AuthConfig, MemoryUserStore};

    #[tokio::test]
    async fn health_reports_app_header() {
        let state = Arc::new(AuthState::new(
            AuthConfig::new(),
            None,
            Arc::new(MemoryUserStore::new()),
        ));
        let response = health(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let app = response
            .headers()
            .get("X-App")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        assert!(app.is_some_and(|app| app.starts_with(env!("CARGO_PKG_NAME"))));
    }
}
