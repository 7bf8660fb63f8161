use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, StatusCode,
    },
};
use sessiongate::api::{
    handlers::auth::{
        AuthConfig, AuthState, AuthType, MemorySessionStore, MemoryUserStore, SessionRegistry,
        SessionStore, Strategy, User,
    },
    router,
};
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn registry_round_trip() {
    let registry = SessionRegistry::in_memory(0);
    let user_id = uuid::Uuid::new_v4();

    let session_id = registry.create_session(Some(user_id)).await;
    assert!(session_id.is_some());
    assert_eq!(
        registry.user_id_for_session_id(session_id.as_deref()).await,
        Some(user_id)
    );

    assert!(registry.create_session(None).await.is_none());
    assert!(registry.user_id_for_session_id(None).await.is_none());
    assert!(!registry.destroy(None).await);

    assert!(registry.destroy(session_id.as_deref()).await);
    assert!(registry
        .user_id_for_session_id(session_id.as_deref())
        .await
        .is_none());
}

#[tokio::test]
async fn durable_login_me_logout() -> Result<()> {
    let users = Arc::new(MemoryUserStore::new());
    users.insert(User::new("bob@hbtn.io", "pwd")?).await;

    let sessions = Arc::new(MemorySessionStore::new());
    let strategy = Strategy::select(
        AuthType::SessionDbAuth,
        300,
        Some("sid".to_string()),
        users.clone(),
        Some(sessions.clone() as Arc<dyn SessionStore>),
    )?;
    let config = AuthConfig::new();
    let app = router(Arc::new(AuthState::new(config, Some(strategy), users)));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth_session/login/")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=bob%40hbtn.io&password=pwd"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(ToString::to_string)
        .context("missing session cookie")?;
    assert_eq!(sessions.len().await, 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(COOKIE, cookie.as_str())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let user: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(user["email"], "bob@hbtn.io");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/auth_session/logout")
                .header(COOKIE, cookie.as_str())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(sessions.is_empty().await);
    Ok(())
}
