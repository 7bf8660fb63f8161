use crate::api::handlers::{auth, health, index, users};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{delete, get, post},
    Extension, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

/// Build the application router around a prepared auth state.
///
/// Every route, including the 404 fallback, runs behind the auth gate.
#[must_use]
pub fn router(auth_state: Arc<auth::AuthState>) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/status", get(index::status))
        .route("/api/v1/status/", get(index::status))
        .route("/api/v1/unauthorized", get(index::unauthorized_view))
        .route("/api/v1/forbidden", get(index::forbidden_view))
        .route("/api/v1/users/me", get(users::me))
        .route("/api/v1/auth_session/login", post(auth::session::login))
        .route("/api/v1/auth_session/login/", post(auth::session::login))
        .route("/api/v1/auth_session/logout", delete(auth::session::logout))
        .route("/api/v1/auth_session/logout/", delete(auth::session::logout))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth::gate::require_auth,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state)),
        )
}

async fn fallback() -> axum::response::Response {
    auth::types::not_found()
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(addr: SocketAddr, auth_state: Arc<auth::AuthState>) -> Result<()> {
    let app = router(auth_state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
