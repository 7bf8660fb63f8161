//! Authentication strategies and startup selection.
//!
//! Flow Overview: `AUTH_TYPE` is parsed into an [`AuthType`] once, and
//! [`Strategy::select`] turns it into the single strategy the gate consults for
//! every request. Session-based strategies own a [`SessionRegistry`].

use axum::http::HeaderMap;
use base64ct::{Base64, Encoding};
use std::{fmt, str::FromStr, sync::Arc};
use tracing::{debug, error};
use uuid::Uuid;

use super::registry::{SessionConfig, SessionRegistry, SessionStorage};
use super::storage::{MemorySessionStore, SessionStore};
use super::users::{User, UserStore};
use super::utils::{authorization_header, cookie_value, path_requires_auth};

/// Accepted values of `AUTH_TYPE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthType {
    Auth,
    BasicAuth,
    SessionAuth,
    SessionExpAuth,
    SessionDbAuth,
}

impl AuthType {
    pub const VALUES: [&'static str; 5] = [
        "auth",
        "basic_auth",
        "session_auth",
        "session_exp_auth",
        "session_db_auth",
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::BasicAuth => "basic_auth",
            Self::SessionAuth => "session_auth",
            Self::SessionExpAuth => "session_exp_auth",
            Self::SessionDbAuth => "session_db_auth",
        }
    }

    /// Session tier for session-based types, `None` otherwise.
    #[must_use]
    pub const fn session_config(self, duration_seconds: i64) -> Option<SessionConfig> {
        match self {
            Self::Auth | Self::BasicAuth => None,
            Self::SessionAuth => Some(SessionConfig::new(SessionStorage::Memory, 0)),
            Self::SessionExpAuth => Some(SessionConfig::new(
                SessionStorage::Memory,
                duration_seconds,
            )),
            Self::SessionDbAuth => Some(SessionConfig::new(
                SessionStorage::Durable,
                duration_seconds,
            )),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auth" => Ok(Self::Auth),
            "basic_auth" => Ok(Self::BasicAuth),
            "session_auth" => Ok(Self::SessionAuth),
            "session_exp_auth" => Ok(Self::SessionExpAuth),
            "session_db_auth" => Ok(Self::SessionDbAuth),
            other => Err(format!("unknown auth type: {other}")),
        }
    }
}

#[derive(Debug)]
pub enum StrategyKind {
    /// Nothing is gated.
    NoAuth,
    /// `Authorization: Basic` credentials.
    Basic,
    /// Session id cookie resolved through a registry.
    Session(SessionRegistry),
}

/// The active authentication strategy.
pub struct Strategy {
    auth_type: AuthType,
    kind: StrategyKind,
    session_name: Option<String>,
    users: Arc<dyn UserStore>,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("auth_type", &self.auth_type)
            .field("kind", &self.kind)
            .field("session_name", &self.session_name)
            .finish_non_exhaustive()
    }
}

impl Strategy {
    #[must_use]
    pub fn new(
        auth_type: AuthType,
        kind: StrategyKind,
        session_name: Option<String>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            auth_type,
            kind,
            session_name,
            users,
        }
    }

    /// Build the strategy for `auth_type`.
    ///
    /// `durable` backs `session_db_auth`; every other session type gets a
    /// private in-memory store.
    ///
    /// # Errors
    /// Returns an error if `session_db_auth` is requested without a durable store.
    pub fn select(
        auth_type: AuthType,
        session_duration: i64,
        session_name: Option<String>,
        users: Arc<dyn UserStore>,
        durable: Option<Arc<dyn SessionStore>>,
    ) -> anyhow::Result<Self> {
        let kind = match auth_type.session_config(session_duration) {
            None if auth_type == AuthType::BasicAuth => StrategyKind::Basic,
            None => StrategyKind::NoAuth,
            Some(config) => {
                let store: Arc<dyn SessionStore> = match config.storage() {
                    SessionStorage::Memory => Arc::new(MemorySessionStore::new()),
                    SessionStorage::Durable => durable.ok_or_else(|| {
                        anyhow::anyhow!("{auth_type} requires a durable session store")
                    })?,
                };
                StrategyKind::Session(SessionRegistry::new(config, store))
            }
        };
        Ok(Self::new(auth_type, kind, session_name, users))
    }

    #[must_use]
    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    #[must_use]
    pub fn kind(&self) -> &StrategyKind {
        &self.kind
    }

    #[must_use]
    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    /// Registry of session-based strategies.
    #[must_use]
    pub fn sessions(&self) -> Option<&SessionRegistry> {
        match &self.kind {
            StrategyKind::Session(registry) => Some(registry),
            StrategyKind::NoAuth | StrategyKind::Basic => None,
        }
    }

    /// Whether `path` must be authenticated. The no-op strategy never requires it.
    #[must_use]
    pub fn require_auth(&self, path: &str, excluded_paths: &[String]) -> bool {
        match self.kind {
            StrategyKind::NoAuth => false,
            StrategyKind::Basic | StrategyKind::Session(_) => {
                path_requires_auth(path, excluded_paths)
            }
        }
    }

    #[must_use]
    pub fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        authorization_header(headers)
    }

    /// Value of the configured session cookie; `None` when no name is configured.
    #[must_use]
    pub fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        cookie_value(headers, self.session_name.as_deref()?)
    }

    /// Resolve the user behind the request credentials.
    pub async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        match &self.kind {
            StrategyKind::NoAuth => None,
            StrategyKind::Basic => {
                let (email, password) = basic_credentials(self.authorization_header(headers)?)?;
                self.user_from_credentials(&email, &password).await
            }
            StrategyKind::Session(registry) => {
                let session_id = self.session_cookie(headers);
                let user_id = registry.user_id_for_session_id(session_id.as_deref()).await?;
                self.load_user(user_id).await
            }
        }
    }

    /// Create a session for `user_id`; `None` for strategies without sessions.
    pub async fn create_session(&self, user_id: Option<Uuid>) -> Option<String> {
        self.sessions()?.create_session(user_id).await
    }

    /// Destroy the session named by the request cookie.
    pub async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        let Some(registry) = self.sessions() else {
            return false;
        };
        let Some(session_id) = self.session_cookie(headers) else {
            return false;
        };
        registry.destroy(Some(&session_id)).await
    }

    async fn load_user(&self, user_id: Uuid) -> Option<User> {
        match self.users.get(user_id).await {
            Ok(user) => user,
            Err(err) => {
                error!("Failed to load user: {err:#}");
                None
            }
        }
    }

    async fn user_from_credentials(&self, email: &str, password: &str) -> Option<User> {
        let users = match self.users.search_by_email(email).await {
            Ok(users) => users,
            Err(err) => {
                error!("Failed to search users: {err:#}");
                return None;
            }
        };
        let user = users.into_iter().next()?;
        if user.is_valid_password(password) {
            Some(user)
        } else {
            debug!("basic auth password mismatch");
            None
        }
    }
}

/// Decode `Basic <base64(email:password)>` into its two parts.
///
/// The password may itself contain `:`; only the first one separates.
pub(crate) fn basic_credentials(authorization: &str) -> Option<(String, String)> {
    let encoded = authorization.strip_prefix("Basic ")?;
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}
