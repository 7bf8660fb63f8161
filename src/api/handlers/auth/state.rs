//! Auth configuration and the state shared by the gate and the handlers.

use std::sync::Arc;

use super::strategy::Strategy;
use super::users::UserStore;

/// Paths reachable without credentials unless overridden.
pub const DEFAULT_EXCLUDED_PATHS: [&str; 5] = [
    "/api/v1/status/",
    "/api/v1/unauthorized/",
    "/api/v1/forbidden/",
    "/api/v1/auth_session/login/",
    "/health/",
];

#[derive(Clone, Debug)]
/// Gate settings. Session naming and lifetime belong to the selected [`Strategy`].
pub struct AuthConfig {
    excluded_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            excluded_paths: DEFAULT_EXCLUDED_PATHS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    #[must_use]
    pub fn with_excluded_paths(mut self, paths: Vec<String>) -> Self {
        self.excluded_paths = paths;
        self
    }

    #[must_use]
    pub fn excluded_paths(&self) -> &[String] {
        &self.excluded_paths
    }
}

pub struct AuthState {
    config: AuthConfig,
    strategy: Option<Strategy>,
    users: Arc<dyn UserStore>,
}

impl AuthState {
    /// `strategy` is `None` when no `AUTH_TYPE` is configured.
    pub fn new(config: AuthConfig, strategy: Option<Strategy>, users: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            strategy,
            users,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn strategy(&self) -> Option<&Strategy> {
        self.strategy.as_ref()
    }

    pub(super) fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }
}
