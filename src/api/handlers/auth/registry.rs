//! Session registry: id generation, lookup with expiration, and destruction.
//!
//! One registry type covers every session tier. The tier is described by a
//! [`SessionConfig`]: where records live ([`SessionStorage`]) and how long they
//! stay valid. Expiration is decided at lookup time by [`session_is_live`],
//! so memory and database records follow the exact same rule.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::storage::{MemorySessionStore, SessionRecord, SessionStore};
use super::utils::generate_session_id;

/// A freshly generated id colliding with a stored one is retried this many times.
const MAX_ID_ATTEMPTS: usize = 3;

/// Source of the current time, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStorage {
    /// Process memory, lost on restart.
    Memory,
    /// The `user_sessions` table.
    Durable,
}

impl SessionStorage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Durable => "durable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    storage: SessionStorage,
    duration_seconds: i64,
}

impl SessionConfig {
    /// `duration_seconds <= 0` disables expiration.
    #[must_use]
    pub const fn new(storage: SessionStorage, duration_seconds: i64) -> Self {
        Self {
            storage,
            duration_seconds,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> SessionStorage {
        self.storage
    }

    #[must_use]
    pub const fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    #[must_use]
    pub const fn expires(&self) -> bool {
        self.duration_seconds > 0
    }
}

/// Whether a session created at `created_at` still resolves at `now`.
///
/// Expired means `created_at + duration < now`; reaching the boundary exactly
/// is still valid. A missing timestamp only matters when expiration is on.
#[must_use]
pub fn session_is_live(
    created_at: Option<DateTime<Utc>>,
    duration_seconds: i64,
    now: DateTime<Utc>,
) -> bool {
    if duration_seconds <= 0 {
        return true;
    }
    let Some(created_at) = created_at else {
        return false;
    };
    // An offset too large to represent never expires.
    let Some(expiration) = TimeDelta::try_seconds(duration_seconds)
        .and_then(|duration| created_at.checked_add_signed(duration))
    else {
        return true;
    };
    expiration >= now
}

pub struct SessionRegistry {
    config: SessionConfig,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    #[must_use]
    pub fn new(config: SessionConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Registry over a private in-memory map.
    #[must_use]
    pub fn in_memory(duration_seconds: i64) -> Self {
        Self::new(
            SessionConfig::new(SessionStorage::Memory, duration_seconds),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a session for `user_id` and return its id.
    ///
    /// Returns `None` without touching the store when `user_id` is `None`, or
    /// when the id cannot be generated or stored.
    pub async fn create_session(&self, user_id: Option<Uuid>) -> Option<String> {
        let user_id = user_id?;
        let now = self.clock.now();

        if self.config.expires() && self.config.storage == SessionStorage::Memory {
            self.reclaim_expired(now).await;
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let session_id = match generate_session_id() {
                Ok(id) => id,
                Err(err) => {
                    error!("Failed to create session: {err:#}");
                    return None;
                }
            };
            let record = SessionRecord {
                session_id: session_id.clone(),
                user_id,
                created_at: Some(now),
            };
            match self.store.insert(record).await {
                Ok(true) => {
                    debug!(storage = self.config.storage.as_str(), "session created");
                    return Some(session_id);
                }
                Ok(false) => warn!("Generated session id already in use, retrying"),
                Err(err) => {
                    error!("Failed to store session: {err:#}");
                    return None;
                }
            }
        }

        error!("Gave up creating a session after {MAX_ID_ATTEMPTS} id collisions");
        None
    }

    /// Resolve a session id to its user, honouring the configured expiration.
    pub async fn user_id_for_session_id(&self, session_id: Option<&str>) -> Option<Uuid> {
        let session_id = session_id?;
        let record = match self.store.find(session_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => {
                error!("Failed to lookup session: {err:#}");
                return None;
            }
        };

        if session_is_live(
            record.created_at,
            self.config.duration_seconds,
            self.clock.now(),
        ) {
            Some(record.user_id)
        } else {
            debug!("session expired");
            None
        }
    }

    /// Remove the session `session_id`. Returns `false` when nothing was removed.
    pub async fn destroy(&self, session_id: Option<&str>) -> bool {
        let Some(session_id) = session_id else {
            return false;
        };
        match self.store.delete(session_id).await {
            Ok(removed) => removed,
            Err(err) => {
                error!("Failed to delete session: {err:#}");
                false
            }
        }
    }

    async fn reclaim_expired(&self, now: DateTime<Utc>) {
        let Some(cutoff) = TimeDelta::try_seconds(self.config.duration_seconds)
            .and_then(|duration| now.checked_sub_signed(duration))
        else {
            return;
        };
        match self.store.purge_created_before(cutoff).await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "reclaimed expired sessions"),
            Err(err) => warn!("Failed to reclaim expired sessions: {err:#}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub(crate) struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub(crate) fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub(crate) fn advance(&self, seconds: i64) {
            if let Ok(mut now) = self.now.lock() {
                *now += TimeDelta::seconds(seconds);
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
        }
    }

    /// Store whose every operation fails, standing in for an unreachable database.
    #[derive(Debug, Default)]
    pub(crate) struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn insert(&self, _record: SessionRecord) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }

        async fn find(&self, _session_id: &str) -> Result<Option<SessionRecord>> {
            Err(anyhow!("connection refused"))
        }

        async fn delete(&self, _session_id: &str) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }
    }
}
