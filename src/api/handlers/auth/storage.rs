//! Session record backends: process memory and the `user_sessions` table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

/// A session id bound to its owning user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Uuid,
    /// `None` only for rows written outside this crate.
    pub created_at: Option<DateTime<Utc>>,
}

/// Storage for session records, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a record. Returns `false` when the session id is already taken.
    async fn insert(&self, record: SessionRecord) -> Result<bool>;

    /// First record matching `session_id`, if any.
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Remove the record for `session_id`. Returns `false` when nothing matched.
    async fn delete(&self, session_id: &str) -> Result<bool>;

    /// Drop records created strictly before `cutoff`. Returns how many were removed.
    async fn purge_created_before(&self, _cutoff: DateTime<Utc>) -> Result<usize> {
        Ok(0)
    }
}

/// Process-local session map.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&record.session_id) {
            return Ok(false);
        }
        sessions.insert(record.session_id.clone(), record);
        Ok(true)
    }

    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.lock().await.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions.lock().await.remove(session_id).is_some())
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.created_at.is_some_and(|created| created >= cutoff));
        Ok(before - sessions.len())
    }
}

/// Sessions persisted in PostgreSQL (`user_sessions`).
#[derive(Clone, Debug)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<bool> {
        // The unique index on session_id rejects duplicates instead of overwriting.
        let query = r"
            INSERT INTO user_sessions (session_id, user_id, created_at)
            VALUES ($1, $2, COALESCE($3, NOW()))
            ON CONFLICT (session_id) DO NOTHING
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&record.session_id)
            .bind(record.user_id)
            .bind(record.created_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert session")?;
        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        // Oldest row first if the table ever holds duplicates.
        let query = r"
            SELECT session_id, user_id, created_at
            FROM user_sessions
            WHERE session_id = $1
            ORDER BY created_at ASC NULLS LAST
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;

        Ok(row.map(|row| SessionRecord {
            session_id: row.get("session_id"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
        }))
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        let query = r"
            DELETE FROM user_sessions
            WHERE id = (
                SELECT id FROM user_sessions
                WHERE session_id = $1
                ORDER BY created_at ASC NULLS LAST
                LIMIT 1
            )
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(session_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;
        Ok(result.rows_affected() > 0)
    }
}
