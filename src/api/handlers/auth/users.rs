//! User records and password checks.

use anyhow::{anyhow, Context, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sqlx::{postgres::PgRow, PgPool, Row};
use tokio::sync::RwLock;
use tracing::Instrument;
use uuid::Uuid;

/// A registered user. Responses go through `types::UserResponse`, which has no
/// password hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user with a freshly hashed password.
    ///
    /// # Errors
    /// Returns an error if the password cannot be hashed.
    pub fn new(email: &str, password: &str) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }

    /// Check `password` against the stored argon2 hash.
    #[must_use]
    pub fn is_valid_password(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Hash a password into an argon2 PHC string.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Read access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Users whose email matches exactly.
    async fn search_by_email(&self, email: &str) -> Result<Vec<User>>;

    async fn get(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// Users held in memory; handy for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.push(user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn search_by_email(&self, email: &str) -> Result<Vec<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.email == email)
            .cloned()
            .collect())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }
}

/// Users read from the PostgreSQL `users` table.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn search_by_email(&self, email: &str) -> Result<Vec<User>> {
        let query = r"
            SELECT id, email, password_hash, first_name, last_name, created_at, updated_at
            FROM users
            WHERE email = $1
            ORDER BY created_at ASC
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(email)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to search users by email")?;
        Ok(rows.iter().map(User::from_row).collect())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        let query = r"
            SELECT id, email, password_hash, first_name, last_name, created_at, updated_at
            FROM users
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to load user")?;
        Ok(row.as_ref().map(User::from_row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_verification() {
        let user = User::new("bob@hbtn.io", "H0lbertonSchool98!");
        assert!(user.is_ok());
        if let Ok(user) = user {
            assert!(user.is_valid_password("H0lbertonSchool98!"));
            assert!(!user.is_valid_password("wrong"));
            assert!(!user.is_valid_password(""));
        }
    }

    #[test]
    fn garbage_hash_never_validates() {
        let user = User::new("bob@hbtn.io", "pwd").map(|mut user| {
            user.password_hash = "not-a-phc-string".to_string();
            user
        });
        assert!(user.is_ok_and(|user| !user.is_valid_password("pwd")));
    }

    #[tokio::test]
    async fn memory_store_search_and_get() {
        let store = MemoryUserStore::new();
        let user = User::new("bob@hbtn.io", "pwd");
        assert!(user.is_ok());
        let Ok(user) = user else { return };
        store.insert(user.clone()).await;

        let found = store.search_by_email("bob@hbtn.io").await.ok();
        assert_eq!(found.map(|users| users.len()), Some(1));
        assert!(store
            .search_by_email("alice@hbtn.io")
            .await
            .is_ok_and(|users| users.is_empty()));
        assert_eq!(store.get(user.id).await.ok().flatten(), Some(user));
        assert_eq!(store.get(Uuid::new_v4()).await.ok().flatten(), None);
    }
}
