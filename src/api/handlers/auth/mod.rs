//! Auth handlers and supporting modules.
//!
//! The active [`Strategy`] is chosen once from `AUTH_TYPE` and lives in
//! [`AuthState`]. The [`gate`] middleware consults it on every request; the
//! [`session`] endpoints use it to create and destroy sessions.
//!
//! ## Session tiers
//!
//! | `AUTH_TYPE`        | storage  | expiration         |
//! |--------------------|----------|--------------------|
//! | `session_auth`     | memory   | never              |
//! | `session_exp_auth` | memory   | `SESSION_DURATION` |
//! | `session_db_auth`  | postgres | `SESSION_DURATION` |
//!
//! Store failures while resolving or destroying a session are logged and read
//! as "no session", never as a server error.

pub mod gate;
pub mod registry;
pub(crate) mod session;
mod state;
pub mod storage;
mod strategy;
pub(crate) mod types;
pub mod users;
mod utils;

pub use registry::{Clock, SessionConfig, SessionRegistry, SessionStorage, SystemClock};
pub use state::{AuthConfig, AuthState, DEFAULT_EXCLUDED_PATHS};
pub use storage::{MemorySessionStore, PgSessionStore, SessionRecord, SessionStore};
pub use strategy::{AuthType, Strategy, StrategyKind};
pub use types::CurrentUser;
pub use users::{hash_password, MemoryUserStore, PgUserStore, User, UserStore};
