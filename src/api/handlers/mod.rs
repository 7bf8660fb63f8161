//! API handlers for the gated service.
//!
//! `index` holds the public status views, `users` the views that read the
//! user attached by the auth gate.

pub mod auth;
pub mod health;
pub mod index;
pub mod users;
