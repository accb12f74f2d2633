//! # Session Storage
//!
//! All relying-party state is scoped to the visitor's HTTP session. The
//! session store (memory or SQLite) holds the data; the browser only keeps
//! the session ID cookie.
//!
//! - `models`: Challenge, user and credential records
//! - `challenges`: Issue, validate and clear the pending challenge
//! - `credentials`: Registered passkeys keyed by credential ID
//! - `users`: The session's user handle and login flag

pub mod challenges;
pub mod credentials;
pub mod models;
pub mod users;

pub(crate) const CHALLENGE_KEY: &str = "challenge";
pub(crate) const CREDENTIALS_KEY: &str = "credentials";
pub(crate) const USER_KEY: &str = "user";
pub(crate) const AUTHENTICATED_KEY: &str = "authenticated";
