//! # HTTP Request Handlers
//!
//! ## Submodules
//! - `health`: Health check endpoint (for monitoring)
//! - `auth`: Registration, authentication, logout and session endpoints
//! - `users`: Profile of the logged-in session user
//!
//! Handlers only extract the request (state, session, query, JSON body),
//! call into [`crate::webauthn`] or [`crate::session`], and wrap the result
//! in JSON. Errors convert to responses through `AppError`.

pub mod auth;
pub mod health;
pub mod users;
