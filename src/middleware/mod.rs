//! # Middleware Module
//!
//! Request interceptors that run before route handlers.
//!
//! - `auth`: Rejects requests whose session hasn't completed an assertion

pub mod auth;
