//! # Passkey Session Server
//!
//! A WebAuthn relying party that keeps everything in the HTTP session: the
//! pending challenge with its expiry, and the registered passkeys keyed by
//! credential ID. webauthn-rs does the cryptography; this crate sequences
//! the calls and stores the results.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;
pub mod webauthn;

pub use app::build_router;
pub use config::{Config, SessionBackend};
pub use state::AppState;
