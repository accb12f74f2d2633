//! # WebAuthn Module
//!
//! Sequences calls into webauthn-rs and keeps the results in the session.
//!
//! ## Submodules
//! - `types`: Request/response types for the API
//! - `registration`: Creating new passkey credentials
//! - `authentication`: Logging in with existing passkeys
//!
//! ## Registration
//! 1. `GET /api/register/options` → `registration::generate_options()`
//! 2. Browser calls `navigator.credentials.create()`
//! 3. `POST /api/register` → `registration::verify()` stores the passkey
//!
//! ## Authentication
//! 1. `GET /api/auth/options` → `authentication::generate_options()`
//! 2. Browser calls `navigator.credentials.get()`
//! 3. `POST /api/auth/verify` → `authentication::verify()` updates the
//!    signature counter and marks the session logged in

pub mod authentication;
pub mod registration;
pub mod types;
