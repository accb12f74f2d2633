//! # Application State
//!
//! Shared state handed to every request handler. Per-user data does not live
//! here: challenges and credentials are kept in each visitor's session (see
//! [`crate::session`]).

use crate::config::Config;
use anyhow::{Context, Result};
use std::sync::Arc;
use webauthn_rs::prelude::*;

/// Shared application state
///
/// Cloned for each request; both fields are behind `Arc`, so a clone only
/// bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// WebAuthn relying party. Generates challenges and verifies the
    /// browser's attestation and assertion responses.
    pub webauthn: Arc<Webauthn>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Build the WebAuthn relying party from configuration
    ///
    /// # Errors
    /// Fails when [`Config::validate`] does, when the RP origin is not a
    /// valid URL, or when webauthn-rs rejects the RP ID / origin combination
    /// (the ID must be a suffix of the origin's host).
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let rp_origin = Url::parse(&config.rp_origin)
            .with_context(|| format!("invalid RP_ORIGIN '{}'", config.rp_origin))?;

        let webauthn = WebauthnBuilder::new(&config.rp_id, &rp_origin)?
            .rp_name(&config.rp_name)
            .timeout(config.challenge_ttl)
            .build()?;

        Ok(AppState {
            webauthn: Arc::new(webauthn),
            config: Arc::new(config.clone()),
        })
    }
}
