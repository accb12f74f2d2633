//! # Passkey Registration
//!
//! Registration is a two-step exchange:
//! 1. **Options**: webauthn-rs generates a challenge, we remember it (and
//!    its expiry) in the session and send the options to the browser
//! 2. **Verify**: the browser returns the attestation, webauthn-rs checks
//!    it against the remembered state, we store the resulting passkey
//!
//! Signature and attestation checks happen inside webauthn-rs.

use crate::error::{AppError, AppResult};
use crate::session::models::{Ceremony, StoredCredential};
use crate::session::{challenges, credentials, users};
use crate::state::AppState;
use crate::webauthn::types::RegistrationOutcome;
use serde_json::Value;
use tower_sessions::Session;
use webauthn_rs::prelude::*;

/// Generate registration options for this session's user
///
/// ## Flow
/// 1. Find or create the session user (stable user handle)
/// 2. Exclude credentials this session already registered, so the same
///    authenticator isn't enrolled twice
/// 3. Ask webauthn-rs for a challenge
/// 4. Store the registration state with its expiry
///
/// ## Returns
/// `CreationChallengeResponse`, passed to `navigator.credentials.create()`
pub async fn generate_options(
    state: &AppState,
    session: &Session,
    name: &str,
    display_name: &str,
) -> AppResult<CreationChallengeResponse> {
    let user = users::current_or_create(session, name, display_name).await?;

    let exclude: Vec<CredentialID> = credentials::passkeys(session)
        .await?
        .iter()
        .map(|passkey| passkey.cred_id().clone())
        .collect();
    let exclude = if exclude.is_empty() { None } else { Some(exclude) };

    let (ccr, reg_state) = state.webauthn.start_passkey_registration(
        user.handle,
        &user.name,
        &user.display_name,
        exclude,
    )?;

    challenges::issue(session, Ceremony::Registration(reg_state), state.config.challenge_ttl).await?;

    tracing::info!(user_handle = %user.handle, "Generated registration options");

    Ok(ccr)
}

/// Verify the browser's attestation and store the new credential
///
/// ## Errors
/// - BadRequest: no unexpired registration challenge, or the body isn't a
///   `RegisterPublicKeyCredential`
/// - Verification: webauthn-rs rejected the attestation. The challenge is
///   kept so the browser can retry until it expires.
pub async fn verify(state: &AppState, session: &Session, credential: Value) -> AppResult<RegistrationOutcome> {
    // Challenge first: a stale session gets the same answer whatever it sent
    let reg_state = challenges::registration_state(session).await?;

    let user = users::current(session)
        .await?
        .ok_or_else(|| AppError::BadRequest(challenges::MISSING_OR_EXPIRED.to_string()))?;

    let reg_credential: RegisterPublicKeyCredential = serde_json::from_value(credential)
        .map_err(|e| {
            tracing::debug!("Malformed attestation body: {}", e);
            AppError::BadRequest("Malformed credential".to_string())
        })?;

    let passkey = state
        .webauthn
        .finish_passkey_registration(&reg_credential, &reg_state)
        .map_err(|e| AppError::verification("Failed to register credential", e))?;

    let public_key = serde_json::to_value(passkey.get_public_key())?;
    let credential_id = credentials::insert(session, StoredCredential::new(passkey, user.handle)).await?;

    // Challenges are single use
    challenges::clear(session).await?;

    tracing::info!(
        user_handle = %user.handle,
        credential_id = %credential_id,
        "Registered credential"
    );

    Ok(RegistrationOutcome {
        success: true,
        credential_id,
        public_key,
    })
}
