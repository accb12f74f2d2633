//! # Session Credential Store
//!
//! Registered passkeys live in the session under one map, keyed by the
//! base64url (unpadded) credential ID. That is the same encoding the browser
//! uses for `PublicKeyCredential.id`, so an assertion can be looked up
//! directly by the `id` it carries.

use crate::error::{AppError, AppResult};
use crate::session::models::StoredCredential;
use crate::session::CREDENTIALS_KEY;
use base64::prelude::*;
use chrono::Utc;
use std::collections::BTreeMap;
use tower_sessions::Session;
use webauthn_rs::prelude::*;

pub type CredentialMap = BTreeMap<String, StoredCredential>;

/// Encode a credential ID the way browsers report it
pub fn encode_id(id: &CredentialID) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(id)
}

/// All credentials registered in this session. Empty if none.
pub async fn load(session: &Session) -> AppResult<CredentialMap> {
    Ok(session
        .get::<CredentialMap>(CREDENTIALS_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn passkeys(session: &Session) -> AppResult<Vec<Passkey>> {
    Ok(load(session)
        .await?
        .into_values()
        .map(|cred| cred.passkey)
        .collect())
}

/// Save a newly registered credential
///
/// Returns the key it was stored under.
pub async fn insert(session: &Session, credential: StoredCredential) -> AppResult<String> {
    let id = encode_id(credential.passkey.cred_id());
    let mut credentials = load(session).await?;

    if credentials.insert(id.clone(), credential).is_some() {
        tracing::warn!(credential_id = %id, "Replacing credential with the same ID");
    }

    session.insert(CREDENTIALS_KEY, &credentials).await?;
    Ok(id)
}

/// Apply a successful assertion to the stored credential
///
/// The library updates the passkey's internal counter and backup flags; the
/// counter is also copied out so it can be reported without decoding the
/// passkey. Returns the new counter.
pub async fn record_use(
    session: &Session,
    id: &str,
    result: &AuthenticationResult,
) -> AppResult<u32> {
    let mut credentials = load(session).await?;
    let stored = credentials
        .get_mut(id)
        .ok_or_else(|| AppError::BadRequest("Credential not found".to_string()))?;

    stored.passkey.update_credential(result);
    stored.sign_count = result.counter();
    stored.last_used_at = Some(Utc::now());
    let sign_count = stored.sign_count;

    session.insert(CREDENTIALS_KEY, &credentials).await?;
    Ok(sign_count)
}
