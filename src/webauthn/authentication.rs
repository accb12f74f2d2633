use crate::error::{AppError, AppResult};
use crate::session::models::Ceremony;
use crate::session::{challenges, credentials, users};
use crate::state::AppState;
use crate::webauthn::types::AuthenticationOutcome;
use serde_json::Value;
use tower_sessions::Session;
use webauthn_rs::prelude::*;

pub async fn generate_options(state: &AppState, session: &Session) -> AppResult<RequestChallengeResponse> {
    let passkeys = credentials::passkeys(session).await?;

    if passkeys.is_empty() {
        return Err(AppError::BadRequest(
            "No registered credentials found".to_string(),
        ));
    }

    // Every registered passkey goes into allowCredentials
    let (rcr, auth_state) = state.webauthn.start_passkey_authentication(&passkeys)?;

    challenges::issue(session, Ceremony::Authentication(auth_state), state.config.challenge_ttl).await?;

    tracing::info!(credentials = passkeys.len(), "Generated authentication options");

    Ok(rcr)
}

pub async fn verify(state: &AppState, session: &Session, credential: Value) -> AppResult<AuthenticationOutcome> {
    let auth_state = challenges::authentication_state(session).await?;

    let auth_credential: PublicKeyCredential = serde_json::from_value(credential).map_err(|e| {
        tracing::debug!("Malformed assertion body: {}", e);
        AppError::BadRequest("Malformed credential".to_string())
    })?;

    let stored = credentials::load(session)
        .await?
        .remove(&auth_credential.id)
        .ok_or_else(|| AppError::BadRequest("Credential not found".to_string()))?;

    // Signature, challenge, origin and counter checks all happen here
    let auth_result = state
        .webauthn
        .finish_passkey_authentication(&auth_credential, &auth_state)
        .map_err(|e| AppError::verification("Failed to verify authentication", e))?;

    let sign_count = credentials::record_use(session, &auth_credential.id, &auth_result).await?;

    challenges::clear(session).await?;
    users::mark_authenticated(session, stored.user_handle).await?;

    tracing::info!(
        credential_id = %auth_credential.id,
        sign_count,
        "Authentication successful"
    );

    Ok(AuthenticationOutcome {
        success: true,
        credential_id: auth_credential.id,
        sign_count,
    })
}
