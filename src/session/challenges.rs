//! Pending challenge: issue, check expiry and ceremony, clear after use.

use crate::error::{AppError, AppResult};
use crate::session::models::{Ceremony, PendingChallenge};
use crate::session::CHALLENGE_KEY;
use chrono::Utc;
use tower_sessions::Session;
use webauthn_rs::prelude::{PasskeyAuthentication, PasskeyRegistration};

pub const MISSING_OR_EXPIRED: &str = "Challenge is missing or has expired";

/// Store a freshly issued challenge, replacing any pending one.
pub async fn issue(
    session: &Session,
    ceremony: Ceremony,
    ttl: std::time::Duration,
) -> AppResult<PendingChallenge> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|_| AppError::Internal("Challenge TTL out of range".to_string()))?;
    let pending = PendingChallenge::new(ceremony, Utc::now(), ttl);

    session.insert(CHALLENGE_KEY, &pending).await?;

    tracing::debug!(
        ceremony = pending.ceremony.name(),
        expires_at = %pending.expires_at,
        "Issued challenge"
    );

    Ok(pending)
}

/// Library state of a pending, unexpired registration challenge
pub async fn registration_state(session: &Session) -> AppResult<PasskeyRegistration> {
    match load_valid(session).await? {
        Some(Ceremony::Registration(state)) => Ok(state),
        Some(other) => Err(wrong_ceremony(&other, "registration")),
        None => Err(AppError::BadRequest(MISSING_OR_EXPIRED.to_string())),
    }
}

/// Library state of a pending, unexpired authentication challenge
pub async fn authentication_state(session: &Session) -> AppResult<PasskeyAuthentication> {
    match load_valid(session).await? {
        Some(Ceremony::Authentication(state)) => Ok(state),
        Some(other) => Err(wrong_ceremony(&other, "authentication")),
        None => Err(AppError::BadRequest(MISSING_OR_EXPIRED.to_string())),
    }
}

pub async fn is_pending(session: &Session) -> AppResult<bool> {
    Ok(load_valid(session).await?.is_some())
}

pub async fn clear(session: &Session) -> AppResult<()> {
    session.remove::<PendingChallenge>(CHALLENGE_KEY).await?;
    Ok(())
}

// Expired challenges are dropped from the session as soon as they're seen
async fn load_valid(session: &Session) -> AppResult<Option<Ceremony>> {
    let Some(pending) = session.get::<PendingChallenge>(CHALLENGE_KEY).await? else {
        return Ok(None);
    };

    if pending.is_expired_at(Utc::now()) {
        tracing::debug!(
            ceremony = pending.ceremony.name(),
            expired_at = %pending.expires_at,
            "Discarding expired challenge"
        );
        clear(session).await?;
        return Ok(None);
    }

    Ok(Some(pending.ceremony))
}

// A challenge issued for the other ceremony is treated as missing.
fn wrong_ceremony(found: &Ceremony, wanted: &str) -> AppError {
    tracing::debug!(found = found.name(), wanted, "Pending challenge belongs to another ceremony");
    AppError::BadRequest(MISSING_OR_EXPIRED.to_string())
}
