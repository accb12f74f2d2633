//! # Session Models
//!
//! Data kept in a visitor's session between requests. `tower-sessions`
//! stores each value as JSON, so everything here is `Serialize` +
//! `Deserialize`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webauthn_rs::prelude::*;

/// Library state for whichever ceremony the pending challenge belongs to.
///
/// webauthn-rs keeps the challenge bytes (and, for authentication, the
/// allowed credentials with their counters) inside these values. They are
/// the only thing `finish_*` needs besides the browser's response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum Ceremony {
    Registration(PasskeyRegistration),
    Authentication(PasskeyAuthentication),
}

impl Ceremony {
    pub fn name(&self) -> &'static str {
        match self {
            Ceremony::Registration(_) => "registration",
            Ceremony::Authentication(_) => "authentication",
        }
    }
}

/// The challenge most recently issued to this session
///
/// ## Lifecycle
/// 1. Options endpoint issues it with `expires_at = now + ttl`
/// 2. Verify endpoint accepts it only while `now <= expires_at`
/// 3. Successful verification clears it; a failed one leaves it for a retry
#[derive(Debug, Serialize, Deserialize)]
pub struct PendingChallenge {
    pub ceremony: Ceremony,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingChallenge {
    pub fn new(ceremony: Ceremony, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            ceremony,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// The account a session registers credentials for
///
/// `handle` is the WebAuthn user handle. It stays the same for every
/// credential registered in this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub handle: Uuid,
    pub name: String,
    pub display_name: String,
}

impl SessionUser {
    pub fn new(name: String, display_name: String) -> Self {
        Self {
            handle: Uuid::new_v4(),
            name,
            display_name,
        }
    }
}

/// A registered passkey
///
/// The whole `Passkey` is kept, not just the public key: webauthn-rs needs
/// it to build `allowCredentials` and to check counters on the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub passkey: Passkey,

    /// Signature counter reported by the last successful assertion.
    /// 0 until the credential is first used.
    pub sign_count: u32,

    pub user_handle: Uuid,
    pub registered_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    pub fn new(passkey: Passkey, user_handle: Uuid) -> Self {
        Self {
            passkey,
            sign_count: 0,
            user_handle,
            registered_at: Utc::now(),
            last_used_at: None,
        }
    }

    pub fn summary(&self, id: &str) -> CredentialSummary {
        CredentialSummary {
            id: id.to_string(),
            sign_count: self.sign_count,
            registered_at: self.registered_at,
            last_used_at: self.last_used_at,
        }
    }
}

/// What the API reveals about a stored credential
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
    pub id: String,
    pub sign_count: u32,
    pub registered_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}
