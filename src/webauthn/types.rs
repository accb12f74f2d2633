//! # WebAuthn API Types
//!
//! Request and response bodies of the ceremony endpoints. Options returned
//! to the browser are webauthn-rs types and are serialized as-is; the
//! browser's credential comes in as raw JSON and is parsed only after the
//! pending challenge has been checked.

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_NAME: &str = "testuser@example.com";
pub const DEFAULT_DISPLAY_NAME: &str = "Test User";

/// Query string of `GET /api/register/options`
///
/// Both fields are optional:
/// ```text
/// /api/register/options?username=alice&display_name=Alice%20Smith
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationOptionsQuery {
    pub username: Option<String>,
    pub display_name: Option<String>,
}

impl RegistrationOptionsQuery {
    /// Blank values count as missing
    pub fn names(&self) -> (String, String) {
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        (
            pick(&self.username, DEFAULT_USER_NAME),
            pick(&self.display_name, DEFAULT_DISPLAY_NAME),
        )
    }
}

/// Result of a successful attestation
///
/// ## Example JSON
/// ```json
/// {
///   "success": true,
///   "credentialId": "hKl0...",
///   "publicKey": { "type_": "ES256", "key": { "EC_EC2": { ... } } }
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub success: bool,
    pub credential_id: String,
    /// The credential's COSE public key as webauthn-rs serializes it
    pub public_key: serde_json::Value,
}

/// Result of a successful assertion
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOutcome {
    pub success: bool,
    pub credential_id: String,
    pub sign_count: u32,
}
