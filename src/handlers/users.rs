//! # User Handlers

use crate::error::{AppError, AppResult};
use crate::session::{credentials, users};
use axum::Json;
use serde_json::{json, Value};
use tower_sessions::Session;

/// Profile of the logged-in session user
///
/// ## Route
/// GET /api/users/me
///
/// ## Authentication
/// Protected by the `require_auth` middleware
///
/// ## Response
/// ```json
/// {
///   "handle": "550e8400-e29b-41d4-a716-446655440000",
///   "name": "testuser@example.com",
///   "display_name": "Test User",
///   "credentials": [{ "id": "hKl0...", "signCount": 3, ... }]
/// }
/// ```
///
/// Only credential summaries are returned, never the stored passkeys.
pub async fn get_current_user(session: Session) -> AppResult<Json<Value>> {
    // require_auth already checked this, but the session may have been
    // modified concurrently
    let handle = users::authenticated_handle(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let user = users::current(&session)
        .await?
        .filter(|user| user.handle == handle)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let credentials: Vec<_> = credentials::load(&session)
        .await?
        .iter()
        .filter(|(_, cred)| cred.user_handle == handle)
        .map(|(id, cred)| cred.summary(id))
        .collect();

    Ok(Json(json!({
        "handle": user.handle,
        "name": user.name,
        "display_name": user.display_name,
        "credentials": credentials
    })))
}
