use crate::error::AppResult;
use crate::session::{challenges, credentials, users};
use crate::state::AppState;
use crate::webauthn::types::*;
use crate::webauthn::{authentication, registration};
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tower_sessions::Session;

// Registration endpoints

pub async fn registration_options(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RegistrationOptionsQuery>,
) -> AppResult<Json<Value>> {
    let (name, display_name) = query.names();
    let ccr = registration::generate_options(&state, &session, &name, &display_name).await?;

    Ok(Json(json!(ccr)))
}

pub async fn register_credential(
    State(state): State<AppState>,
    session: Session,
    Json(credential): Json<Value>,
) -> AppResult<Json<RegistrationOutcome>> {
    let outcome = registration::verify(&state, &session, credential).await?;

    Ok(Json(outcome))
}

// Authentication endpoints

pub async fn authentication_options(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Value>> {
    let rcr = authentication::generate_options(&state, &session).await?;

    Ok(Json(json!(rcr)))
}

pub async fn verify_authentication(
    State(state): State<AppState>,
    session: Session,
    Json(credential): Json<Value>,
) -> AppResult<Json<AuthenticationOutcome>> {
    let outcome = authentication::verify(&state, &session, credential).await?;

    Ok(Json(outcome))
}

// Session management

pub async fn logout(session: Session) -> AppResult<Json<Value>> {
    users::sign_out(&session).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

pub async fn session_info(session: Session) -> AppResult<Json<Value>> {
    let authenticated = users::authenticated_handle(&session).await?.is_some();
    let user = users::current(&session).await?;
    let credentials: Vec<_> = credentials::load(&session)
        .await?
        .iter()
        .map(|(id, cred)| cred.summary(id))
        .collect();
    let challenge_pending = challenges::is_pending(&session).await?;

    Ok(Json(json!({
        "authenticated": authenticated,
        "user": user,
        "credentials": credentials,
        "challengePending": challenge_pending
    })))
}
