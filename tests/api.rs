use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64::prelude::*;
use passkey_session_server::{build_router, AppState, Config};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use webauthn_authenticator_rs::softpasskey::SoftPasskey;
use webauthn_authenticator_rs::WebauthnAuthenticator;
use webauthn_rs::prelude::{CreationChallengeResponse, RequestChallengeResponse, Url};

fn app_with(config: Config) -> Router {
    let state = AppState::new(&config).unwrap();
    build_router(state, MemoryStore::default())
}

fn app() -> Router {
    app_with(Config::default())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` part of the session cookie, if the response set one
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Shaped like a browser credential but carrying nothing a verifier accepts
fn bogus_attestation() -> Value {
    json!({
        "id": "c2FtcGxlLWNyZWRlbnRpYWwtaWQ",
        "rawId": "c2FtcGxlLWNyZWRlbnRpYWwtaWQ",
        "type": "public-key",
        "extensions": {},
        "response": {
            "clientDataJSON": BASE64_URL_SAFE_NO_PAD.encode(
                json!({
                    "type": "webauthn.create",
                    "challenge": "dGVzdENoYWxsZW5nZQ",
                    "origin": "http://localhost:3000"
                })
                .to_string()
            ),
            "attestationObject": BASE64_URL_SAFE_NO_PAD.encode("sample-attestation")
        }
    })
}

#[tokio::test]
async fn health() {
    let response = app().oneshot(get("/api/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "Server is healthy" }));
}

#[tokio::test]
async fn registration_options_follow_relying_party_config() {
    let response = app().oneshot(get("/api/register/options", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some(), "options must start a session");

    let body = json_body(response).await;
    let options = &body["publicKey"];

    assert_eq!(options["rp"]["id"], "localhost");
    assert_eq!(options["rp"]["name"], "Anonymous Service");
    assert_eq!(options["user"]["name"], "testuser@example.com");
    assert_eq!(options["user"]["displayName"], "Test User");
    assert_eq!(options["timeout"], 60000);

    // Passkey policy: no attestation, user verification required
    assert_eq!(options["attestation"], "none");
    assert_eq!(options["authenticatorSelection"]["userVerification"], "required");

    let algs: Vec<i64> = options["pubKeyCredParams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            assert_eq!(p["type"], "public-key");
            p["alg"].as_i64().unwrap()
        })
        .collect();
    assert!(algs.contains(&-7), "ES256 missing from {:?}", algs);
    assert!(algs.contains(&-257), "RS256 missing from {:?}", algs);

    let challenge = options["challenge"].as_str().unwrap();
    let decoded = BASE64_URL_SAFE_NO_PAD.decode(challenge).unwrap();
    assert!(decoded.len() >= 16);
}

#[tokio::test]
async fn registration_options_accept_names() {
    let response = app()
        .oneshot(get("/api/register/options?username=alice&display_name=Alice%20Smith", None))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["publicKey"]["user"]["name"], "alice");
    assert_eq!(body["publicKey"]["user"]["displayName"], "Alice Smith");
}

#[tokio::test]
async fn user_handle_is_stable_within_a_session() {
    let app = app();

    let first = app.clone().oneshot(get("/api/register/options", None)).await.unwrap();
    let cookie = session_cookie(&first).unwrap();
    let first = json_body(first).await;

    let second = app
        .clone()
        .oneshot(get("/api/register/options", Some(&cookie)))
        .await
        .unwrap();
    let second = json_body(second).await;

    assert_eq!(first["publicKey"]["user"]["id"], second["publicKey"]["user"]["id"]);
    assert_ne!(first["publicKey"]["challenge"], second["publicKey"]["challenge"]);
}

#[tokio::test]
async fn authentication_options_need_a_registered_credential() {
    let response = app().oneshot(get("/api/auth/options", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No registered credentials found" })
    );
}

#[tokio::test]
async fn verify_without_challenge_is_rejected() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/register", None, bogus_attestation()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Challenge is missing or has expired" })
    );

    let response = app
        .oneshot(post_json("/api/auth/verify", None, json!({ "id": "abc" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Challenge is missing or has expired" })
    );
}

#[tokio::test]
async fn expired_challenge_is_rejected_and_dropped() {
    let app = app_with(Config {
        challenge_ttl: Duration::ZERO,
        ..Config::default()
    });

    let options = app.clone().oneshot(get("/api/register/options", None)).await.unwrap();
    assert_eq!(options.status(), StatusCode::OK);
    let cookie = session_cookie(&options).unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/register", Some(&cookie), bogus_attestation()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Challenge is missing or has expired");

    let info = app.oneshot(get("/api/session", Some(&cookie))).await.unwrap();
    assert_eq!(json_body(info).await["challengePending"], false);
}

#[tokio::test]
async fn registration_challenge_does_not_verify_an_assertion() {
    let app = app();

    let options = app.clone().oneshot(get("/api/register/options", None)).await.unwrap();
    let cookie = session_cookie(&options).unwrap();

    let response = app
        .oneshot(post_json("/api/auth/verify", Some(&cookie), json!({ "id": "abc" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Challenge is missing or has expired");
}

#[tokio::test]
async fn rejected_attestation_keeps_the_challenge() {
    let app = app();

    let options = app.clone().oneshot(get("/api/register/options", None)).await.unwrap();
    let cookie = session_cookie(&options).unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/api/register", Some(&cookie), bogus_attestation()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json("/api/register", Some(&cookie), json!({ "id": 42 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Malformed credential");

    let info = app.oneshot(get("/api/session", Some(&cookie))).await.unwrap();
    let info = json_body(info).await;
    assert_eq!(info["challengePending"], true);
    assert_eq!(info["credentials"], json!([]));
    assert_eq!(info["authenticated"], false);
}

#[tokio::test]
async fn fresh_session_reports_nothing() {
    let response = app().oneshot(get("/api/session", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "authenticated": false,
            "user": null,
            "credentials": [],
            "challengePending": false
        })
    );
}

#[tokio::test]
async fn profile_requires_login() {
    let app = app();

    let response = app.clone().oneshot(get("/api/users/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "error": "Not authenticated" }));

    // Registering alone doesn't log the session in
    let options = app.clone().oneshot(get("/api/register/options", None)).await.unwrap();
    let cookie = session_cookie(&options).unwrap();
    let response = app.oneshot(get("/api/users/me", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_succeeds_without_login() {
    let response = app()
        .oneshot(post_json("/api/logout", None, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);
}

/// Follow the session cookie when the server rotates it
fn follow_cookie(response: &Response, cookie: String) -> String {
    session_cookie(response).unwrap_or(cookie)
}

async fn login(
    app: &Router,
    authenticator: &mut WebauthnAuthenticator<SoftPasskey>,
    origin: &Url,
    cookie: String,
) -> (String, Value, Value) {
    let options = app
        .clone()
        .oneshot(get("/api/auth/options", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(options.status(), StatusCode::OK);
    let cookie = follow_cookie(&options, cookie);
    let options = json_body(options).await;
    assert_eq!(options["publicKey"]["userVerification"], "required");

    let rcr: RequestChallengeResponse = serde_json::from_value(options).unwrap();
    let assertion = authenticator.do_authentication(origin.clone(), rcr).unwrap();
    let assertion = serde_json::to_value(&assertion).unwrap();

    let verified = app
        .clone()
        .oneshot(post_json("/api/auth/verify", Some(&cookie), assertion.clone()))
        .await
        .unwrap();
    assert_eq!(verified.status(), StatusCode::OK);
    let cookie = follow_cookie(&verified, cookie);

    (cookie, json_body(verified).await, assertion)
}

#[tokio::test]
async fn register_then_log_in_twice() {
    let app = app();
    let origin = Url::parse("http://localhost:3000").unwrap();
    let mut authenticator = WebauthnAuthenticator::new(SoftPasskey::new(true));

    // Register
    let options = app.clone().oneshot(get("/api/register/options", None)).await.unwrap();
    assert_eq!(options.status(), StatusCode::OK);
    let cookie = session_cookie(&options).unwrap();
    let ccr: CreationChallengeResponse = serde_json::from_value(json_body(options).await).unwrap();

    let attestation = authenticator.do_registration(origin.clone(), ccr).unwrap();
    let attestation = serde_json::to_value(&attestation).unwrap();

    let registered = app
        .clone()
        .oneshot(post_json("/api/register", Some(&cookie), attestation.clone()))
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::OK);
    let cookie = follow_cookie(&registered, cookie);
    let registered = json_body(registered).await;
    assert_eq!(registered["success"], true);
    assert!(registered["publicKey"].is_object());
    let credential_id = registered["credentialId"].as_str().unwrap().to_string();
    assert_eq!(credential_id, attestation["id"].as_str().unwrap());

    // The attestation can't be replayed: its challenge is gone
    let replay = app
        .clone()
        .oneshot(post_json("/api/register", Some(&cookie), attestation))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(replay).await["error"], "Challenge is missing or has expired");

    let info = app.clone().oneshot(get("/api/session", Some(&cookie))).await.unwrap();
    let info = json_body(info).await;
    assert_eq!(info["authenticated"], false);
    assert_eq!(info["challengePending"], false);
    assert_eq!(info["credentials"][0]["id"], credential_id.as_str());
    assert_eq!(info["credentials"][0]["signCount"], 0);

    // First login
    let (cookie, first, assertion) = login(&app, &mut authenticator, &origin, cookie).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["credentialId"], credential_id.as_str());
    let first_count = first["signCount"].as_u64().unwrap();
    assert!(first_count > 0);

    // Replaying the same assertion finds no challenge
    let replay = app
        .clone()
        .oneshot(post_json("/api/auth/verify", Some(&cookie), assertion))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(replay).await["error"], "Challenge is missing or has expired");

    // Second login bumps the counter
    let (cookie, second, _) = login(&app, &mut authenticator, &origin, cookie).await;
    assert!(second["signCount"].as_u64().unwrap() > first_count);

    let info = app.clone().oneshot(get("/api/session", Some(&cookie))).await.unwrap();
    let info = json_body(info).await;
    assert_eq!(info["authenticated"], true);
    assert_eq!(info["challengePending"], false);
    assert_eq!(info["credentials"][0]["signCount"], second["signCount"]);
    assert!(info["credentials"][0]["lastUsedAt"].is_string());

    let me = app.clone().oneshot(get("/api/users/me", Some(&cookie))).await.unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let me = json_body(me).await;
    assert_eq!(me["name"], "testuser@example.com");
    assert_eq!(me["credentials"][0]["id"], credential_id.as_str());

    // Logout drops the login but keeps the credential
    let out = app
        .clone()
        .oneshot(post_json("/api/logout", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(out.status(), StatusCode::OK);
    let cookie = follow_cookie(&out, cookie);

    let me = app.clone().oneshot(get("/api/users/me", Some(&cookie))).await.unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let info = app.oneshot(get("/api/session", Some(&cookie))).await.unwrap();
    assert_eq!(json_body(info).await["credentials"].as_array().unwrap().len(), 1);
}
