//! # Router
//!
//! Route table and middleware stack, generic over the session store so the
//! same app runs on `MemoryStore` or `SqliteStore`.

use crate::handlers::auth::*;
use crate::handlers::health::health_check;
use crate::handlers::users::get_current_user;
use crate::middleware;
use crate::state::AppState;
use axum::{middleware as axum_middleware, routing::{get, post}, Router};
use time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

/// Build the application router
///
/// Sessions expire after 24 hours without activity. Unknown paths fall back
/// to the static frontend in `config.static_dir`.
pub fn build_router<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(state.config.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    // ⚠️ restrict origins when the frontend is served elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected_routes = Router::new()
        .route("/api/users/me", get(get_current_user))
        .layer(axum_middleware::from_fn(middleware::auth::require_auth));

    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/api/health", get(health_check))

        // Registration (attestation)
        .route("/api/register/options", get(registration_options))
        .route("/api/register", post(register_credential))

        // Authentication (assertion)
        .route("/api/auth/options", get(authentication_options))
        .route("/api/auth/verify", post(verify_authentication))

        .route("/api/session", get(session_info))
        .route("/api/logout", post(logout))

        .merge(protected_routes)
        .fallback_service(ServeDir::new(static_dir))

        // Layers run outermost-last: trace wraps cors wraps sessions
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
