use crate::error::{AppError, AppResult};
use crate::session::users;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    match users::authenticated_handle(&session).await? {
        Some(_) => Ok(next.run(request).await),
        None => Err(AppError::Unauthorized("Not authenticated".to_string())),
    }
}
