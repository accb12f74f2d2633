//! The session's user handle and its logged-in flag.

use crate::error::AppResult;
use crate::session::models::SessionUser;
use crate::session::{AUTHENTICATED_KEY, USER_KEY};
use tower_sessions::Session;
use uuid::Uuid;

/// The user this session registers credentials for, created on first use
///
/// An existing user keeps its handle; the names are refreshed from the
/// latest request so the authenticator shows what the visitor typed.
pub async fn current_or_create(
    session: &Session,
    name: &str,
    display_name: &str,
) -> AppResult<SessionUser> {
    let user = match current(session).await? {
        Some(mut user) => {
            user.name = name.to_string();
            user.display_name = display_name.to_string();
            user
        }
        None => {
            let user = SessionUser::new(name.to_string(), display_name.to_string());
            tracing::info!(user_handle = %user.handle, name, "Created session user");
            user
        }
    };

    session.insert(USER_KEY, &user).await?;
    Ok(user)
}

pub async fn current(session: &Session) -> AppResult<Option<SessionUser>> {
    Ok(session.get::<SessionUser>(USER_KEY).await?)
}

/// Mark the session as logged in
///
/// The session ID is rotated so an ID observed before login can't be
/// reused afterwards.
pub async fn mark_authenticated(session: &Session, handle: Uuid) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(AUTHENTICATED_KEY, handle).await?;
    Ok(())
}

pub async fn authenticated_handle(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(AUTHENTICATED_KEY).await?)
}

/// Log out without forgetting the registered credentials.
pub async fn sign_out(session: &Session) -> AppResult<()> {
    if session.remove::<Uuid>(AUTHENTICATED_KEY).await?.is_some() {
        session.cycle_id().await?;
    }
    Ok(())
}
