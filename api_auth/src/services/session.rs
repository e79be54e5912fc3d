use std::time::Duration;

use actix_session::Session;
use common::{
    error::{AppError, Res},
    jwt::{self, TokenState},
};
use db::Store;

use crate::{
    dtos::auth::AuthTokens,
    models::session::{
        ACCESS_TOKEN_KEY, ActiveSession, REFRESH_TOKEN_KEY, SessionContext, SessionUser,
    },
    services::auth_client::AuthProvider,
};

/// Collaborators needed to turn a cookie session into a `SessionContext`.
pub struct SessionSources<'a> {
    pub auth: &'a dyn AuthProvider,
    pub store: &'a dyn Store,
    pub jwt_secret: &'a str,
}

/// Resolves the session, or reports `Loading` when the subscription lookup
/// takes longer than `limit`.
///
/// A refresh grant is never cut short by `limit`: the provider rotates the
/// refresh token, and only a completed grant writes the new one to the cookie.
pub async fn resolve_within(
    limit: Duration,
    session: &Session,
    sources: &SessionSources<'_>,
) -> SessionContext {
    let Some(user) = authenticate(session, sources).await else {
        return SessionContext::Absent;
    };

    match tokio::time::timeout(limit, lookup(user, sources.store)).await {
        Ok(context) => context,
        Err(_) => {
            log::warn!("Session resolution exceeded {:?}", limit);
            SessionContext::Loading
        }
    }
}

pub async fn resolve(session: &Session, sources: &SessionSources<'_>) -> SessionContext {
    let Some(user) = authenticate(session, sources).await else {
        return SessionContext::Absent;
    };
    lookup(user, sources.store).await
}

async fn lookup(user: SessionUser, store: &dyn Store) -> SessionContext {
    match store.current_subscription(user.id).await {
        Ok(subscription) => SessionContext::Present(ActiveSession { user, subscription }),
        Err(e) => {
            log::error!("Failed to load subscription of user {}: {}", user.id, e);
            SessionContext::Loading
        }
    }
}

/// Persists a token grant into the cookie session.
pub fn store_tokens(session: &Session, tokens: &AuthTokens) -> Res<()> {
    session
        .insert(ACCESS_TOKEN_KEY, &tokens.access_token)
        .map_err(|_| AppError::Internal("Failed to insert access token".to_string()))?;
    session
        .insert(REFRESH_TOKEN_KEY, &tokens.refresh_token)
        .map_err(|_| AppError::Internal("Failed to insert refresh token".to_string()))?;
    Ok(())
}

async fn authenticate(session: &Session, sources: &SessionSources<'_>) -> Option<SessionUser> {
    let access_token = session.get::<String>(ACCESS_TOKEN_KEY).ok().flatten()?;

    match jwt::inspect_access_token(&access_token, sources.jwt_secret) {
        TokenState::Valid(claims) => Some(claims.into()),
        TokenState::Expired => refresh(session, sources).await,
        TokenState::Invalid(e) => {
            log::warn!("Dropping session with invalid access token: {}", e);
            session.purge();
            None
        }
    }
}

async fn refresh(session: &Session, sources: &SessionSources<'_>) -> Option<SessionUser> {
    let Some(refresh_token) = session.get::<String>(REFRESH_TOKEN_KEY).ok().flatten() else {
        session.purge();
        return None;
    };

    let tokens = match sources.auth.refresh_session(&refresh_token).await {
        Ok(tokens) => tokens,
        Err(e) => {
            log::warn!("Session refresh failed: {}", e);
            session.purge();
            return None;
        }
    };

    match jwt::inspect_access_token(&tokens.access_token, sources.jwt_secret) {
        TokenState::Valid(claims) => {
            if let Err(e) = store_tokens(session, &tokens) {
                log::error!("{}", e);
            }
            Some(claims.into())
        }
        other => {
            log::warn!("Refreshed access token rejected: {:?}", other);
            session.purge();
            None
        }
    }
}
