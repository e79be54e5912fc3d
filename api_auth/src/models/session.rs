use common::jwt::AccessClaims;
use db::models::subscription::Subscription;
use serde::Serialize;
use uuid::Uuid;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<AccessClaims> for SessionUser {
    fn from(claims: AccessClaims) -> Self {
        SessionUser {
            id: claims.sub,
            email: claims.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActiveSession {
    pub user: SessionUser,
    pub subscription: Option<Subscription>,
}

/// Who is asking, resolved once per request by the session resolver and
/// handed to every view and flow as read-only data.
///
/// `Loading` means the determination did not complete (timeout or a failed
/// lookup); it is never a stand-in for `Absent`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionContext {
    Loading,
    Absent,
    Present(ActiveSession),
}

impl SessionContext {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionContext::Present(active) => Some(&active.user),
            _ => None,
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        match self {
            SessionContext::Present(active) => active.subscription.as_ref(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionContext::Loading)
    }
}
