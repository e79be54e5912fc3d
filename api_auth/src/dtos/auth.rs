use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MagicLinkForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error_description: Option<String>,
}

/// Token grant returned by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub user: Option<ProviderUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpRequest<'a> {
    pub email: &'a str,
    pub create_user: bool,
    pub code_challenge: &'a str,
    pub code_challenge_method: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PkceGrantRequest<'a> {
    pub auth_code: &'a str,
    pub code_verifier: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrantRequest<'a> {
    pub refresh_token: &'a str,
}
