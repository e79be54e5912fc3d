use async_trait::async_trait;
use common::{
    env_config::AuthProviderConfig,
    error::{AppError, Res},
};
use log::{info, warn};
use reqwest::{Client, RequestBuilder, Response};

use crate::{
    dtos::auth::{AuthTokens, OtpRequest, PkceGrantRequest, RefreshGrantRequest},
    misc::oauth::OAuthProvider,
};

/// The hosted auth provider, seen through its public REST contract.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// URL of the provider's hosted OAuth consent flow.
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Res<String>;

    async fn send_magic_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Res<()>;

    async fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> Res<AuthTokens>;

    async fn refresh_session(&self, refresh_token: &str) -> Res<AuthTokens>;

    async fn sign_out(&self, access_token: &str) -> Res<()>;
}

/// GoTrue (Supabase Auth) client.
pub struct AuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &AuthProviderConfig) -> Self {
        AuthClient {
            client: Client::new(),
            base_url: format!("{}/auth/v1", config.url),
            anon_key: config.anon_key.clone(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn tokens(response: Response) -> Res<AuthTokens> {
        let response = Self::check(response).await?;
        response.json::<AuthTokens>().await.map_err(AppError::from)
    }

    /// Turns a non-success answer into the provider's own message.
    async fn check(response: Response) -> Res<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        let message = ["msg", "error_description", "message", "error"]
            .iter()
            .find_map(|key| body[*key].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Auth provider answered with status {}", status));
        warn!("Auth provider request failed: {}", message);
        Err(AppError::AuthProvider(message))
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Res<String> {
        let url = url::Url::parse_with_params(
            &format!("{}/authorize", self.base_url),
            &[
                ("provider", provider.as_str()),
                ("redirect_to", redirect_to),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )
        .map_err(|e| AppError::Internal(format!("Invalid auth provider url: {}", e)))?;
        Ok(url.to_string())
    }

    async fn send_magic_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Res<()> {
        info!("Requesting magic link for {}", email);
        let response = self
            .post("/otp")
            .query(&[("redirect_to", redirect_to)])
            .json(&OtpRequest {
                email,
                create_user: true,
                code_challenge,
                code_challenge_method: "s256",
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> Res<AuthTokens> {
        let response = self
            .post("/token")
            .query(&[("grant_type", "pkce")])
            .json(&PkceGrantRequest {
                auth_code,
                code_verifier,
            })
            .send()
            .await?;
        Self::tokens(response).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Res<AuthTokens> {
        let response = self
            .post("/token")
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrantRequest { refresh_token })
            .send()
            .await?;
        Self::tokens(response).await
    }

    async fn sign_out(&self, access_token: &str) -> Res<()> {
        let response = self.post("/logout").bearer_auth(access_token).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_pkce_and_redirect() {
        let client = AuthClient::new(&AuthProviderConfig {
            url: "https://abcd.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            jwt_secret: "secret".to_string(),
            providers: vec![],
        });
        let url = client
            .authorize_url(
                OAuthProvider::GitHub,
                "http://localhost:8080/auth/callback",
                "challenge123",
            )
            .unwrap();

        assert!(url.starts_with("https://abcd.supabase.co/auth/v1/authorize?provider=github"));
        assert!(url.contains("redirect_to=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback"));
        assert!(url.contains("code_challenge=challenge123"));
        assert!(url.contains("code_challenge_method=s256"));
    }
}
