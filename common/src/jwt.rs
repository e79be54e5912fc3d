use jsonwebtoken::{DecodingKey, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience the auth provider stamps on tokens of signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims of an access token issued by the auth provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub aud: String,
    pub exp: usize,
}

#[derive(Debug)]
pub enum TokenState {
    Valid(AccessClaims),
    Expired,
    Invalid(jsonwebtoken::errors::Error),
}

/// Verifies an access token locally with the provider's signing secret.
pub fn inspect_access_token(token: &str, secret: &str) -> TokenState {
    let mut validation = Validation::default();
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

    match jsonwebtoken::decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => TokenState::Valid(data.claims),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => TokenState::Expired,
        Err(e) => TokenState::Invalid(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    fn token(aud: &str, exp_offset: i64, secret: &str) -> String {
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            email: Some("jane@example.com".to_string()),
            aud: aud.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_fresh_token() {
        match inspect_access_token(&token("authenticated", 3600, SECRET), SECRET) {
            TokenState::Valid(claims) => {
                assert_eq!(claims.email.as_deref(), Some("jane@example.com"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reports_expiry_separately() {
        let state = inspect_access_token(&token("authenticated", -3600, SECRET), SECRET);
        assert!(matches!(state, TokenState::Expired));
    }

    #[test]
    fn rejects_foreign_signature_and_audience() {
        let forged = token("authenticated", 3600, "another-secret-another-secret-another");
        assert!(matches!(
            inspect_access_token(&forged, SECRET),
            TokenState::Invalid(_)
        ));
        let anon = token("anon", 3600, SECRET);
        assert!(matches!(
            inspect_access_token(&anon, SECRET),
            TokenState::Invalid(_)
        ));
    }
}
