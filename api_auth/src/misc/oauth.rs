use std::fmt;

use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

/// Social providers the hosted auth service can sign users in with.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum OAuthProvider {
    GitHub,
    Google,
    Facebook,
    Apple,
    Twitter,
}
impl OAuthProvider {
    /// Returns the OAuth provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::GitHub => "github",
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
            OAuthProvider::Apple => "apple",
            OAuthProvider::Twitter => "twitter",
        }
    }

    /// Creates an OAuth provider from a string.
    pub fn from_str(s: &str) -> Res<Self> {
        match s {
            "github" => Ok(OAuthProvider::GitHub),
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            "apple" => Ok(OAuthProvider::Apple),
            "twitter" | "x" => Ok(OAuthProvider::Twitter),
            ps => Err(AppError::BadRequest(format!("Invalid OAuth provider: {}", ps))),
        }
    }

    /// Button caption on the sign-in page.
    pub fn label(&self) -> &'static str {
        match self {
            OAuthProvider::GitHub => "GitHub",
            OAuthProvider::Google => "Google",
            OAuthProvider::Facebook => "Facebook",
            OAuthProvider::Apple => "Apple",
            OAuthProvider::Twitter => "Twitter",
        }
    }

    /// Parses the configured provider list, dropping unknown names.
    pub fn from_config(names: &[String]) -> Vec<Self> {
        names
            .iter()
            .filter_map(|name| match Self::from_str(name) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    log::warn!("Ignoring configured auth provider: {}", e);
                    None
                }
            })
            .collect()
    }
}
impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
