use std::sync::Arc;

use actix_session::Session;
use actix_web::{HttpResponse, get, http::header::LOCATION, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Page,
};
use oauth2::PkceCodeChallenge;

use crate::{
    dtos::auth::{CallbackQuery, MagicLinkForm},
    misc::oauth::OAuthProvider,
    models::session::{ACCESS_TOKEN_KEY, CODE_VERIFIER_KEY},
    services::{auth_client::AuthProvider, session::store_tokens},
};

/// Starts a social sign-in with the hosted auth provider.
///
/// # Input
/// - `path`: provider name (github, google, facebook, apple, twitter)
///
/// # Output
/// - Success: 302 to the provider's consent page; the PKCE verifier is kept
///   in the cookie session until `/auth/callback`
/// - Error: 400 for unknown providers, 404 for providers that are not enabled
#[get("/oauth/{provider}")]
pub(crate) async fn get_oauth(
    path: web::Path<String>,
    session: Session,
    auth: web::Data<dyn AuthProvider>,
    config: web::Data<Arc<Config>>,
) -> Res<HttpResponse> {
    let provider = OAuthProvider::from_str(path.as_str())?;
    if !OAuthProvider::from_config(&config.auth.providers).contains(&provider) {
        return Err(AppError::NotFound(format!(
            "Sign-in with {} is not enabled",
            provider
        )));
    }

    let challenge = begin_pkce(&session)?;
    let url = auth.authorize_url(
        provider,
        &config.site_path("auth/callback"),
        challenge.as_str(),
    )?;

    Ok(HttpResponse::Found()
        .append_header((LOCATION, url))
        .finish())
}

/// Sends a one-time sign-in link to the given address.
///
/// # Output
/// - 303 to `/signin?notice=check_email`, or to `/signin?error=...` with the
///   provider's message
#[post("/magic-link")]
pub(crate) async fn post_magic_link(
    form: web::Form<MagicLinkForm>,
    session: Session,
    auth: web::Data<dyn AuthProvider>,
    config: web::Data<Arc<Config>>,
) -> Res<HttpResponse> {
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Ok(signin_error("Please enter a valid email address"));
    }

    let challenge = begin_pkce(&session)?;
    let sent = auth
        .send_magic_link(email, &config.site_path("auth/callback"), challenge.as_str())
        .await;

    match sent {
        Ok(()) => Ok(Page::see_other("/signin?notice=check_email")),
        Err(e) => Ok(signin_error(&e.to_string())),
    }
}

/// Landing point of both the OAuth and the magic-link flows.
/// Exchanges the authorization code for a token pair and opens the session.
#[get("/callback")]
pub(crate) async fn get_callback(
    query: web::Query<CallbackQuery>,
    session: Session,
    auth: web::Data<dyn AuthProvider>,
) -> Res<HttpResponse> {
    if let Some(description) = &query.error_description {
        return Ok(signin_error(description));
    }
    let Some(code) = &query.code else {
        return Ok(signin_error("Missing authorization code"));
    };
    let Some(verifier) = session
        .get::<String>(CODE_VERIFIER_KEY)
        .map_err(|_| AppError::BadRequest("Session verifier error".to_string()))?
    else {
        return Ok(signin_error("Sign-in expired, please try again"));
    };
    session.remove(CODE_VERIFIER_KEY);

    let tokens = match auth.exchange_code(code, &verifier).await {
        Ok(tokens) => tokens,
        Err(e) => return Ok(signin_error(&e.to_string())),
    };

    session.renew();
    store_tokens(&session, &tokens)?;
    if let Some(user) = &tokens.user {
        log::info!("User {} signed in", user.id);
    }

    Ok(Page::see_other("/account"))
}

/// Ends the provider session (best effort) and clears the cookie.
#[post("/signout")]
pub(crate) async fn post_signout(
    session: Session,
    auth: web::Data<dyn AuthProvider>,
) -> Res<HttpResponse> {
    if let Ok(Some(token)) = session.get::<String>(ACCESS_TOKEN_KEY) {
        if let Err(e) = auth.sign_out(&token).await {
            log::warn!("Provider sign-out failed: {}", e);
        }
    }
    session.purge();
    Ok(Page::see_other("/signin"))
}

fn begin_pkce(session: &Session) -> Res<PkceCodeChallenge> {
    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    session
        .insert(CODE_VERIFIER_KEY, verifier.secret())
        .map_err(|_| AppError::Internal("Failed to insert code verifier".to_string()))?;
    Ok(challenge)
}

fn signin_error(message: &str) -> HttpResponse {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Page::see_other(&format!("/signin?error={}", encoded))
}
