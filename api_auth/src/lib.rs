use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{
    cookie::{Key, SameSite},
    web,
};

pub mod models {
    pub mod session;
}

pub mod services {
    pub mod auth_client;
    pub mod session;
}

pub mod middleware {
    pub mod session;
}

pub mod misc {
    pub mod oauth;
}

pub mod dtos {
    pub mod auth;
}

mod routes {
    pub(crate) mod auth;
}

pub use models::session::{ActiveSession, SessionContext, SessionUser};
pub use services::auth_client::{AuthClient, AuthProvider};

pub const SESSION_COOKIE: &str = "storefront_session";

/// Signed cookie session holding the provider tokens.
pub fn session_middleware(
    cookie_secure: bool,
    secret: &[u8],
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(secret))
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Populates the request-scoped `SessionContext`.
pub fn session_resolver() -> middleware::session::SessionResolver {
    middleware::session::SessionResolver
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::get_oauth)
        .service(routes::auth::post_magic_link)
        .service(routes::auth::get_callback)
        .service(routes::auth::post_signout)
}
