use actix_cors::Cors;
use actix_web::http::header;

/// Only the site itself may call the JSON endpoints with its session cookie.
pub fn middleware(origin: &str) -> Cors {
    Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allowed_origin(origin)
        .supports_credentials()
        .max_age(3600)
}
