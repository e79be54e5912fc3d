use actix_web::web;

mod misc {
    pub(crate) mod format;
}

pub mod views {
    pub mod nav;
    pub mod pages;
}

mod routes {
    pub(crate) mod pages;
}

/// Server-rendered pages. Registered as plain services so `/api` and `/auth`
/// scopes keep their own routing.
pub fn configure_pages(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::pages::get_home)
        .service(routes::pages::get_pricing)
        .service(routes::pages::get_signin)
        .service(routes::pages::get_account)
        .service(routes::pages::get_health);
}
