use actix_web::web::{self};

mod routes {
    pub(crate) mod sub;
}

pub mod services {
    pub mod catalog;
    pub mod pay;
    pub mod pending;
    pub mod sub;
}

pub mod dtos {
    pub mod sub;
}

pub mod models {
    pub mod sub;
}

mod misc {
    pub(crate) mod pay;
}

pub use services::{
    catalog::CatalogCache,
    pay::{PaymentsGateway, StripeGateway},
    pending::{PendingAction, PendingActions},
};

/// JSON endpoints the page scripts post to. Both answer with the location the
/// browser should navigate to.
pub fn mount_billing_api() -> actix_web::Scope {
    web::scope("/api")
        .service(routes::sub::post_create_checkout_session)
        .service(routes::sub::post_create_portal_link)
}
