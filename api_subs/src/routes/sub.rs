use std::sync::Arc;

use actix_web::{Responder, post, web};
use api_auth::SessionContext;
use common::{env_config::Config, error::Res, http::Success};
use db::Store;

use crate::{
    dtos::sub::{CheckoutRequest, RedirectResponse},
    services::{pay::PaymentsGateway, pending::PendingActions, sub::BillingFlows},
};

#[post("/create-checkout-session")]
pub(crate) async fn post_create_checkout_session(
    session: web::ReqData<SessionContext>,
    body: web::Json<CheckoutRequest>,
    gateway: web::Data<dyn PaymentsGateway>,
    store: web::Data<dyn Store>,
    pending: web::Data<PendingActions>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let flows = BillingFlows {
        gateway: gateway.get_ref(),
        store: store.get_ref(),
        pending: &pending,
        site_url: &config.site_url,
    };
    let decision = flows.checkout(&session, &body.price.id).await?;
    Success::ok(RedirectResponse::from(decision))
}

#[post("/create-portal-link")]
pub(crate) async fn post_create_portal_link(
    session: web::ReqData<SessionContext>,
    gateway: web::Data<dyn PaymentsGateway>,
    store: web::Data<dyn Store>,
    pending: web::Data<PendingActions>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let flows = BillingFlows {
        gateway: gateway.get_ref(),
        store: store.get_ref(),
        pending: &pending,
        site_url: &config.site_url,
    };
    let decision = flows.portal(&session).await?;
    Success::ok(RedirectResponse::from(decision))
}
