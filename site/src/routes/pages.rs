use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, web};
use api_auth::SessionContext;
use api_subs::{CatalogCache, PendingActions};
use askama::Template;
use common::{
    env_config::Config,
    error::Res,
    http::{Page, Success},
};
use db::Store;
use serde::Deserialize;

use crate::views::pages::{account_page, home_page, loading_page, pricing_page, signin_page};

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    pub interval: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[get("/")]
pub(crate) async fn get_home(session: web::ReqData<SessionContext>) -> Res<HttpResponse> {
    Ok(Page::html(home_page(&session).render()?))
}

#[get("/pricing")]
pub(crate) async fn get_pricing(
    session: web::ReqData<SessionContext>,
    query: web::Query<PricingQuery>,
    catalog: web::Data<CatalogCache>,
    store: web::Data<dyn Store>,
    pending: web::Data<PendingActions>,
) -> Res<HttpResponse> {
    let products = catalog.products(store.get_ref()).await?;
    let page = pricing_page(&products, query.interval.as_deref(), &session, &pending);
    Ok(Page::html(page.render()?))
}

#[get("/signin")]
pub(crate) async fn get_signin(
    session: web::ReqData<SessionContext>,
    query: web::Query<SignInQuery>,
    config: web::Data<Arc<Config>>,
) -> Res<HttpResponse> {
    match &*session {
        SessionContext::Present(_) => Ok(Page::see_other("/account")),
        SessionContext::Loading => Ok(Page::html(loading_page("Sign in").render()?)),
        SessionContext::Absent => {
            let page = signin_page(
                &config.auth.providers,
                query.notice.as_deref(),
                query.error.as_deref(),
            );
            Ok(Page::html(page.render()?))
        }
    }
}

#[get("/account")]
pub(crate) async fn get_account(
    session: web::ReqData<SessionContext>,
    pending: web::Data<PendingActions>,
) -> Res<HttpResponse> {
    match &*session {
        SessionContext::Absent => Ok(Page::see_other("/signin")),
        SessionContext::Loading => Ok(Page::html(loading_page("Account").render()?)),
        SessionContext::Present(active) => Ok(Page::html(account_page(active, &pending).render()?)),
    }
}

#[get("/health")]
pub(crate) async fn get_health() -> Res<impl Responder> {
    Success::ok(serde_json::json!({ "status": "ok" }))
}
