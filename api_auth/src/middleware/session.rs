use std::{rc::Rc, sync::Arc};

use actix_session::SessionExt;
use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use common::{env_config::Config, error::AppError};
use db::Store;
use futures::future::{LocalBoxFuture, Ready, ok};

use crate::services::{
    auth_client::AuthProvider,
    session::{SessionSources, resolve_within},
};

/// Resolves the `SessionContext` of every request and stores it in the
/// request extensions, where handlers read it through `web::ReqData`.
///
/// Must be wrapped inside the cookie session middleware.
pub struct SessionResolver;

impl<S, B> Transform<S, ServiceRequest> for SessionResolver
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = SessionResolverService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionResolverService {
            service: Rc::new(service),
        })
    }
}

pub struct SessionResolverService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionResolverService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            let auth = req.app_data::<web::Data<dyn AuthProvider>>().cloned();
            let store = req.app_data::<web::Data<dyn Store>>().cloned();
            let config = req.app_data::<web::Data<Arc<Config>>>().cloned();

            let (Some(auth), Some(store), Some(config)) = (auth, store, config) else {
                let response = AppError::Internal("Session resolver is not configured".to_string())
                    .to_http_response();
                return Ok(req.into_response(response));
            };

            let session = req.get_session();
            let sources = SessionSources {
                auth: auth.get_ref(),
                store: store.get_ref(),
                jwt_secret: &config.auth.jwt_secret,
            };
            let context =
                resolve_within(config.session_resolve_timeout, &session, &sources).await;
            req.extensions_mut().insert(context);

            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}
