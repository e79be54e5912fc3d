mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_auth::{AuthClient, AuthProvider};
use api_subs::{CatalogCache, PaymentsGateway, PendingActions, StripeGateway};
use common::env_config::Config;
use db::{PgStore, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.is_production();
    let origin = config.site_url.trim_end_matches('/').to_string();
    let cookie_secure = config.site_url.starts_with("https://");

    // init logger
    logger::setup(&config.log_file).expect("Failed to set up logger");

    // init db connection
    let pool = db::setup(&config.database_url, is_production, config.run_migrations)
        .await
        .expect("Failed to set up database");
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    // external providers
    let auth: Arc<dyn AuthProvider> = Arc::new(AuthClient::new(&config.auth));
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let gateway: Arc<dyn PaymentsGateway> = Arc::new(StripeGateway::new(client));

    // warm the catalog, an empty or unreachable one is served lazily
    let catalog = web::Data::new(CatalogCache::new(config.catalog_revalidate));
    match catalog.refresh(store.as_ref()).await {
        Ok(products) => log::info!("Loaded {} products", products.len()),
        Err(e) => log::warn!("Failed to load catalog on startup: {}", e),
    }

    let pending = web::Data::new(PendingActions::new());
    let store_data = web::Data::from(store);
    let auth_data = web::Data::from(auth);
    let gateway_data = web::Data::from(gateway);

    log::info!(
        "Starting server on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        let secret = config_data.session_secret.as_bytes();
        App::new()
            .app_data(store_data.clone())
            .app_data(auth_data.clone())
            .app_data(gateway_data.clone())
            .app_data(catalog.clone())
            .app_data(pending.clone())
            .app_data(web::Data::new(config_data.clone()))
            .wrap(api_auth::session_resolver()) // 4th
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 3rd
            .wrap(cors::middleware(&origin)) // 2nd
            .wrap(api_auth::session_middleware(cookie_secure, secret)) // 1st
            .service(api_auth::mount_auth())
            .service(api_subs::mount_billing_api())
            .configure(site::configure_pages)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
