use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc};

pub mod catalog;
pub mod customer;
pub mod store;
pub mod subscription;

pub mod models {
    pub mod catalog;
    pub mod subscription;
}

pub use store::{PgStore, Store};

/// Connects to the managed database. The schema belongs to the hosted
/// stack; the embedded migrations only exist for local databases.
pub async fn setup(
    database_url: &str,
    require_ssl: bool,
    run_migrations: bool,
) -> Result<Arc<PgPool>, Box<dyn std::error::Error>> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }
    let pool = PgPool::connect_with(options).await?;

    if run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    Ok(Arc::new(pool))
}
