use std::{env, sync::Arc, time::Duration};

use crate::misc::normalize_site_url;

#[derive(Clone, Debug)]
/// Configuration struct for the storefront server.
///
/// Holds the server binding options, cookie session secret, the site URL
/// used for every redirect handed to an external provider, and the
/// credentials of the three collaborators: the auth provider, the payments
/// provider and the database.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Run the embedded migrations on startup (local development only).
    pub run_migrations: bool,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// Public URL of the site, always with a scheme and a trailing slash.
    pub site_url: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger appends to next to the console output.
    pub log_file: String,
    /// Key material for the signed session cookie (at least 64 bytes).
    pub session_secret: String,
    /// Configuration of the hosted auth provider.
    pub auth: AuthProviderConfig,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// How long a catalog snapshot is served before it is fetched again.
    pub catalog_revalidate: Duration,
    /// Upper bound for resolving the session of a single request.
    pub session_resolve_timeout: Duration,
}

#[derive(Clone, Debug)]
/// Settings of the hosted auth provider (GoTrue compatible REST API).
pub struct AuthProviderConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    /// Public anon key sent as `apikey` header.
    pub anon_key: String,
    /// Secret the provider signs access tokens with (HS256).
    pub jwt_secret: String,
    /// Social providers offered on the sign-in page.
    pub providers: Vec<String>,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`, `DATABASE_URL`, `SESSION_SECRET`
    /// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_JWT_SECRET`
    ///
    /// Optional (with defaults):
    /// - `IP` ("127.0.0.1"), `PORT` (8080), `WORKERS` (4)
    /// - `SITE_URL` ("http://localhost:8080/")
    /// - `ENABLE_CONSOLE_LOGGING` (true), `LOG_FILE` ("storefront.log")
    /// - `AUTH_PROVIDERS` ("github"), comma separated
    /// - `STRIPE_SECRET_KEY` (empty)
    /// - `CATALOG_REVALIDATE_SECS` (60), `SESSION_RESOLVE_TIMEOUT_MS` (2000)
    /// - `RUN_MIGRATIONS` (false)
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing
    /// or if the session secret is shorter than 64 bytes.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET").expect("SESSION_SECRET must be set");
        assert!(
            session_secret.len() >= 64,
            "SESSION_SECRET must be at least 64 bytes long"
        );

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            run_migrations: flag("RUN_MIGRATIONS", false),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            site_url: normalize_site_url(
                &env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            ),
            console_logging_enabled: flag("ENABLE_CONSOLE_LOGGING", true),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "storefront.log".to_string()),
            session_secret,
            auth: AuthProviderConfig {
                url: env::var("SUPABASE_URL")
                    .expect("SUPABASE_URL must be set")
                    .trim_end_matches('/')
                    .to_string(),
                anon_key: env::var("SUPABASE_ANON_KEY").expect("SUPABASE_ANON_KEY must be set"),
                jwt_secret: env::var("SUPABASE_JWT_SECRET")
                    .expect("SUPABASE_JWT_SECRET must be set"),
                providers: env::var("AUTH_PROVIDERS")
                    .unwrap_or_else(|_| "github".to_string())
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            catalog_revalidate: Duration::from_secs(
                env::var("CATALOG_REVALIDATE_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            ),
            session_resolve_timeout: Duration::from_millis(
                env::var("SESSION_RESOLVE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()
                    .unwrap_or(2000),
            ),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Absolute URL of a site path, `path` without the leading slash.
    pub fn site_path(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path.trim_start_matches('/'))
    }
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(default)
}
