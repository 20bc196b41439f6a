//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::auth::TokenKeys;
use crate::core::store::Store;

/// Secret used only when running tests without `SECRET` set.
const TEST_SECRET: &str = "bloglist-test-secret";

/// Execution mode, selected by `APP_ENV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Production,
    Development,
    Test,
}

impl RunMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" => RunMode::Test,
            "development" | "dev" => RunMode::Development,
            _ => RunMode::Production,
        }
    }

    pub fn is_test(self) -> bool {
        self == RunMode::Test
    }
}

/// Configuration for the Bloglist Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub mode: RunMode,
    /// sqlx connection string
    pub database_url: String,
    /// Token signing secret
    pub secret: String,
    pub port: u16,
    /// Token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Front-end build served for unmatched paths
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// - `APP_ENV`: `production` (default), `development` or `test`
    /// - `DATABASE_URL` (default `sqlite://bloglist.sqlite`), overridden by
    ///   `TEST_DATABASE_URL` in test mode (default `sqlite::memory:`)
    /// - `SECRET`: required outside test mode
    /// - `PORT` (default 3003)
    /// - `TOKEN_TTL_SECS` (default 3600)
    /// - `STATIC_DIR` (optional)
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = std::env::var("APP_ENV")
            .map(|v| RunMode::parse(&v))
            .unwrap_or(RunMode::Production);

        let database_url = if mode.is_test() {
            std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
        } else {
            std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bloglist.sqlite".to_string())
        };

        let secret = match std::env::var("SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if mode.is_test() => TEST_SECRET.to_string(),
            _ => anyhow::bail!("SECRET environment variable is required"),
        };

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3003);

        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let static_dir = std::env::var("STATIC_DIR").ok().map(PathBuf::from);

        tracing::info!(
            mode = ?mode,
            database_url = %database_url,
            port,
            static_dir = ?static_dir,
            "configuration loaded"
        );

        Ok(Self {
            mode,
            database_url,
            secret,
            port,
            token_ttl_secs,
            static_dir,
        })
    }

    /// In-memory configuration used by the test suites.
    pub fn for_tests() -> Self {
        Self {
            mode: RunMode::Test,
            database_url: "sqlite::memory:".to_string(),
            secret: TEST_SECRET.to_string(),
            port: 0,
            token_ttl_secs: 3600,
            static_dir: None,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Store,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Store) -> Self {
        let tokens = TokenKeys::new(&config.secret, config.token_ttl_secs);
        Self {
            config: Arc::new(config),
            store,
            tokens,
        }
    }
}
