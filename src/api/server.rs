// API server implementation using actix-web

use crate::api::{middleware, routes, AppState};
use crate::util::env as env_util;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 1] = ["http://localhost:3000"];

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl ApiServer {
    /// Create server from environment variables
    pub fn from_env() -> Result<Self> {
        env_util::init_env();

        let host = env_util::env_opt("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match env_util::env_opt("API_PORT") {
            Some(raw) => raw.trim().parse().context("Invalid API_PORT")?,
            None => 5000,
        };
        let allowed_origins = env_util::env_list("ALLOWED_ORIGINS", &DEFAULT_ALLOWED_ORIGINS);

        Ok(Self {
            host,
            port,
            allowed_origins,
        })
    }

    /// Start the HTTP server
    pub async fn run(self, state: AppState) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            datastore = state.has_store(),
            "Starting global-voyager API server"
        );
        if !state.has_store() {
            tracing::warn!("no database URL configured; datastore routes will answer 500");
        }

        let state = web::Data::new(state);
        let allowed_origins = self.allowed_origins.clone();

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();
            let cors = middleware::setup_cors(&allowed_origins);

            App::new()
                .app_data(state.clone())
                .wrap(logger)
                .wrap(compress)
                .wrap(cors)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
