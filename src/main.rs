mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod http;
mod middleware;
mod models;
mod routes;
mod service;
mod tracing_config;
mod utils;

use axum::http::{
    HeaderValue, Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use config::Config;
use db::DBClient;
use dotenv::dotenv;
use http::HttpClient;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_config::init_tracing;

#[derive(Clone)]
pub struct AppState {
    pub env: Arc<Config>,
    pub db_client: DBClient,
    pub http_client: HttpClient,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Dropping the guard stops file logging, so it lives as long as main.
    let _guard = init_tracing();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run migrations: {:?}", err);
        std::process::exit(1);
    }

    let frontend_origin = match config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(err) => {
            tracing::error!(frontend_url = %config.frontend_url, "Invalid FRONTEND_URL: {}", err);
            std::process::exit(1);
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(frontend_origin)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    let db_client = DBClient::new(pool);

    //scheduler
    let _scheduler = match db_client.start_reconcile_task(&config.reconcile_cron).await {
        Ok(sched) => sched,
        Err(err) => {
            tracing::error!(cron = %config.reconcile_cron, "Failed to start scheduler: {}", err);
            std::process::exit(1);
        }
    };

    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set, /api/chat will answer 502");
    }

    let app_state = AppState {
        env: Arc::new(config.clone()),
        db_client,
        http_client: HttpClient::new(reqwest::Client::new()),
    };

    let app = routes::create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(port = config.port, "Failed to bind: {}", err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }
}
