pub mod cache;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod locks;
pub mod models;
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{cache::CacheStore, clients::RemoteClient, config::Config, locks::KeyedLocks};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: CacheStore,
    pub remote: Arc<RemoteClient>,
    pub locks: KeyedLocks,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("cityscout/0.1")
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let db = db::connect_and_migrate(&config.database_url).await?;
        let remote = RemoteClient::new(http, &config);

        Ok(Self {
            config: Arc::new(config),
            cache: CacheStore::new(db),
            remote: Arc::new(remote),
            locks: KeyedLocks::new(),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/location", get(routes::location))
        .route("/weather", get(routes::weather))
        .route("/events", get(routes::events))
        .route("/movies", get(routes::movies))
        .route("/yelp", get(routes::yelp))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
