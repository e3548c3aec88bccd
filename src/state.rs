use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use sqlx::postgres::PgPool;

use crate::config::Config;
use crate::repositories::{
    CollectionRepository, CollectionStore, InMemoryStore, UserRepository, UserStore,
};
use crate::services::AuthService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub users: Arc<dyn UserStore>,
    pub collections: Arc<dyn CollectionStore>,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and build the SeaORM-backed stores
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        // SQLx pool is only used to run migrations
        let pg_pool = PgPool::connect(&config.database_url)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;
        pg_pool.close().await;

        let mut opt = ConnectOptions::new(&config.database_url);
        opt.max_connections(20)
            .min_connections(2)
            .sqlx_logging(true);

        let db = Database::connect(opt)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        Ok(Self {
            auth: AuthService::new(&config),
            users: Arc::new(UserRepository::new(db.clone())),
            collections: Arc::new(CollectionRepository::new(db)),
            config,
        })
    }

    /// State backed by a single in-memory store (tests, demos)
    pub fn in_memory(config: Config) -> Self {
        Self::with_store(config, InMemoryStore::new())
    }

    /// State backed by a caller-provided in-memory store, so tests can seed it directly
    pub fn with_store(config: Config, store: InMemoryStore) -> Self {
        Self {
            auth: AuthService::new(&config),
            users: Arc::new(store.clone()),
            collections: Arc::new(store),
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),
}
