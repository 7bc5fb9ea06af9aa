use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::{AppConfig, JwtConfig};
use crate::store::{MemStore, NoteStore, PgStore, TodoStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub notes: Arc<dyn NoteStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let store = Arc::new(PgStore::new(pool));
        Ok(Self::from_store(store, config))
    }

    pub fn from_store<S>(store: Arc<S>, config: Arc<AppConfig>) -> Self
    where
        S: UserStore + TodoStore + NoteStore + 'static,
    {
        Self {
            users: store.clone(),
            todos: store.clone(),
            notes: store,
            config,
        }
    }

    /// State backed by the in-memory store, for tests and local runs
    /// without Postgres.
    pub fn in_memory(secret: &str) -> Self {
        let config = Arc::new(AppConfig {
            database_url: "postgres://unused".into(),
            jwt: JwtConfig {
                secret: secret.into(),
                ttl_minutes: 30,
            },
        });
        Self::from_store(Arc::new(MemStore::new()), config)
    }
}
