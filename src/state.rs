use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::store::{postgres::PgStore, CardStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub cards: Arc<dyn CardStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;

        let store = Arc::new(PgStore::new(pool));
        Ok(Self {
            users: store.clone() as Arc<dyn UserStore>,
            cards: store as Arc<dyn CardStore>,
            config,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = Arc::new(crate::store::memory::MemoryStore::new());
        Self {
            users: store.clone() as Arc<dyn UserStore>,
            cards: store as Arc<dyn CardStore>,
            config: Arc::new(AppConfig::for_tests()),
        }
    }
}
