//! PostgreSQL event store
//!
//! TLS is controlled through the DSN (`sslmode=require`, `sslrootcert=...`).

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Connection, FromRow, PgPool};
use std::time::Duration;

use super::sql::{self, CompiledQuery, Dialect};
use super::{session, EventStore, StoreQuery};
use crate::config::StoreConfig;
use crate::error::{DatabaseOperation, Result};
use crate::events::{EventRecord, FsEvent, LogEvent, ProviderEvent};
use crate::filter::Value;
use crate::pool_health::PoolHealth;

/// PostgreSQL-backed event store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    max_connections: u32,
    query_timeout: Duration,
}

impl PgStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool, max_connections: u32, query_timeout: Duration) -> Self {
        Self {
            pool,
            max_connections,
            query_timeout,
        }
    }

    /// Build a pool from configuration (single attempt)
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .idle_timeout(Some(config.idle_timeout()))
            .max_lifetime(Some(config.max_lifetime()))
            .acquire_timeout(config.connection_timeout())
            .connect(&config.dsn)
            .await?;

        Ok(Self::new(pool, config.pool_size, config.query_timeout()))
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch<E>(&self, query: &StoreQuery) -> Result<Vec<E>>
    where
        E: EventRecord + for<'r> FromRow<'r, PgRow>,
    {
        let CompiledQuery { sql, binds } = sql::compile_select::<E>(Dialect::Postgres, query);
        tracing::debug!(table = E::TABLE, %sql, binds = binds.len(), "Running event query");

        let mut statement = sqlx::query_as::<_, E>(&sql);
        for value in binds {
            statement = match value {
                Value::Text(text) => statement.bind(text),
                Value::Integer(number) => statement.bind(number),
            };
        }

        let rows = session::run(
            DatabaseOperation::Query,
            self.query_timeout,
            statement.fetch_all(&self.pool),
        )
        .await
        .map_err(|e| e.add_context(E::TABLE))?;
        Ok(rows)
    }
}

#[async_trait]
impl EventStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn find_fs_events(&self, query: &StoreQuery) -> Result<Vec<FsEvent>> {
        self.fetch(query).await
    }

    async fn find_provider_events(&self, query: &StoreQuery) -> Result<Vec<ProviderEvent>> {
        self.fetch(query).await
    }

    async fn find_log_events(&self, query: &StoreQuery) -> Result<Vec<LogEvent>> {
        self.fetch(query).await
    }

    async fn ping(&self) -> Result<()> {
        session::run(DatabaseOperation::Ping, self.query_timeout, async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await
        })
        .await?;
        Ok(())
    }

    fn pool_health(&self) -> Option<PoolHealth> {
        Some(PoolHealth::from_pg_pool(&self.pool, self.max_connections))
    }
}
