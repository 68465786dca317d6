//! Event store initialization

use std::sync::Arc;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::error::{sanitize_url, Error, Result};
use crate::store::{Driver, EventStore, MySqlStore, PgStore};

/// Connect to the configured driver, ping it and return a shared handle
///
/// Configuration errors (unknown driver, bad TLS material) fail at once.
/// Connection failures are retried `max_retries` times with exponential
/// backoff.
pub async fn initialize(config: &StoreConfig) -> Result<Arc<dyn EventStore>> {
    let driver: Driver = config.driver.parse()?;

    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_initialize(driver, config).await {
            Ok(store) => {
                tracing::info!(
                    driver = %driver,
                    dsn = %sanitize_url(&config.dsn),
                    pool_size = config.pool_size,
                    attempts = attempt + 1,
                    "Event store initialized"
                );
                return Ok(store);
            }
            Err(e) if e.is_config_error() => {
                tracing::error!(driver = %driver, "Invalid event store configuration: {}", e);
                return Err(e);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    tracing::error!(
                        "Failed to connect to {} at '{}' after {} attempt(s): {} ({})",
                        driver,
                        sanitize_url(&config.dsn),
                        attempt,
                        e,
                        categorize_db_error(&e)
                    );
                    return Err(e);
                }

                let delay = backoff_delay(base_delay, attempt);
                tracing::warn!(
                    "Event store connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Upper bound for the wait between connection attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// Exponential backoff for the given 1-based attempt, capped at [`MAX_RETRY_DELAY`]
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let multiplier = 2_u32
        .checked_pow(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(multiplier).min(MAX_RETRY_DELAY)
}

async fn try_initialize(driver: Driver, config: &StoreConfig) -> Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match driver {
        Driver::Postgres => Arc::new(PgStore::connect(config).await?),
        Driver::MySql => Arc::new(MySqlStore::connect(config).await?),
    };
    store.ping().await?;
    Ok(store)
}

/// Short hint for operators, based on the failure category
fn categorize_db_error(err: &Error) -> &'static str {
    use crate::error::DatabaseErrorKind as Kind;
    match err {
        Error::Database(db) => match db.kind {
            Kind::Configuration => "check the DSN format",
            Kind::ConnectionFailed => "check that the database is reachable and TLS settings",
            Kind::Timeout | Kind::PoolExhausted => "the database may be overloaded",
            Kind::QueryFailed => "check credentials and database permissions",
            Kind::TypeConversion | Kind::Other => "unexpected database error",
        },
        _ => "unexpected error",
    }
}
