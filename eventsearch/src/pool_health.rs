//! Connection pool health monitoring

use serde::{Deserialize, Serialize};

/// Connection pool health metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolHealth {
    /// Backend driver name
    pub driver: String,

    /// Total number of connections in the pool
    pub size: u32,

    /// Number of idle connections available
    pub idle: usize,

    /// Maximum pool size configured
    pub max_size: u32,

    /// Whether the pool is usable
    pub healthy: bool,

    /// Pool utilization percentage (0-100)
    pub utilization_percent: f32,
}

impl PoolHealth {
    /// Compute health metrics from raw pool counters
    pub fn new(driver: &str, size: u32, idle: usize, max_size: u32, closed: bool) -> Self {
        let busy = size.saturating_sub(idle as u32);
        let utilization_percent = if max_size > 0 {
            ((busy as f32 / max_size as f32) * 100.0).min(100.0)
        } else {
            0.0
        };

        // A saturated pool with nothing idle makes callers wait for a slot
        let healthy = !closed && (idle > 0 || size < max_size);

        Self {
            driver: driver.to_string(),
            size,
            idle,
            max_size,
            healthy,
            utilization_percent,
        }
    }

    /// Health metrics from a PostgreSQL pool
    pub fn from_pg_pool(pool: &sqlx::PgPool, max_size: u32) -> Self {
        Self::new("postgres", pool.size(), pool.num_idle(), max_size, pool.is_closed())
    }

    /// Health metrics from a MySQL pool
    pub fn from_mysql_pool(pool: &sqlx::MySqlPool, max_size: u32) -> Self {
        Self::new("mysql", pool.size(), pool.num_idle(), max_size, pool.is_closed())
    }
}
