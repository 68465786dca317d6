//! Event store backends
//!
//! The [`EventStore`] trait is the repository seam used by the search
//! engine. Each `find_*` call applies a [`StoreQuery`]: the predicates are
//! ANDed, rows are ordered by `(timestamp, id)` in the requested direction
//! and at most `limit` rows are returned.
//!
//! # Available Backends
//!
//! - [`PgStore`]: PostgreSQL through a sqlx pool
//! - [`MySqlStore`]: MySQL through a sqlx pool, with optional custom TLS
//! - [`MemoryStore`]: in-process evaluation of the same predicates

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::events::{EventRecord, FsEvent, LogEvent, ProviderEvent};
use crate::filter::{Order, Predicate};
use crate::pool_health::PoolHealth;

mod memory;
mod mysql;
mod postgres;
pub mod session;
pub mod sql;
pub mod tls;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use postgres::PgStore;

/// Supported SQL drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    MySql,
}

impl FromStr for Driver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::MySql),
            other => Err(Error::UnsupportedDriver(other.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::MySql => write!(f, "mysql"),
        }
    }
}

/// A fully resolved query against one event table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    /// Conditions ANDed together
    pub predicates: Vec<Predicate>,
    /// Direction for both `timestamp` and `id`
    pub order: Order,
    /// Maximum number of rows, always positive
    pub limit: u32,
    /// Columns left out of the select list
    pub skip_columns: Vec<&'static str>,
}

impl StoreQuery {
    /// Create a query without predicates
    pub fn new(order: Order, limit: u32) -> Self {
        Self {
            predicates: Vec::new(),
            order,
            limit,
            skip_columns: Vec::new(),
        }
    }

    /// Columns to select for a record type
    pub fn selected_columns<E: EventRecord>(&self) -> Vec<&'static str> {
        E::COLUMNS
            .iter()
            .copied()
            .filter(|column| !self.skip_columns.contains(column))
            .collect()
    }
}

/// Read access to the three event tables
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    async fn find_fs_events(&self, query: &StoreQuery) -> Result<Vec<FsEvent>>;

    async fn find_provider_events(&self, query: &StoreQuery) -> Result<Vec<ProviderEvent>>;

    async fn find_log_events(&self, query: &StoreQuery) -> Result<Vec<LogEvent>>;

    /// Check connectivity
    async fn ping(&self) -> Result<()>;

    /// Connection pool metrics, `None` for backends without a pool
    fn pool_health(&self) -> Option<PoolHealth> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::columns;

    #[test]
    fn test_driver_from_str() {
        assert_eq!("postgres".parse::<Driver>().unwrap(), Driver::Postgres);
        assert_eq!("postgresql".parse::<Driver>().unwrap(), Driver::Postgres);
        assert_eq!("mysql".parse::<Driver>().unwrap(), Driver::MySql);

        let err = "sqlite".parse::<Driver>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedDriver(ref d) if d == "sqlite"));
        assert_eq!(Driver::MySql.to_string(), "mysql");
    }

    #[test]
    fn test_selected_columns() {
        let mut query = StoreQuery::new(Order::Ascending, 1);
        assert_eq!(
            query.selected_columns::<ProviderEvent>(),
            ProviderEvent::COLUMNS.to_vec()
        );

        query.skip_columns.push(columns::OBJECT_DATA);
        let selected = query.selected_columns::<ProviderEvent>();
        assert_eq!(selected.len(), ProviderEvent::COLUMNS.len() - 1);
        assert!(!selected.contains(&columns::OBJECT_DATA));
    }
}
