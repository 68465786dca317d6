//! # eventsearch
//!
//! Filtered, keyset-paginated search over audit events stored in
//! PostgreSQL or MySQL.
//!
//! Three event kinds are supported: filesystem operations, provider
//! (configuration) changes and protocol log messages. Searches return one
//! page of JSON-encoded events together with the ids that share the first
//! and last timestamps of the page, so callers can walk large result sets
//! without offsets.
//!
//! ## Example
//!
//! ```rust,no_run
//! use eventsearch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config.log);
//!
//!     let store = eventsearch::database::initialize(&config.store).await?;
//!     let searcher = Searcher::new(store);
//!
//!     let page = searcher
//!         .search_fs_events(&FsEventSearch {
//!             common: CommonSearchParams {
//!                 limit: 100,
//!                 order: 1,
//!                 ..Default::default()
//!             },
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     for event in page.events::<FsEvent>()? {
//!         println!("{} {} {}", event.timestamp, event.action, event.virtual_path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod filter;
pub mod observability;
pub mod pool_health;
pub mod search;
pub mod store;

pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::config::{Config, LogConfig, StoreConfig};
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
    pub use crate::events::{EventKind, EventRecord, FsEvent, LogEvent, ProviderEvent};
    pub use crate::filter::{
        CommonSearchParams, FsEventSearch, LogEventSearch, Order, ProviderEventSearch,
    };
    pub use crate::observability::init_tracing;
    pub use crate::pool_health::PoolHealth;
    pub use crate::search::{SearchPage, Searcher};
    pub use crate::store::{EventStore, MemoryStore, MySqlStore, PgStore, StoreQuery};
}
