//! In-memory event store
//!
//! Evaluates predicates in process. Used by the test-suite and by callers
//! that embed the search engine without a database.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EventStore, StoreQuery};
use crate::error::Result;
use crate::events::{EventRecord, FsEvent, LogEvent, ProviderEvent};

/// Event store backed by vectors
///
/// # Example
///
/// ```rust
/// use eventsearch::events::LogEvent;
/// use eventsearch::store::MemoryStore;
///
/// let store = MemoryStore::new().with_log_events(vec![LogEvent {
///     id: "ev1".to_string(),
///     timestamp: 100,
///     ..Default::default()
/// }]);
/// # let _ = store;
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    fs_events: RwLock<Vec<FsEvent>>,
    provider_events: RwLock<Vec<ProviderEvent>>,
    log_events: RwLock<Vec<LogEvent>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed filesystem events
    #[must_use]
    pub fn with_fs_events(mut self, events: impl IntoIterator<Item = FsEvent>) -> Self {
        self.fs_events.get_mut().extend(events);
        self
    }

    /// Seed provider events
    #[must_use]
    pub fn with_provider_events(mut self, events: impl IntoIterator<Item = ProviderEvent>) -> Self {
        self.provider_events.get_mut().extend(events);
        self
    }

    /// Seed log events
    #[must_use]
    pub fn with_log_events(mut self, events: impl IntoIterator<Item = LogEvent>) -> Self {
        self.log_events.get_mut().extend(events);
        self
    }

    pub async fn insert_fs_event(&self, event: FsEvent) {
        self.fs_events.write().await.push(event);
    }

    pub async fn insert_provider_event(&self, event: ProviderEvent) {
        self.provider_events.write().await.push(event);
    }

    pub async fn insert_log_event(&self, event: LogEvent) {
        self.log_events.write().await.push(event);
    }
}

/// Apply a query to a slice of records
fn select<E: EventRecord>(rows: &[E], query: &StoreQuery) -> Vec<E> {
    let mut matched: Vec<E> = rows
        .iter()
        .filter(|row| query.predicates.iter().all(|p| p.matches(*row)))
        .cloned()
        .collect();

    matched.sort_by(|a, b| {
        query
            .order
            .apply((a.timestamp(), a.id()).cmp(&(b.timestamp(), b.id())))
    });
    matched.truncate(query.limit as usize);

    if !query.skip_columns.is_empty() {
        for row in &mut matched {
            row.clear_columns(&query.skip_columns);
        }
    }
    matched
}

#[async_trait]
impl EventStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_fs_events(&self, query: &StoreQuery) -> Result<Vec<FsEvent>> {
        Ok(select(&self.fs_events.read().await, query))
    }

    async fn find_provider_events(&self, query: &StoreQuery) -> Result<Vec<ProviderEvent>> {
        Ok(select(&self.provider_events.read().await, query))
    }

    async fn find_log_events(&self, query: &StoreQuery) -> Result<Vec<LogEvent>> {
        Ok(select(&self.log_events.read().await, query))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
