//! Keyset pagination search engine
//!
//! A search request is validated, turned into a [`StoreQuery`] and run
//! against the store. Rows come back ordered by `(timestamp, id)` and the
//! page reports which ids share the first and last timestamps so callers
//! can continue from either end.
//!
//! Two cursors are supported, one per request:
//!
//! - `from_id` with the boundary timestamp (`start_timestamp` when
//!   ascending, `end_timestamp` when descending) selects rows strictly
//!   after `(timestamp, from_id)`.
//! - `exclude_ids` (deprecated) narrows the range to the boundary
//!   timestamp and skips the ids already served. While a page still ends
//!   on the boundary timestamp, excluded ids confirmed to sit on it are
//!   kept in `same_ts_at_end`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eventsearch::filter::{CommonSearchParams, LogEventSearch};
//! use eventsearch::search::Searcher;
//! use eventsearch::store::MemoryStore;
//!
//! # async fn example() -> eventsearch::Result<()> {
//! let searcher = Searcher::new(Arc::new(MemoryStore::new()));
//! let page = searcher
//!     .search_log_events(&LogEventSearch {
//!         common: CommonSearchParams { limit: 50, ..Default::default() },
//!         ..Default::default()
//!     })
//!     .await?;
//! assert!(page.same_ts_at_start.is_empty());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::events::{columns, EventKind, EventRecord, FsEvent, LogEvent, ProviderEvent};
use crate::filter::{
    CommonSearchParams, FsEventSearch, LogEventSearch, Order, Predicate, ProviderEventSearch,
    SearchFilters,
};
use crate::store::{EventStore, StoreQuery};

pub mod codec;

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// JSON array of the matched events
    pub data: Vec<u8>,
    /// Ids from the front of the page sharing the first timestamp
    pub same_ts_at_start: Vec<String>,
    /// Ids from the back of the page, tail first, sharing the last timestamp
    pub same_ts_at_end: Vec<String>,
}

impl SearchPage {
    /// Decode the payload into events
    pub fn events<E: EventRecord>(&self) -> Result<Vec<E>> {
        codec::decode(&self.data)
    }
}

/// Runs searches against an event store
#[derive(Clone)]
pub struct Searcher {
    store: Arc<dyn EventStore>,
}

impl Searcher {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Search filesystem events
    pub async fn search_fs_events(&self, filters: &FsEventSearch) -> Result<SearchPage> {
        self.search(filters).await
    }

    /// Search provider events
    pub async fn search_provider_events(
        &self,
        filters: &ProviderEventSearch,
    ) -> Result<SearchPage> {
        self.search(filters).await
    }

    /// Search log events
    pub async fn search_log_events(&self, filters: &LogEventSearch) -> Result<SearchPage> {
        self.search(filters).await
    }

    async fn search<F>(&self, filters: &F) -> Result<SearchPage>
    where
        F: SearchFilters,
        F::Record: Lookup,
    {
        let kind: EventKind = <F::Record as EventRecord>::KIND;
        let query = build_query(filters)?;
        let rows: Vec<F::Record> = self.find(&query).await?;
        tracing::debug!(kind = %kind, rows = rows.len(), "Search completed");

        let carried: Vec<String> = match boundary_lookup(filters.common(), &rows) {
            Some(lookup) => self
                .find::<F::Record>(&lookup)
                .await?
                .into_iter()
                .map(|row| row.id().to_string())
                .collect(),
            None => Vec::new(),
        };
        build_page(filters.common(), &rows, &carried)
    }

    async fn find<E: Lookup>(&self, query: &StoreQuery) -> Result<Vec<E>> {
        let kind: EventKind = E::KIND;
        E::find(self.store.as_ref(), query).await.map_err(|e| {
            tracing::warn!(kind = %kind, store = self.store.name(), error = %e, "Unable to search events");
            e
        })
    }
}

/// Dispatch from a record type to its store query
#[async_trait]
trait Lookup: EventRecord {
    async fn find(store: &dyn EventStore, query: &StoreQuery) -> Result<Vec<Self>>;
}

#[async_trait]
impl Lookup for FsEvent {
    async fn find(store: &dyn EventStore, query: &StoreQuery) -> Result<Vec<Self>> {
        store.find_fs_events(query).await
    }
}

#[async_trait]
impl Lookup for ProviderEvent {
    async fn find(store: &dyn EventStore, query: &StoreQuery) -> Result<Vec<Self>> {
        store.find_provider_events(query).await
    }
}

#[async_trait]
impl Lookup for LogEvent {
    async fn find(store: &dyn EventStore, query: &StoreQuery) -> Result<Vec<Self>> {
        store.find_log_events(query).await
    }
}

/// Validate a request and resolve it into a store query
///
/// Fails without touching the store when the limit is missing or the
/// cursor is inconsistent.
pub fn build_query<F: SearchFilters>(filters: &F) -> Result<StoreQuery> {
    let common = filters.common();
    if common.limit <= 0 {
        return Err(Error::MissingLimit);
    }
    if !common.exclude_ids.is_empty() && !common.from_id.is_empty() {
        return Err(Error::ConflictingCursor);
    }

    let order = common.order();
    let mut predicates = filters.predicates();

    if !common.from_id.is_empty() {
        let boundary = common.boundary_timestamp();
        if boundary <= 0 {
            return Err(Error::MissingCursorTimestamp(match order {
                Order::Ascending => "start",
                Order::Descending => "end",
            }));
        }
        predicates.push(Predicate::seek(order, boundary, common.from_id.as_str()));
    }

    Ok(StoreQuery {
        predicates,
        order,
        limit: common.limit.unsigned_abs(),
        skip_columns: filters.skip_columns(),
    })
}

/// Ids sharing the first and last timestamps of a page
///
/// The end set is collected from the tail, so its first element is the
/// last row of the page.
pub fn tie_sets<E: EventRecord>(rows: &[E]) -> (Vec<String>, Vec<String>) {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return (Vec::new(), Vec::new());
    };

    let at_start = rows
        .iter()
        .take_while(|row| row.timestamp() == first.timestamp())
        .map(|row| row.id().to_string())
        .collect();
    let at_end = rows
        .iter()
        .rev()
        .take_while(|row| row.timestamp() == last.timestamp())
        .map(|row| row.id().to_string())
        .collect();

    (at_start, at_end)
}

/// Query confirming which excluded ids sit on the boundary timestamp
///
/// Needed only when the page still ends on the boundary, since the
/// excluded rows are then part of its end tie set.
fn boundary_lookup<E: EventRecord>(common: &CommonSearchParams, rows: &[E]) -> Option<StoreQuery> {
    let boundary = common.boundary_timestamp();
    if common.exclude_ids.is_empty() || boundary <= 0 || rows.last()?.timestamp() != boundary {
        return None;
    }

    let limit = u32::try_from(common.exclude_ids.len()).unwrap_or(u32::MAX);
    let mut query = StoreQuery::new(common.order(), limit);
    query.predicates = vec![
        Predicate::range(columns::TIMESTAMP, Some(boundary), Some(boundary)),
        Predicate::in_set(columns::ID, common.exclude_ids.iter().cloned()),
    ];
    query.skip_columns = vec![columns::OBJECT_DATA];
    Some(query)
}

fn build_page<E: EventRecord>(
    common: &CommonSearchParams,
    rows: &[E],
    carried: &[String],
) -> Result<SearchPage> {
    let data = codec::encode(rows)?;
    let (same_ts_at_start, mut same_ts_at_end) = tie_sets(rows);

    for id in &common.exclude_ids {
        if carried.contains(id) && !same_ts_at_end.contains(id) {
            same_ts_at_end.push(id.clone());
        }
    }

    Ok(SearchPage {
        data,
        same_ts_at_start,
        same_ts_at_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{columns, LogEvent};

    fn log(id: &str, timestamp: i64) -> LogEvent {
        LogEvent {
            id: id.to_string(),
            timestamp,
            ..Default::default()
        }
    }

    fn search(limit: i32, order: i32) -> LogEventSearch {
        LogEventSearch {
            common: CommonSearchParams {
                limit,
                order,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_tie_sets_of_empty_page() {
        let (start, end) = tie_sets::<LogEvent>(&[]);
        assert!(start.is_empty());
        assert!(end.is_empty());
    }

    #[test]
    fn test_tie_sets_single_timestamp() {
        let rows = vec![log("a", 5), log("b", 5), log("c", 5)];
        let (start, end) = tie_sets(&rows);
        assert_eq!(start, vec!["a", "b", "c"]);
        assert_eq!(end, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_tie_sets_mixed() {
        let rows = vec![log("a", 1), log("b", 1), log("c", 2), log("d", 3), log("e", 3)];
        let (start, end) = tie_sets(&rows);
        assert_eq!(start, vec!["a", "b"]);
        assert_eq!(end, vec!["e", "d"]);
    }

    #[test]
    fn test_missing_limit() {
        assert!(matches!(build_query(&search(0, 0)), Err(Error::MissingLimit)));
        assert!(matches!(build_query(&search(-3, 1)), Err(Error::MissingLimit)));
    }

    #[test]
    fn test_conflicting_cursor() {
        let mut filters = search(10, 1);
        filters.common.start_timestamp = 100;
        filters.common.from_id = "a".to_string();
        filters.common.exclude_ids = vec!["b".to_string()];
        assert!(matches!(build_query(&filters), Err(Error::ConflictingCursor)));
    }

    #[test]
    fn test_from_id_needs_boundary() {
        let mut filters = search(10, 1);
        filters.common.from_id = "a".to_string();
        filters.common.end_timestamp = 100;
        assert!(matches!(
            build_query(&filters),
            Err(Error::MissingCursorTimestamp("start"))
        ));

        filters.common.order = 0;
        filters.common.start_timestamp = 100;
        filters.common.end_timestamp = 0;
        assert!(matches!(
            build_query(&filters),
            Err(Error::MissingCursorTimestamp("end"))
        ));
    }

    #[test]
    fn test_from_id_adds_seek() {
        let mut filters = search(2, 0);
        filters.common.from_id = "ev3".to_string();
        filters.common.end_timestamp = 101;

        let query = build_query(&filters).unwrap();
        assert_eq!(query.order, Order::Descending);
        assert_eq!(query.limit, 2);
        assert_eq!(
            query.predicates,
            vec![
                Predicate::range(columns::TIMESTAMP, None, Some(101)),
                Predicate::seek(Order::Descending, 101, "ev3"),
            ]
        );
    }

    #[test]
    fn test_boundary_lookup_only_when_page_ends_on_boundary() {
        let mut common = CommonSearchParams {
            start_timestamp: 101,
            exclude_ids: vec!["ev1".to_string(), "ev9".to_string()],
            order: 1,
            ..Default::default()
        };

        let lookup = boundary_lookup(&common, &[log("ev2", 101), log("ev3", 101)]).unwrap();
        assert_eq!(lookup.order, Order::Ascending);
        assert_eq!(lookup.limit, 2);
        assert_eq!(
            lookup.predicates,
            vec![
                Predicate::range(columns::TIMESTAMP, Some(101), Some(101)),
                Predicate::in_set(columns::ID, ["ev1", "ev9"]),
            ]
        );

        assert!(boundary_lookup(&common, &[log("ev4", 102)]).is_none());
        assert!(boundary_lookup::<LogEvent>(&common, &[]).is_none());

        common.exclude_ids.clear();
        assert!(boundary_lookup(&common, &[log("ev2", 101)]).is_none());
    }

    #[test]
    fn test_only_confirmed_ids_are_carried() {
        let common = CommonSearchParams {
            start_timestamp: 101,
            exclude_ids: vec!["ev1".to_string(), "ev9".to_string(), "ev3".to_string()],
            order: 1,
            ..Default::default()
        };
        let rows = vec![log("ev2", 101), log("ev3", 101)];

        let page = build_page(&common, &rows, &["ev1".to_string(), "ev3".to_string()]).unwrap();
        assert_eq!(page.same_ts_at_end, vec!["ev3", "ev2", "ev1"]);

        let page = build_page(&common, &rows, &[]).unwrap();
        assert_eq!(page.same_ts_at_end, vec!["ev3", "ev2"]);
    }
}
