//! Search request parameters
//!
//! The request types mirror the wire format: zero values mean "not set".
//! [`SearchFilters::predicates`] turns a request into the conjunction of
//! predicates the store applies, excluding the cursor which is handled by
//! the search engine.

use serde::{Deserialize, Serialize};

use super::{FilterBuilder, Order, Predicate};
use crate::events::{columns, EventRecord, FsEvent, LogEvent, ProviderEvent};

/// Parameters shared by every event kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonSearchParams {
    /// Inclusive lower bound, `0` for unbounded
    pub start_timestamp: i64,
    /// Inclusive upper bound, `0` for unbounded
    pub end_timestamp: i64,
    /// Allowed actions; ignored for log events
    pub actions: Vec<String>,
    pub username: String,
    pub ip: String,
    pub instance_ids: Vec<String>,
    /// Tie set of the previous page (deprecated cursor)
    pub exclude_ids: Vec<String>,
    /// Last id of the previous page
    pub from_id: String,
    pub role: String,
    pub limit: i32,
    /// `0` descending, anything else ascending
    pub order: i32,
}

impl CommonSearchParams {
    /// Requested ordering
    pub fn order(&self) -> Order {
        Order::from_flag(self.order)
    }

    /// The timestamp a cursor is anchored to
    ///
    /// `start_timestamp` when ascending, `end_timestamp` when descending.
    pub fn boundary_timestamp(&self) -> i64 {
        match self.order() {
            Order::Ascending => self.start_timestamp,
            Order::Descending => self.end_timestamp,
        }
    }

    /// Predicates shared by every kind
    fn builder(&self, with_actions: bool) -> FilterBuilder {
        let builder = FilterBuilder::new().timestamp_range(self.start_timestamp, self.end_timestamp);
        let builder = if with_actions {
            builder.in_set(columns::ACTION, &self.actions)
        } else {
            builder
        };
        builder
            .equals(columns::USERNAME, &self.username)
            .equals(columns::IP, &self.ip)
            .in_set(columns::INSTANCE_ID, &self.instance_ids)
            .exclude_ids(&self.exclude_ids)
            .equals(columns::ROLE, &self.role)
    }
}

/// Filesystem event search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsEventSearch {
    #[serde(flatten)]
    pub common: CommonSearchParams,
    pub ssh_cmd: String,
    pub protocols: Vec<String>,
    pub statuses: Vec<i32>,
    /// `None` or any negative value means every provider
    pub fs_provider: Option<i32>,
    pub bucket: String,
    pub endpoint: String,
}

/// Provider event search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEventSearch {
    #[serde(flatten)]
    pub common: CommonSearchParams,
    pub object_types: Vec<String>,
    pub object_name: String,
    /// Do not select the serialized object
    pub omit_object_data: bool,
}

/// Log event search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEventSearch {
    #[serde(flatten)]
    pub common: CommonSearchParams,
    pub events: Vec<i32>,
    pub protocols: Vec<String>,
}

/// A search request for one event kind
pub trait SearchFilters {
    /// Record type returned by the search
    type Record: EventRecord;

    /// Shared parameters
    fn common(&self) -> &CommonSearchParams;

    /// Filter predicates, cursor excluded
    fn predicates(&self) -> Vec<Predicate>;

    /// Columns left out of the select list
    fn skip_columns(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

impl SearchFilters for FsEventSearch {
    type Record = FsEvent;

    fn common(&self) -> &CommonSearchParams {
        &self.common
    }

    fn predicates(&self) -> Vec<Predicate> {
        self.common
            .builder(true)
            .equals(columns::SSH_CMD, &self.ssh_cmd)
            .in_set(columns::PROTOCOL, &self.protocols)
            .in_set(columns::STATUS, &self.statuses)
            .equals_opt(columns::FS_PROVIDER, self.fs_provider.filter(|p| *p >= 0))
            .equals(columns::BUCKET, &self.bucket)
            .equals(columns::ENDPOINT, &self.endpoint)
            .build()
    }
}

impl SearchFilters for ProviderEventSearch {
    type Record = ProviderEvent;

    fn common(&self) -> &CommonSearchParams {
        &self.common
    }

    fn predicates(&self) -> Vec<Predicate> {
        self.common
            .builder(true)
            .in_set(columns::OBJECT_TYPE, &self.object_types)
            .equals(columns::OBJECT_NAME, &self.object_name)
            .build()
    }

    fn skip_columns(&self) -> Vec<&'static str> {
        if self.omit_object_data {
            vec![columns::OBJECT_DATA]
        } else {
            Vec::new()
        }
    }
}

impl SearchFilters for LogEventSearch {
    type Record = LogEvent;

    fn common(&self) -> &CommonSearchParams {
        &self.common
    }

    fn predicates(&self) -> Vec<Predicate> {
        self.common
            .builder(false)
            .in_set(columns::EVENT, &self.events)
            .in_set(columns::PROTOCOL, &self.protocols)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Value;

    #[test]
    fn test_default_request_has_no_predicates() {
        assert!(FsEventSearch::default().predicates().is_empty());
        assert!(ProviderEventSearch::default().predicates().is_empty());
        assert!(LogEventSearch::default().predicates().is_empty());
    }

    #[test]
    fn test_negative_fs_provider_is_unrestricted() {
        let mut search = FsEventSearch {
            fs_provider: Some(-1),
            ..Default::default()
        };
        assert!(search.predicates().is_empty());

        search.fs_provider = Some(0);
        assert_eq!(
            search.predicates(),
            vec![Predicate::eq(columns::FS_PROVIDER, 0)]
        );
    }

    #[test]
    fn test_log_search_ignores_actions() {
        let search = LogEventSearch {
            common: CommonSearchParams {
                actions: vec!["upload".to_string()],
                ..Default::default()
            },
            events: vec![1, 2],
            ..Default::default()
        };
        assert_eq!(
            search.predicates(),
            vec![Predicate::InSet {
                column: columns::EVENT,
                values: vec![Value::Integer(1), Value::Integer(2)],
            }]
        );
    }

    #[test]
    fn test_fs_predicates() {
        let search = FsEventSearch {
            common: CommonSearchParams {
                start_timestamp: 10,
                end_timestamp: 20,
                actions: vec!["upload".to_string()],
                username: "alice".to_string(),
                exclude_ids: vec!["x".to_string()],
                ..Default::default()
            },
            ssh_cmd: "scp".to_string(),
            statuses: vec![1],
            bucket: "b".to_string(),
            ..Default::default()
        };

        assert_eq!(
            search.predicates(),
            vec![
                Predicate::range(columns::TIMESTAMP, Some(10), Some(20)),
                Predicate::in_set(columns::ACTION, ["upload"]),
                Predicate::eq(columns::USERNAME, "alice"),
                Predicate::exclude(columns::ID, ["x"]),
                Predicate::eq(columns::SSH_CMD, "scp"),
                Predicate::in_set(columns::STATUS, [1]),
                Predicate::eq(columns::BUCKET, "b"),
            ]
        );
    }

    #[test]
    fn test_omit_object_data() {
        let mut search = ProviderEventSearch::default();
        assert!(search.skip_columns().is_empty());
        search.omit_object_data = true;
        assert_eq!(search.skip_columns(), vec![columns::OBJECT_DATA]);
    }

    #[test]
    fn test_boundary_timestamp_follows_order() {
        let mut common = CommonSearchParams {
            start_timestamp: 1,
            end_timestamp: 2,
            ..Default::default()
        };
        assert_eq!(common.boundary_timestamp(), 2);
        common.order = 1;
        assert_eq!(common.boundary_timestamp(), 1);
        common.order = 7;
        assert_eq!(common.boundary_timestamp(), 1);
    }

    #[test]
    fn test_deserialize_flattened_request() {
        let search: ProviderEventSearch = serde_json::from_str(
            r#"{"limit":5,"order":1,"object_types":["user"],"omit_object_data":true}"#,
        )
        .unwrap();
        assert_eq!(search.common.limit, 5);
        assert_eq!(search.common.order(), Order::Ascending);
        assert_eq!(search.object_types, vec!["user".to_string()]);
        assert!(search.omit_object_data);
    }
}
