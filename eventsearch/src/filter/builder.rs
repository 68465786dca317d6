//! Predicate builder
//!
//! Request fields use "empty means unrestricted" semantics. The builder
//! applies those rules once so callers can chain every field without
//! checking it first.

use super::{Predicate, Value};
use crate::events::columns;

/// Collects predicates, skipping fields that do not restrict the result
///
/// # Example
///
/// ```rust
/// use eventsearch::filter::FilterBuilder;
///
/// let predicates = FilterBuilder::new()
///     .timestamp_range(0, 0)
///     .equals("username", "")
///     .in_set("action", &["upload".to_string()])
///     .build();
///
/// assert_eq!(predicates.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    predicates: Vec<Predicate>,
}

impl FilterBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the timestamp column to `[start, end]`
    ///
    /// Bounds of zero or below are open.
    #[must_use]
    pub fn timestamp_range(mut self, start: i64, end: i64) -> Self {
        let lower = (start > 0).then_some(start);
        let upper = (end > 0).then_some(end);
        if lower.is_some() || upper.is_some() {
            self.predicates
                .push(Predicate::range(columns::TIMESTAMP, lower, upper));
        }
        self
    }

    /// Add `column = value` unless `value` is empty
    #[must_use]
    pub fn equals(mut self, column: &'static str, value: &str) -> Self {
        if !value.is_empty() {
            self.predicates.push(Predicate::eq(column, value));
        }
        self
    }

    /// Add `column = value` when a value is present
    #[must_use]
    pub fn equals_opt(mut self, column: &'static str, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::eq(column, value));
        }
        self
    }

    /// Add `column IN (values)` unless `values` is empty
    #[must_use]
    pub fn in_set<T>(mut self, column: &'static str, values: &[T]) -> Self
    where
        T: Clone + Into<Value>,
    {
        if !values.is_empty() {
            self.predicates
                .push(Predicate::in_set(column, values.iter().cloned()));
        }
        self
    }

    /// Add `id NOT IN (ids)` unless `ids` is empty
    #[must_use]
    pub fn exclude_ids(mut self, ids: &[String]) -> Self {
        if !ids.is_empty() {
            self.predicates
                .push(Predicate::exclude(columns::ID, ids.iter().cloned()));
        }
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Vec<Predicate> {
        self.predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_skipped() {
        let predicates = FilterBuilder::new()
            .timestamp_range(0, -5)
            .equals(columns::USERNAME, "")
            .in_set::<String>(columns::ACTION, &[])
            .exclude_ids(&[])
            .equals_opt(columns::FS_PROVIDER, None::<i32>)
            .build();
        assert!(predicates.is_empty());
    }

    #[test]
    fn test_half_open_timestamp_range() {
        let predicates = FilterBuilder::new().timestamp_range(0, 200).build();
        assert_eq!(
            predicates,
            vec![Predicate::range(columns::TIMESTAMP, None, Some(200))]
        );

        let predicates = FilterBuilder::new().timestamp_range(100, 0).build();
        assert_eq!(
            predicates,
            vec![Predicate::range(columns::TIMESTAMP, Some(100), None)]
        );
    }

    #[test]
    fn test_predicates_keep_insertion_order() {
        let predicates = FilterBuilder::new()
            .equals(columns::USERNAME, "alice")
            .in_set(columns::STATUS, &[1, 2])
            .exclude_ids(&["a".to_string()])
            .build();

        assert_eq!(predicates.len(), 3);
        assert_eq!(predicates[0], Predicate::eq(columns::USERNAME, "alice"));
        assert_eq!(
            predicates[1],
            Predicate::InSet {
                column: columns::STATUS,
                values: vec![Value::Integer(1), Value::Integer(2)],
            }
        );
        assert_eq!(predicates[2], Predicate::exclude(columns::ID, ["a"]));
    }
}
