//! Typed predicates and ordering
//!
//! Predicates describe conditions on a single event table. They are rendered
//! to SQL by [`crate::store::sql`] and can also be evaluated directly against
//! a record with [`Predicate::matches`].
//!
//! # Example
//!
//! ```rust
//! use eventsearch::filter::{Order, Predicate, Value};
//!
//! let by_user = Predicate::eq("username", "alice");
//! let recent = Predicate::range("timestamp", Some(1_700_000_000_000), None);
//! let order = Order::from_flag(0);
//!
//! assert_eq!(order, Order::Descending);
//! assert_eq!(format!("{}", Value::from(42_i32)), "42");
//! # let _ = (by_user, recent);
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::events::EventRecord;

/// Direction for ordering results
///
/// Both the timestamp and the id are sorted in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Newest first
    #[default]
    Descending,
    /// Oldest first
    Ascending,
}

impl Order {
    /// Convert a wire order flag
    ///
    /// `0` is descending; every other value is ascending.
    #[must_use]
    pub const fn from_flag(flag: i32) -> Self {
        if flag == 0 {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    /// The wire flag for this direction
    #[must_use]
    pub const fn as_flag(self) -> i32 {
        match self {
            Self::Descending => 0,
            Self::Ascending => 1,
        }
    }

    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Descending => "DESC",
            Self::Ascending => "ASC",
        }
    }

    /// Apply this direction to an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A value bound into a predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// String value
    Text(String),
    /// 64-bit integer value
    Integer(i64),
}

impl Value {
    /// The integer payload, if any
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

/// A single condition on an event table
///
/// Columns are always static names from [`crate::events::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = value`
    Equals { column: &'static str, value: Value },
    /// `column IN (values)`; an empty set does not restrict
    InSet {
        column: &'static str,
        values: Vec<Value>,
    },
    /// `lower <= column <= upper`, each side optional
    Range {
        column: &'static str,
        lower: Option<i64>,
        upper: Option<i64>,
    },
    /// `column NOT IN (values)`; an empty set does not restrict
    ExcludeSet {
        column: &'static str,
        values: Vec<Value>,
    },
    /// Rows strictly after `(timestamp, id)` in the given direction
    Seek {
        order: Order,
        timestamp: i64,
        id: String,
    },
}

impl Predicate {
    /// Create an equality predicate
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Equals {
            column,
            value: value.into(),
        }
    }

    /// Create a set membership predicate
    pub fn in_set<I, V>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::InSet {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an inclusive range predicate
    pub fn range(column: &'static str, lower: Option<i64>, upper: Option<i64>) -> Self {
        Self::Range {
            column,
            lower,
            upper,
        }
    }

    /// Create an exclusion predicate
    pub fn exclude<I, V>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::ExcludeSet {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a keyset seek predicate
    pub fn seek(order: Order, timestamp: i64, id: impl Into<String>) -> Self {
        Self::Seek {
            order,
            timestamp,
            id: id.into(),
        }
    }

    /// Whether the predicate places no restriction on the rows
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Self::InSet { values, .. } | Self::ExcludeSet { values, .. } => values.is_empty(),
            Self::Range { lower, upper, .. } => lower.is_none() && upper.is_none(),
            Self::Equals { .. } | Self::Seek { .. } => false,
        }
    }

    /// Evaluate the predicate against a record
    ///
    /// Unknown columns never match.
    pub fn matches<E: EventRecord>(&self, record: &E) -> bool {
        match self {
            Self::Equals { column, value } => record.column_value(column).as_ref() == Some(value),
            Self::InSet { column, values } => {
                values.is_empty()
                    || record
                        .column_value(column)
                        .is_some_and(|v| values.contains(&v))
            }
            Self::Range {
                column,
                lower,
                upper,
            } => match record.column_value(column).and_then(|v| v.as_integer()) {
                Some(v) => lower.is_none_or(|l| v >= l) && upper.is_none_or(|u| v <= u),
                None => false,
            },
            Self::ExcludeSet { column, values } => {
                values.is_empty()
                    || record
                        .column_value(column)
                        .is_some_and(|v| !values.contains(&v))
            }
            Self::Seek {
                order,
                timestamp,
                id,
            } => {
                let key = (record.timestamp(), record.id());
                order.apply(key.cmp(&(*timestamp, id.as_str()))) == Ordering::Greater
            }
        }
    }
}
