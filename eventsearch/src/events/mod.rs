//! Audit event records
//!
//! Three append-only event kinds are stored in their own tables:
//!
//! - [`FsEvent`]: filesystem operations (uploads, downloads, renames, ...)
//! - [`ProviderEvent`]: configuration changes made through the data provider
//! - [`LogEvent`]: protocol log messages (login failures, ...)
//!
//! Every record carries a sortable string `id` and an integer `timestamp`.
//! Timestamps are not unique, so `(timestamp, id)` is the total order used
//! by the search engine.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use crate::filter::Value;

mod fs;
mod log;
mod provider;

pub use fs::FsEvent;
pub use log::LogEvent;
pub use provider::ProviderEvent;

/// Column names shared by the filter builder, the SQL compiler and the records
pub mod columns {
    pub const ID: &str = "id";
    pub const TIMESTAMP: &str = "timestamp";
    pub const ACTION: &str = "action";
    pub const USERNAME: &str = "username";
    pub const IP: &str = "ip";
    pub const SSH_CMD: &str = "ssh_cmd";
    pub const STATUS: &str = "status";
    pub const PROTOCOL: &str = "protocol";
    pub const INSTANCE_ID: &str = "instance_id";
    pub const FS_PROVIDER: &str = "fs_provider";
    pub const BUCKET: &str = "bucket";
    pub const ENDPOINT: &str = "endpoint";
    pub const ROLE: &str = "role";
    pub const OBJECT_TYPE: &str = "object_type";
    pub const OBJECT_NAME: &str = "object_name";
    pub const OBJECT_DATA: &str = "object_data";
    pub const EVENT: &str = "event";
}

/// The kind of an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Filesystem event
    Fs,
    /// Provider (configuration) event
    Provider,
    /// Log event
    Log,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fs => write!(f, "fs"),
            Self::Provider => write!(f, "provider"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// Value read back in place of NULL for an optional column
///
/// Older rows predate some columns and hold NULL there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullAs {
    /// Empty string
    Text,
    /// Zero
    Integer,
}

impl NullAs {
    /// SQL literal for the substituted value
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "''",
            Self::Integer => "0",
        }
    }
}

/// Behaviour shared by the three event record types
///
/// The constants describe the backing table; `column_value` exposes the
/// filterable columns so predicates can be evaluated outside the database.
pub trait EventRecord: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Event kind
    const KIND: EventKind;

    /// Backing table name
    const TABLE: &'static str;

    /// Selected columns, in declaration order
    const COLUMNS: &'static [&'static str];

    /// Columns that may hold NULL, with the value decoded in its place
    const NULLABLE: &'static [(&'static str, NullAs)] = &[];

    /// Stable record identifier
    fn id(&self) -> &str;

    /// Primary ordering key
    fn timestamp(&self) -> i64;

    /// Value of a filterable column, `None` for unknown columns
    fn column_value(&self, column: &str) -> Option<Value>;

    /// Reset the given columns as if they had not been selected
    fn clear_columns(&mut self, _columns: &[&str]) {}

    /// How NULL is read back for `column`, `None` for required columns
    fn null_as(column: &str) -> Option<NullAs> {
        Self::NULLABLE
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, null_as)| *null_as)
    }
}

pub(crate) fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

pub(crate) fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

/// Serde adapter encoding binary payloads as standard base64 strings
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| {
                STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
