//! Provider (configuration change) events

use serde::{Deserialize, Serialize};

use super::{base64_bytes, columns, EventKind, EventRecord, NullAs};
use crate::filter::Value;

/// A change to an object managed by the data provider (user, folder, ...)
///
/// `object_data` holds the serialized object as written by the producer.
/// It is `None` when the column was not selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct ProviderEvent {
    pub id: String,
    pub timestamp: i64,
    pub action: String,
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip: String,
    pub object_type: String,
    pub object_name: String,
    #[serde(with = "base64_bytes")]
    #[sqlx(default)]
    pub object_data: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
}

impl EventRecord for ProviderEvent {
    const KIND: EventKind = EventKind::Provider;
    const TABLE: &'static str = "eventstore_provider_events";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "timestamp",
        "action",
        "username",
        "ip",
        "object_type",
        "object_name",
        "object_data",
        "role",
        "instance_id",
    ];
    const NULLABLE: &'static [(&'static str, NullAs)] = &[
        ("ip", NullAs::Text),
        ("object_type", NullAs::Text),
        ("object_name", NullAs::Text),
        ("role", NullAs::Text),
        ("instance_id", NullAs::Text),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn column_value(&self, column: &str) -> Option<Value> {
        let value = match column {
            columns::ID => Value::from(self.id.as_str()),
            columns::TIMESTAMP => Value::from(self.timestamp),
            columns::ACTION => Value::from(self.action.as_str()),
            columns::USERNAME => Value::from(self.username.as_str()),
            columns::IP => Value::from(self.ip.as_str()),
            columns::OBJECT_TYPE => Value::from(self.object_type.as_str()),
            columns::OBJECT_NAME => Value::from(self.object_name.as_str()),
            columns::ROLE => Value::from(self.role.as_str()),
            columns::INSTANCE_ID => Value::from(self.instance_id.as_str()),
            _ => return None,
        };
        Some(value)
    }

    fn clear_columns(&mut self, skipped: &[&str]) {
        if skipped.contains(&columns::OBJECT_DATA) {
            self.object_data = None;
        }
    }
}
