//! Protocol log events

use serde::{Deserialize, Serialize};

use super::{columns, EventKind, EventRecord, NullAs};
use crate::filter::Value;

/// A log message emitted by one of the protocol servers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct LogEvent {
    pub id: String,
    pub timestamp: i64,
    pub event: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
}

impl EventRecord for LogEvent {
    const KIND: EventKind = EventKind::Log;
    const TABLE: &'static str = "eventstore_log_events";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "timestamp",
        "event",
        "protocol",
        "username",
        "ip",
        "message",
        "role",
        "instance_id",
    ];
    const NULLABLE: &'static [(&'static str, NullAs)] = &[
        ("username", NullAs::Text),
        ("ip", NullAs::Text),
        ("message", NullAs::Text),
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
            columns::EVENT => Value::from(self.event),
            columns::PROTOCOL => Value::from(self.protocol.as_str()),
            columns::USERNAME => Value::from(self.username.as_str()),
            columns::IP => Value::from(self.ip.as_str()),
            columns::ROLE => Value::from(self.role.as_str()),
            columns::INSTANCE_ID => Value::from(self.instance_id.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_event_and_keys_are_always_present() {
        let event = LogEvent {
            id: "ev1".to_string(),
            timestamp: 100,
            event: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"id":"ev1","timestamp":100,"event":1}"#);
    }

    #[test]
    fn test_decode_fills_missing_fields() {
        let event: LogEvent =
            serde_json::from_str(r#"{"id":"ev2","timestamp":7,"event":3,"protocol":"FTP"}"#)
                .unwrap();
        assert_eq!(event.protocol, "FTP");
        assert!(event.message.is_empty());
        assert_eq!(event.column_value("event"), Some(Value::Integer(3)));
    }
}
