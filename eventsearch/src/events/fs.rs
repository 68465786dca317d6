//! Filesystem events

use serde::{Deserialize, Serialize};

use super::{columns, is_zero_i32, is_zero_i64, EventKind, EventRecord, NullAs};
use crate::filter::Value;

/// A filesystem operation performed by a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct FsEvent {
    pub id: String,
    pub timestamp: i64,
    pub action: String,
    pub username: String,
    pub fs_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fs_target_path: String,
    pub virtual_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub virtual_target_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_cmd: String,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub file_size: i64,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub elapsed: i64,
    pub status: i32,
    pub protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip: String,
    pub session_id: String,
    pub fs_provider: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub open_flags: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
}

impl EventRecord for FsEvent {
    const KIND: EventKind = EventKind::Fs;
    const TABLE: &'static str = "eventstore_fs_events";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "timestamp",
        "action",
        "username",
        "fs_path",
        "fs_target_path",
        "virtual_path",
        "virtual_target_path",
        "ssh_cmd",
        "file_size",
        "elapsed",
        "status",
        "protocol",
        "ip",
        "session_id",
        "fs_provider",
        "bucket",
        "endpoint",
        "open_flags",
        "role",
        "instance_id",
    ];
    const NULLABLE: &'static [(&'static str, NullAs)] = &[
        ("fs_path", NullAs::Text),
        ("fs_target_path", NullAs::Text),
        ("virtual_path", NullAs::Text),
        ("virtual_target_path", NullAs::Text),
        ("ssh_cmd", NullAs::Text),
        ("ip", NullAs::Text),
        ("session_id", NullAs::Text),
        ("bucket", NullAs::Text),
        ("endpoint", NullAs::Text),
        ("role", NullAs::Text),
        ("instance_id", NullAs::Text),
        ("file_size", NullAs::Integer),
        ("elapsed", NullAs::Integer),
        ("status", NullAs::Integer),
        ("fs_provider", NullAs::Integer),
        ("open_flags", NullAs::Integer),
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
            columns::SSH_CMD => Value::from(self.ssh_cmd.as_str()),
            columns::STATUS => Value::from(self.status),
            columns::PROTOCOL => Value::from(self.protocol.as_str()),
            columns::INSTANCE_ID => Value::from(self.instance_id.as_str()),
            columns::FS_PROVIDER => Value::from(self.fs_provider),
            columns::BUCKET => Value::from(self.bucket.as_str()),
            columns::ENDPOINT => Value::from(self.endpoint.as_str()),
            columns::ROLE => Value::from(self.role.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> FsEvent {
        FsEvent {
            id: "ev1".to_string(),
            timestamp: 100,
            action: "upload".to_string(),
            username: "username1".to_string(),
            fs_path: "/tmp/file.txt".to_string(),
            virtual_path: "file.txt".to_string(),
            status: 1,
            protocol: "SFTP".to_string(),
            session_id: "1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_optional_fields_are_omitted() {
        let json = serde_json::to_value(upload()).unwrap();
        let object = json.as_object().unwrap();

        for omitted in [
            "fs_target_path",
            "virtual_target_path",
            "ssh_cmd",
            "file_size",
            "elapsed",
            "ip",
            "bucket",
            "endpoint",
            "open_flags",
            "role",
            "instance_id",
        ] {
            assert!(!object.contains_key(omitted), "{omitted} should be omitted");
        }
        // Required fields stay even when zero
        assert_eq!(object["fs_provider"], 0);
        assert_eq!(object["status"], 1);
    }

    #[test]
    fn test_populated_optional_fields_are_kept() {
        let event = FsEvent {
            ssh_cmd: "scp".to_string(),
            file_size: 123,
            open_flags: 512,
            ..upload()
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["ssh_cmd"], "scp");
        assert_eq!(json["file_size"], 123);
        assert_eq!(json["open_flags"], 512);
    }

    #[test]
    fn test_column_value() {
        let event = upload();
        assert_eq!(event.column_value("status"), Some(Value::Integer(1)));
        assert_eq!(
            event.column_value("username"),
            Some(Value::Text("username1".to_string()))
        );
        assert_eq!(event.column_value("fs_path"), None);
    }
}
