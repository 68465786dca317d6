//! Result payload encoding
//!
//! Pages are returned as a JSON array of events. Zero-valued optional
//! fields are omitted and binary payloads are base64 encoded.

use crate::error::Result;
use crate::events::EventRecord;

/// Encode matched rows as a JSON array
pub fn encode<E: EventRecord>(rows: &[E]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(rows)?)
}

/// Decode a payload produced by [`encode`]
pub fn decode<E: EventRecord>(data: &[u8]) -> Result<Vec<E>> {
    Ok(serde_json::from_slice(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::events::{FsEvent, ProviderEvent};

    #[test]
    fn test_empty_page_is_an_empty_array() {
        assert_eq!(encode::<FsEvent>(&[]).unwrap(), b"[]");
    }

    #[test]
    fn test_decode_yields_source_rows() {
        let rows = vec![
            ProviderEvent {
                id: "p1".to_string(),
                timestamp: 1,
                object_data: Some(vec![0, 159, 146, 150]),
                ..Default::default()
            },
            ProviderEvent {
                id: "p2".to_string(),
                timestamp: 2,
                ..Default::default()
            },
        ];
        let data = encode(&rows).unwrap();
        assert_eq!(decode::<ProviderEvent>(&data).unwrap(), rows);
    }

    #[test]
    fn test_decode_error() {
        let err = decode::<FsEvent>(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
