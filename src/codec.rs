//! Document Codec
//!
//! Typed records are stored as JSON objects with camelCase field names.
//! Decoding ignores unknown fields and fills missing ones with zero values,
//! so documents written by older or newer builds stay readable.

use crate::error::{Error, Result};
use crate::model::Resource;
use bytes::Bytes;
use serde::Serialize;

/// Encode a record as a document
pub fn encode<T: Serialize>(record: &T) -> Result<Bytes> {
    serde_json::to_vec(record)
        .map(Bytes::from)
        .map_err(|e| Error::Internal(format!("failed to encode document: {}", e)))
}

/// Decode a stored document into a record of type `T`
///
/// Read-time defaults are not applied here; the directory applies them
/// after decoding.
pub fn decode<T: Resource>(payload: &[u8]) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_slice(payload).map_err(|e| malformed::<T>(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed::<T>("document is not an object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| malformed::<T>(e.to_string()))
}

/// Decode every document, failing on the first malformed one
pub fn decode_all<T: Resource>(payloads: &[Bytes]) -> Result<Vec<T>> {
    payloads.iter().map(|p| decode::<T>(p)).collect()
}

fn malformed<T: Resource>(reason: String) -> Error {
    Error::MalformedData {
        kind: T::KIND.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        now_stamp, AttachmentSpec, BaseModel, DockSpec, FileShareSnapshotSpec, FileShareSpec,
        StoragePoolSpec, VolumeGroupSpec, VolumeSnapshotSpec, VolumeSpec,
    };
    use assert_matches::assert_matches;

    fn round_trip<T: Resource + PartialEq>(record: T) {
        let bytes = encode(&record).unwrap();
        let back: T = decode(&bytes).unwrap();
        assert_eq!(back, record, "{} did not survive a round trip", T::KIND);
    }

    fn stamped(id: &str) -> BaseModel {
        let mut base = BaseModel::new(id, format!("{id}-name"));
        base.description = "described".into();
        base.created_at = Some(now_stamp());
        base.updated_at = Some(now_stamp());
        base
    }

    #[test]
    fn test_every_kind_round_trips() {
        round_trip(DockSpec {
            base: stamped("dock"),
            endpoint: "127.0.0.1:50050".into(),
            ..Default::default()
        });
        round_trip(StoragePoolSpec {
            base: stamped("pool"),
            total_capacity: 100,
            ..Default::default()
        });
        round_trip(VolumeSpec {
            base: stamped("vol"),
            tenant_id: "t1".into(),
            size: 1,
            multi_attach: true,
            ..Default::default()
        });
        round_trip(VolumeGroupSpec {
            base: stamped("grp"),
            tenant_id: "t1".into(),
            ..Default::default()
        });
        round_trip(AttachmentSpec {
            base: stamped("att"),
            volume_id: "vol".into(),
            ..Default::default()
        });
        round_trip(VolumeSnapshotSpec {
            base: stamped("snap"),
            volume_id: "vol".into(),
            ..Default::default()
        });
        round_trip(FileShareSpec {
            base: stamped("fs"),
            protocols: vec!["nfs".into()],
            ..Default::default()
        });
        round_trip(FileShareSnapshotSpec {
            base: stamped("fss"),
            fileshare_id: "fs".into(),
            ..Default::default()
        });
    }

    #[test]
    fn test_missing_fields_decode_to_zero_values() {
        let vol: VolumeSpec = decode(br#"{"id":"v1"}"#).unwrap();
        assert_eq!(vol.base.id, "v1");
        assert_eq!(vol.size, 0);
        assert!(vol.base.created_at.is_none());
    }

    #[test]
    fn test_malformed_payloads() {
        assert_matches!(
            decode::<VolumeSpec>(b"not json"),
            Err(Error::MalformedData { ref kind, .. }) if kind == "volume"
        );
        assert_matches!(
            decode::<DockSpec>(b"[1,2]"),
            Err(Error::MalformedData { .. })
        );
        assert_matches!(
            decode::<VolumeSpec>(br#"{"size":"big"}"#),
            Err(Error::MalformedData { .. })
        );
    }

    #[test]
    fn test_decode_all_aborts_on_bad_document() {
        let payloads = vec![
            Bytes::from_static(br#"{"id":"a"}"#),
            Bytes::from_static(b"{"),
            Bytes::from_static(br#"{"id":"c"}"#),
        ];
        assert_matches!(
            decode_all::<DockSpec>(&payloads),
            Err(Error::MalformedData { .. })
        );
    }
}
