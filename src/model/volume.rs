//! Volume and volume group records

use super::{
    merge_flag, merge_list, merge_map, merge_number, merge_replace_map, merge_text, BaseModel,
    Resource, ResourceKind,
};
use crate::query::{FieldTable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// External idempotency key for a volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identifier {
    pub durable_name: String,
    /// e.g. `NAA`, `EUI64`
    pub durable_name_format: String,
}

// =============================================================================
// Volume
// =============================================================================

/// A block volume carved from one pool and owned by one tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub tenant_id: String,
    pub user_id: String,
    pub status: String,
    /// Size in GiB
    pub size: i64,
    pub availability_zone: String,
    pub pool_id: String,
    pub profile_id: String,
    /// Owning volume group, empty when ungrouped
    pub group_id: String,
    /// Source snapshot, empty when created blank
    pub snapshot_id: String,
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    pub multi_attach: bool,
    pub replication_driver_data: BTreeMap<String, String>,
}

impl VolumeSpec {
    /// Durable name, if the volume carries one
    pub fn durable_name(&self) -> Option<&str> {
        self.identifier
            .as_ref()
            .map(|i| i.durable_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

impl Resource for VolumeSpec {
    const KIND: ResourceKind = ResourceKind::Volume;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.user_id, &update.user_id);
        merge_text(&mut self.status, &update.status);
        merge_number(&mut self.size, update.size);
        merge_text(&mut self.availability_zone, &update.availability_zone);
        merge_text(&mut self.pool_id, &update.pool_id);
        merge_text(&mut self.profile_id, &update.profile_id);
        merge_text(&mut self.group_id, &update.group_id);
        merge_text(&mut self.snapshot_id, &update.snapshot_id);
        merge_map(&mut self.metadata, &update.metadata);
        if update.identifier.is_some() {
            self.identifier = update.identifier.clone();
        }
        merge_flag(&mut self.multi_attach, update.multi_attach);
        merge_replace_map(
            &mut self.replication_driver_data,
            &update.replication_driver_data,
        );
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: &str) {
        self.tenant_id = tenant_id.to_string();
    }
}

impl Queryable for VolumeSpec {
    const SORTABLE_KEYS: &'static [&'static str] = &[
        "ID",
        "NAME",
        "STATUS",
        "AVAILABILITYZONE",
        "PROFILEID",
        "TENANTID",
        "SIZE",
        "POOLID",
        "DESCRIPTION",
        "GROUPID",
    ];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<VolumeSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |v| v.base.id.as_str())
                .text("name", |v| v.base.name.as_str())
                .text("description", |v| v.base.description.as_str())
                .text("tenantId", |v| v.tenant_id.as_str())
                .text("userId", |v| v.user_id.as_str())
                .text("status", |v| v.status.as_str())
                .int("size", |v| v.size)
                .text("availabilityZone", |v| v.availability_zone.as_str())
                .text("poolId", |v| v.pool_id.as_str())
                .text("profileId", |v| v.profile_id.as_str())
                .text("groupId", |v| v.group_id.as_str())
                .text("snapshotId", |v| v.snapshot_id.as_str())
                .build()
        })
    }
}

// =============================================================================
// Volume Group
// =============================================================================

/// A tenant-owned group of volumes sharing `groupId`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeGroupSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub tenant_id: String,
    pub user_id: String,
    pub status: String,
    pub availability_zone: String,
    pub pool_id: String,
    pub profiles: Vec<String>,
}

impl Resource for VolumeGroupSpec {
    const KIND: ResourceKind = ResourceKind::VolumeGroup;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.user_id, &update.user_id);
        merge_text(&mut self.status, &update.status);
        merge_text(&mut self.availability_zone, &update.availability_zone);
        merge_text(&mut self.pool_id, &update.pool_id);
        merge_list(&mut self.profiles, &update.profiles);
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: &str) {
        self.tenant_id = tenant_id.to_string();
    }
}

impl Queryable for VolumeGroupSpec {
    const SORTABLE_KEYS: &'static [&'static str] =
        &["ID", "NAME", "STATUS", "AVAILABILITYZONE", "POOLID", "TENANTID"];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<VolumeGroupSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |g| g.base.id.as_str())
                .text("name", |g| g.base.name.as_str())
                .text("description", |g| g.base.description.as_str())
                .text("tenantId", |g| g.tenant_id.as_str())
                .text("userId", |g| g.user_id.as_str())
                .text("status", |g| g.status.as_str())
                .text("availabilityZone", |g| g.availability_zone.as_str())
                .text("poolId", |g| g.pool_id.as_str())
                .build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume() -> VolumeSpec {
        let mut metadata = BTreeMap::new();
        metadata.insert("tier".to_string(), "gold".to_string());
        VolumeSpec {
            base: BaseModel::new("vol-1", "data"),
            tenant_id: "tenant-a".into(),
            status: "available".into(),
            size: 10,
            pool_id: "pool-1".into(),
            metadata,
            identifier: Some(Identifier {
                durable_name: "600a0b8000".into(),
                durable_name_format: "NAA".into(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_volume_document_shape() {
        let vol = volume();
        let json = serde_json::to_value(&vol).unwrap();
        assert_eq!(json["tenantId"], "tenant-a");
        assert_eq!(json["identifier"]["durableName"], "600a0b8000");
        assert_eq!(json["multiAttach"], false);

        let back: VolumeSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, vol);
        assert_eq!(back.durable_name(), Some("600a0b8000"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let vol: VolumeSpec =
            serde_json::from_str(r#"{"id":"v","size":3,"futureField":{"x":1}}"#).unwrap();
        assert_eq!(vol.base.id, "v");
        assert_eq!(vol.size, 3);
        assert!(vol.identifier.is_none());
    }

    #[test]
    fn test_volume_merge_rules() {
        let mut stored = volume();
        stored.multi_attach = true;

        let mut update = VolumeSpec {
            tenant_id: "tenant-b".into(),
            size: 20,
            ..Default::default()
        };
        update
            .metadata
            .insert("owner".to_string(), "ops".to_string());
        stored.merge_from(&update);

        assert_eq!(stored.size, 20);
        assert_eq!(stored.tenant_id, "tenant-a");
        assert!(stored.multi_attach);
        assert_eq!(stored.metadata.len(), 2);
        assert_eq!(stored.status, "available");
        assert!(stored.identifier.is_some());
    }

    #[test]
    fn test_replication_data_is_replaced_not_merged() {
        let mut stored = volume();
        stored
            .replication_driver_data
            .insert("secondaryLun".to_string(), "7".to_string());
        stored
            .replication_driver_data
            .insert("targetPortal".to_string(), "10.0.0.1".to_string());

        stored.merge_from(&VolumeSpec::default());
        assert_eq!(stored.replication_driver_data.len(), 2);

        let mut update = VolumeSpec::default();
        update
            .replication_driver_data
            .insert("targetPortal".to_string(), "10.0.0.2".to_string());
        stored.merge_from(&update);

        assert_eq!(stored.replication_driver_data, update.replication_driver_data);
    }

    #[test]
    fn test_volume_group_round_trip() {
        let group = VolumeGroupSpec {
            base: BaseModel::new("grp-1", "db"),
            tenant_id: "tenant-a".into(),
            profiles: vec!["p1".into(), "p2".into()],
            ..Default::default()
        };
        let bytes = serde_json::to_vec(&group).unwrap();
        let back: VolumeGroupSpec = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, group);
    }
}
