//! File share and file share snapshot records

use super::{merge_list, merge_map, merge_number, merge_text, BaseModel, Resource, ResourceKind};
use crate::query::{FieldTable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

// =============================================================================
// File Share
// =============================================================================

/// A network file share carved from one pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileShareSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub tenant_id: String,
    pub user_id: String,
    /// Size in GiB
    pub size: i64,
    pub availability_zone: String,
    pub status: String,
    pub pool_id: String,
    pub profile_id: String,
    pub snapshot_id: String,
    /// e.g. `nfs`, `cifs`
    pub protocols: Vec<String>,
    pub export_locations: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Resource for FileShareSpec {
    const KIND: ResourceKind = ResourceKind::FileShare;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.user_id, &update.user_id);
        merge_number(&mut self.size, update.size);
        merge_text(&mut self.availability_zone, &update.availability_zone);
        merge_text(&mut self.status, &update.status);
        merge_text(&mut self.pool_id, &update.pool_id);
        merge_text(&mut self.profile_id, &update.profile_id);
        merge_text(&mut self.snapshot_id, &update.snapshot_id);
        merge_list(&mut self.protocols, &update.protocols);
        merge_list(&mut self.export_locations, &update.export_locations);
        merge_map(&mut self.metadata, &update.metadata);
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: &str) {
        self.tenant_id = tenant_id.to_string();
    }
}

impl Queryable for FileShareSpec {
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
    ];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<FileShareSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |f| f.base.id.as_str())
                .text("name", |f| f.base.name.as_str())
                .text("description", |f| f.base.description.as_str())
                .text("tenantId", |f| f.tenant_id.as_str())
                .text("userId", |f| f.user_id.as_str())
                .int("size", |f| f.size)
                .text("availabilityZone", |f| f.availability_zone.as_str())
                .text("status", |f| f.status.as_str())
                .text("poolId", |f| f.pool_id.as_str())
                .text("profileId", |f| f.profile_id.as_str())
                .text("snapshotId", |f| f.snapshot_id.as_str())
                .build()
        })
    }
}

// =============================================================================
// File Share Snapshot
// =============================================================================

/// Point-in-time copy of a file share
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileShareSnapshotSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub tenant_id: String,
    pub user_id: String,
    #[serde(rename = "fileshareId")]
    pub fileshare_id: String,
    pub size: i64,
    pub status: String,
    pub profile_id: String,
    pub metadata: BTreeMap<String, String>,
}

impl Resource for FileShareSnapshotSpec {
    const KIND: ResourceKind = ResourceKind::FileShareSnapshot;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.status, &update.status);
        merge_map(&mut self.metadata, &update.metadata);
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: &str) {
        self.tenant_id = tenant_id.to_string();
    }
}

impl Queryable for FileShareSnapshotSpec {
    const SORTABLE_KEYS: &'static [&'static str] =
        &["ID", "NAME", "FILESHAREID", "STATUS", "USERID", "TENANTID", "SIZE"];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<FileShareSnapshotSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |s| s.base.id.as_str())
                .text("name", |s| s.base.name.as_str())
                .text("description", |s| s.base.description.as_str())
                .text("tenantId", |s| s.tenant_id.as_str())
                .text("userId", |s| s.user_id.as_str())
                .text("fileshareId", |s| s.fileshare_id.as_str())
                .int("size", |s| s.size)
                .text("status", |s| s.status.as_str())
                .text("profileId", |s| s.profile_id.as_str())
                .build()
        })
    }
}
