//! Volume snapshot records

use super::{merge_map, merge_text, BaseModel, Resource, ResourceKind};
use crate::query::{FieldTable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Point-in-time copy of a volume
///
/// Only the name, description, status and metadata change after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeSnapshotSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub tenant_id: String,
    pub user_id: String,
    pub volume_id: String,
    pub size: i64,
    pub status: String,
    pub profile_id: String,
    pub metadata: BTreeMap<String, String>,
}

impl Resource for VolumeSnapshotSpec {
    const KIND: ResourceKind = ResourceKind::VolumeSnapshot;

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

impl Queryable for VolumeSnapshotSpec {
    const SORTABLE_KEYS: &'static [&'static str] =
        &["ID", "NAME", "VOLUMEID", "STATUS", "USERID", "TENANTID", "SIZE"];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<VolumeSnapshotSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |s| s.base.id.as_str())
                .text("name", |s| s.base.name.as_str())
                .text("description", |s| s.base.description.as_str())
                .text("tenantId", |s| s.tenant_id.as_str())
                .text("userId", |s| s.user_id.as_str())
                .text("volumeId", |s| s.volume_id.as_str())
                .int("size", |s| s.size)
                .text("status", |s| s.status.as_str())
                .text("profileId", |s| s.profile_id.as_str())
                .build()
        })
    }
}
