//! Volume attachment records

use super::{merge_map, merge_text, BaseModel, Resource, ResourceKind};
use crate::query::{FieldTable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Host a volume is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostInfo {
    pub platform: String,
    pub os_type: String,
    pub host: String,
    pub ip: String,
    pub initiator: String,
}

impl HostInfo {
    fn is_empty(&self) -> bool {
        *self == HostInfo::default()
    }
}

/// Connection details returned by the driver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionInfo {
    /// e.g. `iscsi`, `rbd`, `nvmeof`
    pub driver_volume_type: String,
    pub connection_data: BTreeMap<String, serde_json::Value>,
}

/// Link between a volume and a host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub tenant_id: String,
    pub user_id: String,
    pub volume_id: String,
    pub status: String,
    pub mountpoint: String,
    pub host_info: HostInfo,
    pub connection_info: ConnectionInfo,
    pub access_protocol: String,
    pub attach_mode: String,
}

impl Resource for AttachmentSpec {
    const KIND: ResourceKind = ResourceKind::Attachment;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.user_id, &update.user_id);
        merge_text(&mut self.volume_id, &update.volume_id);
        merge_text(&mut self.status, &update.status);
        merge_text(&mut self.mountpoint, &update.mountpoint);
        if !update.host_info.is_empty() {
            self.host_info = update.host_info.clone();
        }
        merge_text(
            &mut self.connection_info.driver_volume_type,
            &update.connection_info.driver_volume_type,
        );
        merge_map(
            &mut self.connection_info.connection_data,
            &update.connection_info.connection_data,
        );
        merge_text(&mut self.access_protocol, &update.access_protocol);
        merge_text(&mut self.attach_mode, &update.attach_mode);
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: &str) {
        self.tenant_id = tenant_id.to_string();
    }
}

impl Queryable for AttachmentSpec {
    const SORTABLE_KEYS: &'static [&'static str] =
        &["ID", "VOLUMEID", "STATUS", "USERID", "TENANTID"];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<AttachmentSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |a| a.base.id.as_str())
                .text("name", |a| a.base.name.as_str())
                .text("tenantId", |a| a.tenant_id.as_str())
                .text("userId", |a| a.user_id.as_str())
                .text("volumeId", |a| a.volume_id.as_str())
                .text("status", |a| a.status.as_str())
                .text("mountpoint", |a| a.mountpoint.as_str())
                .text("accessProtocol", |a| a.access_protocol.as_str())
                .text("attachMode", |a| a.attach_mode.as_str())
                .build()
        })
    }
}
