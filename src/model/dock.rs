//! Dock records

use super::{merge_map, merge_text, BaseModel, Resource, ResourceKind};
use crate::query::{FieldTable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A provisioning worker that reports storage pools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DockSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub status: String,
    pub storage_type: String,
    /// Address the dock listens on
    pub endpoint: String,
    /// Backend driver the dock runs
    pub driver_name: String,
    pub node_id: String,
    #[serde(rename = "type")]
    pub dock_type: String,
    pub metadata: BTreeMap<String, String>,
}

impl Resource for DockSpec {
    const KIND: ResourceKind = ResourceKind::Dock;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.status, &update.status);
        merge_text(&mut self.storage_type, &update.storage_type);
        merge_text(&mut self.endpoint, &update.endpoint);
        merge_text(&mut self.driver_name, &update.driver_name);
        merge_text(&mut self.node_id, &update.node_id);
        merge_text(&mut self.dock_type, &update.dock_type);
        merge_map(&mut self.metadata, &update.metadata);
    }
}

impl Queryable for DockSpec {
    const SORTABLE_KEYS: &'static [&'static str] =
        &["ID", "NAME", "STATUS", "ENDPOINT", "DRIVERNAME", "DESCRIPTION"];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<DockSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |d| d.base.id.as_str())
                .text("name", |d| d.base.name.as_str())
                .text("description", |d| d.base.description.as_str())
                .text("status", |d| d.status.as_str())
                .text("storageType", |d| d.storage_type.as_str())
                .text("endpoint", |d| d.endpoint.as_str())
                .text("driverName", |d| d.driver_name.as_str())
                .text("nodeId", |d| d.node_id.as_str())
                .text("type", |d| d.dock_type.as_str())
                .build()
        })
    }
}
