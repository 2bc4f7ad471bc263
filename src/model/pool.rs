//! Storage pool records

use super::{merge_map, merge_number, merge_text, BaseModel, Resource, ResourceKind};
use crate::query::{FieldTable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Zone reported for pools that never declared one
pub const DEFAULT_AVAILABILITY_ZONE: &str = "default";

/// Kind of storage a pool carves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Block,
    File,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Block => "block",
            StorageType::File => "file",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A capacity-bearing unit reported by one dock
///
/// Capacities are in GiB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoragePoolSpec {
    #[serde(flatten)]
    pub base: BaseModel,
    pub status: String,
    pub storage_type: StorageType,
    /// Empty means [`DEFAULT_AVAILABILITY_ZONE`], resolved on read
    pub availability_zone: String,
    pub dock_id: String,
    pub total_capacity: i64,
    pub free_capacity: i64,
    pub consumed_capacity: i64,
    /// Driver-specific attributes, stored verbatim
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Resource for StoragePoolSpec {
    const KIND: ResourceKind = ResourceKind::Pool;

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }

    fn merge_from(&mut self, update: &Self) {
        self.base.merge_from(&update.base);
        merge_text(&mut self.status, &update.status);
        // Block is the zero value and never overwrites
        if update.storage_type != StorageType::default() {
            self.storage_type = update.storage_type;
        }
        merge_text(&mut self.availability_zone, &update.availability_zone);
        merge_text(&mut self.dock_id, &update.dock_id);
        merge_number(&mut self.total_capacity, update.total_capacity);
        merge_number(&mut self.free_capacity, update.free_capacity);
        merge_number(&mut self.consumed_capacity, update.consumed_capacity);
        merge_map(&mut self.extras, &update.extras);
    }

    fn resolve_defaults(&mut self) {
        if self.availability_zone.is_empty() {
            self.availability_zone = DEFAULT_AVAILABILITY_ZONE.to_string();
        }
    }
}

impl Queryable for StoragePoolSpec {
    const SORTABLE_KEYS: &'static [&'static str] =
        &["ID", "NAME", "STATUS", "AVAILABILITYZONE", "DOCKID"];

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<StoragePoolSpec>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Self>::builder()
                .text("id", |p| p.base.id.as_str())
                .text("name", |p| p.base.name.as_str())
                .text("description", |p| p.base.description.as_str())
                .text("status", |p| p.status.as_str())
                .text("storageType", |p| p.storage_type.as_str())
                .text("availabilityZone", |p| p.availability_zone.as_str())
                .text("dockId", |p| p.dock_id.as_str())
                .int("totalCapacity", |p| p.total_capacity)
                .int("freeCapacity", |p| p.free_capacity)
                .int("consumedCapacity", |p| p.consumed_capacity)
                .build()
        })
    }
}
