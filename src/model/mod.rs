//! Domain Model
//!
//! Typed resource records persisted by the directory. Every record embeds a
//! [`BaseModel`] and implements [`Resource`], which is all the generic
//! directory engine needs to address, authorize, merge and decode it.

pub mod attachment;
pub mod dock;
pub mod fileshare;
pub mod pool;
pub mod snapshot;
pub mod volume;

pub use attachment::{AttachmentSpec, ConnectionInfo, HostInfo};
pub use dock::DockSpec;
pub use fileshare::{FileShareSnapshotSpec, FileShareSpec};
pub use pool::{StoragePoolSpec, StorageType, DEFAULT_AVAILABILITY_ZONE};
pub use snapshot::VolumeSnapshotSpec;
pub use volume::{Identifier, VolumeGroupSpec, VolumeSpec};

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Resource Kinds
// =============================================================================

/// Every resource type the directory persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Dock,
    Pool,
    Volume,
    VolumeGroup,
    Attachment,
    VolumeSnapshot,
    FileShare,
    FileShareSnapshot,
}

impl ResourceKind {
    /// All kinds, in key-space order
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Dock,
        ResourceKind::Pool,
        ResourceKind::Volume,
        ResourceKind::VolumeGroup,
        ResourceKind::Attachment,
        ResourceKind::VolumeSnapshot,
        ResourceKind::FileShare,
        ResourceKind::FileShareSnapshot,
    ];

    /// Collection segment used in the key space
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Dock => "docks",
            ResourceKind::Pool => "pools",
            ResourceKind::Volume => "volumes",
            ResourceKind::VolumeGroup => "volumeGroups",
            ResourceKind::Attachment => "attachments",
            ResourceKind::VolumeSnapshot => "snapshots",
            ResourceKind::FileShare => "fileshares",
            ResourceKind::FileShareSnapshot => "fileshareSnapshots",
        }
    }

    /// Whether records of this kind are owned by a tenant
    pub fn is_tenant_scoped(&self) -> bool {
        !matches!(self, ResourceKind::Dock | ResourceKind::Pool)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Dock => write!(f, "dock"),
            ResourceKind::Pool => write!(f, "pool"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::VolumeGroup => write!(f, "volume_group"),
            ResourceKind::Attachment => write!(f, "attachment"),
            ResourceKind::VolumeSnapshot => write!(f, "volume_snapshot"),
            ResourceKind::FileShare => write!(f, "fileshare"),
            ResourceKind::FileShareSnapshot => write!(f, "fileshare_snapshot"),
        }
    }
}

// =============================================================================
// Base Model
// =============================================================================

/// Fields shared by every resource record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseModel {
    /// Globally unique identifier, assigned on create when empty
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Set exactly once, on create
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Set on every successful mutation
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BaseModel {
    /// Create a base with the given id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Merge the mutable base fields; id and creation time never change
    pub fn merge_from(&mut self, update: &BaseModel) {
        merge_text(&mut self.name, &update.name);
        merge_text(&mut self.description, &update.description);
    }
}

/// Current time at the precision stored in documents
pub fn now_stamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Stamp for a mutation of a record created at `created_at`
///
/// Always at least one stored tick after creation, so a record updated in
/// the second it was created still reads as updated after it.
pub fn mutation_stamp(created_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now_stamp();
    match created_at {
        Some(created) => now.max(created.trunc_subsecs(0) + chrono::Duration::seconds(1)),
        None => now,
    }
}

// =============================================================================
// Resource Trait
// =============================================================================

/// A typed record the directory can persist
pub trait Resource:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Kind of this record
    const KIND: ResourceKind;

    /// Shared base fields
    fn base(&self) -> &BaseModel;

    /// Shared base fields, mutably
    fn base_mut(&mut self) -> &mut BaseModel;

    /// Merge non-zero fields of `update` onto this record
    fn merge_from(&mut self, update: &Self);

    /// Owning tenant; empty for kinds that are not tenant scoped
    fn tenant_id(&self) -> &str {
        ""
    }

    /// Set the owning tenant; a no-op for kinds that are not tenant scoped
    fn set_tenant_id(&mut self, _tenant_id: &str) {}

    /// Apply defaults that are derived at read time, never persisted
    fn resolve_defaults(&mut self) {}

    /// Record identifier
    fn id(&self) -> &str {
        &self.base().id
    }
}

// =============================================================================
// Merge Helpers
// =============================================================================

pub(crate) fn merge_text(target: &mut String, update: &str) {
    if !update.is_empty() {
        *target = update.to_string();
    }
}

pub(crate) fn merge_number(target: &mut i64, update: i64) {
    if update != 0 {
        *target = update;
    }
}

/// `true` overwrites, `false` never clears
pub(crate) fn merge_flag(target: &mut bool, update: bool) {
    if update {
        *target = true;
    }
}

pub(crate) fn merge_map<V: Clone>(target: &mut BTreeMap<String, V>, update: &BTreeMap<String, V>) {
    for (key, value) in update {
        target.insert(key.clone(), value.clone());
    }
}

/// A non-empty update replaces the whole map
pub(crate) fn merge_replace_map<V: Clone>(
    target: &mut BTreeMap<String, V>,
    update: &BTreeMap<String, V>,
) {
    if !update.is_empty() {
        *target = update.clone();
    }
}

pub(crate) fn merge_list(target: &mut Vec<String>, update: &[String]) {
    if !update.is_empty() {
        *target = update.to_vec();
    }
}

// =============================================================================
// Timestamp Format
// =============================================================================

/// Second-resolution `YYYY-MM-DDTHH:MM:SS` timestamps (UTC)
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Stored timestamp layout
    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(text) => NaiveDateTime::parse_from_str(text, FORMAT)
                .map(|naive| Some(naive.and_utc()))
                .map_err(de::Error::custom),
        }
    }
}
