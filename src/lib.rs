//! Resource Directory - Storage Control Plane Metadata Store
//!
//! Persists and queries the control plane's resource records (docks,
//! pools, volumes, volume groups, attachments, snapshots, file shares and
//! file-share snapshots) in a hierarchical key-value store, with tenant
//! isolation and a uniform filter/sort/paginate pipeline for list calls.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                  REST edge (axum) / provisioning drivers              │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┴──────────────────────────────────────┐
//! │                          Resource Directory                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌──────────┐  │
//! │  │ Auth gate    │  │ Key space    │  │ Codec (JSON) │  │ Query    │  │
//! │  │ tenant/admin │  │ /v1beta/...  │  │              │  │ engine   │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └──────────┘  │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┴──────────────────────────────────────┐
//! │                    KV store adapters (etcd, memory)                   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`directory`]: CRUD engine and per-family operations
//! - [`model`]: Resource record types
//! - [`query`]: Filter, sort and pagination over list results
//! - [`store`]: Key space and KV store adapters
//! - [`driver`]: Provisioning driver boundary
//! - [`api`]: REST edge
//! - [`error`]: Error types and handling

pub mod api;
pub mod auth;
pub mod codec;
pub mod config;
pub mod directory;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod model;
pub mod query;
pub mod store;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig, RestRouter};
pub use auth::CallerContext;
pub use config::DirectoryConfig;
pub use directory::{Directory, StatusOutcome, StatusTarget};
pub use driver::{DriverFactory, ProvisioningDriver};
pub use error::{Error, Result};
pub use metrics::DirectoryMetrics;
pub use model::{
    AttachmentSpec, BaseModel, DockSpec, FileShareSnapshotSpec, FileShareSpec, Resource,
    ResourceKind, StoragePoolSpec, VolumeGroupSpec, VolumeSnapshotSpec, VolumeSpec,
};
pub use query::{QueryParams, Queryable};
pub use store::{KeySpace, KvStore, MemoryStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
