//! Provisioning Driver Boundary
//!
//! Capability interface implemented by vendor drivers. The directory only
//! records what drivers report; it never calls into a data path itself.
//! Optional capabilities default to [`Error::NotImplemented`], which
//! callers pass through unchanged.

pub mod sample;

pub use sample::SampleDriver;

use crate::auth::CallerContext;
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::model::{
    BaseModel, ConnectionInfo, DockSpec, HostInfo, StoragePoolSpec, VolumeSnapshotSpec,
    VolumeSpec,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

// =============================================================================
// Operation Options
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateVolumeOpts {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Size in GiB
    pub size: i64,
    pub pool_id: String,
    pub pool_name: String,
    pub availability_zone: String,
    pub profile_id: String,
    /// Source snapshot, empty for a blank volume
    pub snapshot_id: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteVolumeOpts {
    pub id: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendVolumeOpts {
    pub id: String,
    /// New size in GiB
    pub size: i64,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateSnapshotOpts {
    pub id: String,
    pub name: String,
    pub description: String,
    pub volume_id: String,
    pub size: i64,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteSnapshotOpts {
    pub id: String,
    pub volume_id: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionOpts {
    /// Attachment id
    pub id: String,
    pub volume_id: String,
    pub host_info: HostInfo,
    /// e.g. `iscsi`
    pub access_protocol: String,
}

// =============================================================================
// Provisioning Driver Trait
// =============================================================================

/// Vendor driver capabilities
#[async_trait]
pub trait ProvisioningDriver: Send + Sync {
    /// Registered driver name
    fn name(&self) -> &str;

    /// Prepare the driver for use
    async fn setup(&self) -> Result<()>;

    /// Stop the driver and release its resources
    async fn unset(&self) -> Result<()>;

    async fn create_volume(&self, opts: &CreateVolumeOpts) -> Result<VolumeSpec>;

    async fn delete_volume(&self, opts: &DeleteVolumeOpts) -> Result<()>;

    async fn extend_volume(&self, _opts: &ExtendVolumeOpts) -> Result<VolumeSpec> {
        Err(Error::not_implemented("extend_volume"))
    }

    async fn create_snapshot(&self, _opts: &CreateSnapshotOpts) -> Result<VolumeSnapshotSpec> {
        Err(Error::not_implemented("create_snapshot"))
    }

    async fn delete_snapshot(&self, _opts: &DeleteSnapshotOpts) -> Result<()> {
        Err(Error::not_implemented("delete_snapshot"))
    }

    async fn initialize_connection(&self, _opts: &ConnectionOpts) -> Result<ConnectionInfo> {
        Err(Error::not_implemented("initialize_connection"))
    }

    async fn terminate_connection(&self, _opts: &ConnectionOpts) -> Result<()> {
        Err(Error::not_implemented("terminate_connection"))
    }

    /// Pools the driver's backend currently offers
    async fn list_pools(&self) -> Result<Vec<StoragePoolSpec>>;
}

/// Factory for registered drivers
pub struct DriverFactory;

impl DriverFactory {
    /// Names accepted by [`DriverFactory::create`]
    pub const REGISTERED: &'static [&'static str] = &["sample"];

    /// Create a driver by name
    pub fn create(name: &str) -> Result<Arc<dyn ProvisioningDriver>> {
        match name.to_lowercase().as_str() {
            "sample" => Ok(Arc::new(SampleDriver::new())),
            _ => Err(Error::Configuration(format!(
                "unknown provisioning driver: {}",
                name
            ))),
        }
    }
}

/// Run a driver's setup, reporting any failure as a persistence error
pub async fn setup_driver(driver: &dyn ProvisioningDriver) -> Result<()> {
    match driver.setup().await {
        Ok(()) => {
            info!("Driver {} is ready", driver.name());
            Ok(())
        }
        Err(e) => {
            error!("Driver {} failed to set up: {}", driver.name(), e);
            Err(Error::persistence("setup", "driver", driver.name(), e.to_string()))
        }
    }
}

/// Dock id for `driver_name` serving at `endpoint`, stable across restarts
pub fn dock_id(driver_name: &str, endpoint: &str) -> String {
    let seed = format!("{}@{}", driver_name, endpoint);
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
}

/// Record the dock running `driver` at `endpoint`
///
/// The dock id is derived from the driver name and endpoint, so a restart
/// refreshes the existing dock instead of adding another.
pub async fn register_dock(
    directory: &Directory,
    ctx: &CallerContext,
    driver: &dyn ProvisioningDriver,
    endpoint: &str,
) -> Result<DockSpec> {
    let id = dock_id(driver.name(), endpoint);
    let dock = DockSpec {
        base: BaseModel::new(id.as_str(), format!("{}-dock", driver.name())),
        status: "available".to_string(),
        driver_name: driver.name().to_string(),
        endpoint: endpoint.to_string(),
        ..Default::default()
    };
    let registered = match directory.get_dock(ctx, &id).await {
        Ok(_) => directory.update_dock(ctx, &id, &dock).await?,
        Err(e) if e.is_not_found() => directory.create_dock(ctx, dock).await?,
        Err(e) => return Err(e),
    };
    info!("Dock {} registered for driver {}", id, driver.name());
    Ok(registered)
}

/// Record the driver's pools under dock `dock_id`
///
/// New pools are created; known pools are updated with the reported values.
pub async fn sync_pools(
    directory: &Directory,
    ctx: &CallerContext,
    dock_id: &str,
    driver: &dyn ProvisioningDriver,
) -> Result<Vec<StoragePoolSpec>> {
    let reported = driver.list_pools().await?;
    let mut stored = Vec::with_capacity(reported.len());
    for mut pool in reported {
        pool.dock_id = dock_id.to_string();
        let id = pool.base.id.clone();
        let synced = match directory.get_pool(ctx, &id).await {
            Ok(_) => directory.update_pool(ctx, &id, &pool).await?,
            Err(e) if e.is_not_found() => directory.create_pool(ctx, pool).await?,
            Err(e) => return Err(e),
        };
        stored.push(synced);
    }
    info!(
        "Synced {} pools from driver {} for dock {}",
        stored.len(),
        driver.name(),
        dock_id
    );
    Ok(stored)
}
