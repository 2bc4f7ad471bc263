//! Sample Driver
//!
//! In-memory driver that behaves like a small block array: two fixed pools,
//! volumes and snapshots tracked in maps, iSCSI-style connection data.

use super::{
    ConnectionOpts, CreateSnapshotOpts, CreateVolumeOpts, DeleteSnapshotOpts, DeleteVolumeOpts,
    ExtendVolumeOpts, ProvisioningDriver,
};
use crate::error::{Error, Result};
use crate::model::{
    BaseModel, ConnectionInfo, StoragePoolSpec, StorageType, VolumeSnapshotSpec, VolumeSpec,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

const POOL_CAPACITY_GIB: i64 = 100;

/// In-memory [`ProvisioningDriver`]
pub struct SampleDriver {
    volumes: RwLock<BTreeMap<String, VolumeSpec>>,
    snapshots: RwLock<BTreeMap<String, VolumeSnapshotSpec>>,
    available: AtomicBool,
}

impl SampleDriver {
    pub fn new() -> Self {
        Self {
            volumes: RwLock::new(BTreeMap::new()),
            snapshots: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going away (for testing)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Internal("sample backend unavailable".to_string()))
        }
    }

    fn consumed(&self) -> i64 {
        self.volumes.read().values().map(|v| v.size).sum()
    }
}

impl Default for SampleDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id(requested: &str) -> String {
    if requested.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        requested.to_string()
    }
}

#[async_trait]
impl ProvisioningDriver for SampleDriver {
    fn name(&self) -> &str {
        "sample"
    }

    async fn setup(&self) -> Result<()> {
        self.check_available()?;
        info!("Sample driver set up");
        Ok(())
    }

    async fn unset(&self) -> Result<()> {
        self.volumes.write().clear();
        self.snapshots.write().clear();
        Ok(())
    }

    async fn create_volume(&self, opts: &CreateVolumeOpts) -> Result<VolumeSpec> {
        self.check_available()?;
        if opts.size <= 0 {
            return Err(Error::InvalidArgument(format!(
                "volume size must be positive, got {}",
                opts.size
            )));
        }
        if !opts.snapshot_id.is_empty() && !self.snapshots.read().contains_key(&opts.snapshot_id) {
            return Err(Error::not_found("volume_snapshot", opts.snapshot_id.as_str()));
        }

        let mut base = BaseModel::new(new_id(&opts.id), opts.name.as_str());
        base.description = opts.description.clone();
        let volume = VolumeSpec {
            base,
            size: opts.size,
            status: "available".to_string(),
            pool_id: opts.pool_id.clone(),
            availability_zone: opts.availability_zone.clone(),
            profile_id: opts.profile_id.clone(),
            snapshot_id: opts.snapshot_id.clone(),
            metadata: opts.metadata.clone(),
            ..Default::default()
        };
        self.volumes
            .write()
            .insert(volume.base.id.clone(), volume.clone());
        debug!("Sample driver created volume {}", volume.base.id);
        Ok(volume)
    }

    async fn delete_volume(&self, opts: &DeleteVolumeOpts) -> Result<()> {
        self.check_available()?;
        match self.volumes.write().remove(&opts.id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found("volume", opts.id.as_str())),
        }
    }

    async fn extend_volume(&self, opts: &ExtendVolumeOpts) -> Result<VolumeSpec> {
        self.check_available()?;
        let mut volumes = self.volumes.write();
        let volume = volumes
            .get_mut(&opts.id)
            .ok_or_else(|| Error::not_found("volume", opts.id.as_str()))?;
        if opts.size <= volume.size {
            return Err(Error::InvalidArgument(format!(
                "new size {} must exceed current size {}",
                opts.size, volume.size
            )));
        }
        volume.size = opts.size;
        Ok(volume.clone())
    }

    async fn create_snapshot(&self, opts: &CreateSnapshotOpts) -> Result<VolumeSnapshotSpec> {
        self.check_available()?;
        let size = self
            .volumes
            .read()
            .get(&opts.volume_id)
            .map(|v| v.size)
            .ok_or_else(|| Error::not_found("volume", opts.volume_id.as_str()))?;

        let mut base = BaseModel::new(new_id(&opts.id), opts.name.as_str());
        base.description = opts.description.clone();
        let snapshot = VolumeSnapshotSpec {
            base,
            volume_id: opts.volume_id.clone(),
            size,
            status: "available".to_string(),
            metadata: opts.metadata.clone(),
            ..Default::default()
        };
        self.snapshots
            .write()
            .insert(snapshot.base.id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn delete_snapshot(&self, opts: &DeleteSnapshotOpts) -> Result<()> {
        self.check_available()?;
        match self.snapshots.write().remove(&opts.id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found("volume_snapshot", opts.id.as_str())),
        }
    }

    async fn initialize_connection(&self, opts: &ConnectionOpts) -> Result<ConnectionInfo> {
        self.check_available()?;
        if !self.volumes.read().contains_key(&opts.volume_id) {
            return Err(Error::not_found("volume", opts.volume_id.as_str()));
        }
        let protocol = if opts.access_protocol.is_empty() {
            "iscsi"
        } else {
            opts.access_protocol.as_str()
        };

        let mut connection_data = BTreeMap::new();
        connection_data.insert("targetDiscovered".to_string(), json!(true));
        connection_data.insert("volumeId".to_string(), json!(opts.volume_id));
        connection_data.insert("hostName".to_string(), json!(opts.host_info.host));
        connection_data.insert("initiator".to_string(), json!(opts.host_info.initiator));
        connection_data.insert(
            "targetIQN".to_string(),
            json!([format!("iqn.2017-10.io.sample:{}", opts.volume_id)]),
        );
        connection_data.insert(
            "targetPortal".to_string(),
            json!([format!("{}:3260", opts.host_info.ip)]),
        );
        connection_data.insert("targetLun".to_string(), json!(1));

        Ok(ConnectionInfo {
            driver_volume_type: protocol.to_string(),
            connection_data,
        })
    }

    async fn terminate_connection(&self, opts: &ConnectionOpts) -> Result<()> {
        self.check_available()?;
        debug!("Sample driver detached volume {}", opts.volume_id);
        Ok(())
    }

    async fn list_pools(&self) -> Result<Vec<StoragePoolSpec>> {
        self.check_available()?;
        let consumed = self.consumed();
        let pools = [
            ("084bf71e-a102-11e7-88a8-e31fe6d52248", "sample-pool-01", StorageType::Block),
            ("a5965ebe-dg2c-11e7-8831-7f9b1a1f3c0e", "sample-pool-02", StorageType::File),
        ]
        .into_iter()
        .map(|(id, name, storage_type)| {
            let used = if storage_type == StorageType::Block {
                consumed
            } else {
                0
            };
            StoragePoolSpec {
                base: BaseModel::new(id, name),
                status: "available".to_string(),
                storage_type,
                total_capacity: POOL_CAPACITY_GIB,
                free_capacity: POOL_CAPACITY_GIB - used,
                consumed_capacity: used,
                ..Default::default()
            }
        })
        .collect();
        Ok(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn create_opts(size: i64) -> CreateVolumeOpts {
        CreateVolumeOpts {
            name: "data".into(),
            size,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_volume_lifecycle() {
        let driver = SampleDriver::new();
        let vol = driver.create_volume(&create_opts(10)).await.unwrap();
        assert!(!vol.base.id.is_empty());
        assert_eq!(vol.status, "available");

        let extended = driver
            .extend_volume(&ExtendVolumeOpts {
                id: vol.base.id.clone(),
                size: 20,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(extended.size, 20);

        let pools = driver.list_pools().await.unwrap();
        assert_eq!(pools[0].consumed_capacity, 20);
        assert_eq!(pools[0].free_capacity, POOL_CAPACITY_GIB - 20);

        driver
            .delete_volume(&DeleteVolumeOpts {
                id: vol.base.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_matches!(
            driver
                .delete_volume(&DeleteVolumeOpts {
                    id: vol.base.id,
                    ..Default::default()
                })
                .await,
            Err(Error::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_invalid_sizes() {
        let driver = SampleDriver::new();
        assert_matches!(
            driver.create_volume(&create_opts(0)).await,
            Err(Error::InvalidArgument(_))
        );
        let vol = driver.create_volume(&create_opts(5)).await.unwrap();
        assert_matches!(
            driver
                .extend_volume(&ExtendVolumeOpts {
                    id: vol.base.id,
                    size: 5,
                    ..Default::default()
                })
                .await,
            Err(Error::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn test_snapshot_and_connection() {
        let driver = SampleDriver::new();
        let vol = driver.create_volume(&create_opts(4)).await.unwrap();

        let snap = driver
            .create_snapshot(&CreateSnapshotOpts {
                volume_id: vol.base.id.clone(),
                name: "snap".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(snap.size, 4);

        let restored = driver
            .create_volume(&CreateVolumeOpts {
                snapshot_id: snap.base.id.clone(),
                ..create_opts(4)
            })
            .await
            .unwrap();
        assert_eq!(restored.snapshot_id, snap.base.id);

        let mut opts = ConnectionOpts {
            volume_id: vol.base.id.clone(),
            ..Default::default()
        };
        opts.host_info.ip = "10.0.0.7".into();
        let info = driver.initialize_connection(&opts).await.unwrap();
        assert_eq!(info.driver_volume_type, "iscsi");
        assert_eq!(info.connection_data["targetPortal"][0], "10.0.0.7:3260");
        driver.terminate_connection(&opts).await.unwrap();
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let driver = SampleDriver::new();
        driver.set_available(false);
        tokio_test::assert_err!(driver.setup().await);
        tokio_test::assert_err!(driver.list_pools().await);
        driver.set_available(true);
        tokio_test::assert_ok!(driver.setup().await);
    }
}
