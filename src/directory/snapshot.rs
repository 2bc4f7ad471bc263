//! Volume snapshot entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::Result;
use crate::model::VolumeSnapshotSpec;
use crate::query::QueryParams;

impl Directory {
    pub async fn create_volume_snapshot(
        &self,
        ctx: &CallerContext,
        snapshot: VolumeSnapshotSpec,
    ) -> Result<VolumeSnapshotSpec> {
        self.create(ctx, snapshot).await
    }

    pub async fn get_volume_snapshot(
        &self,
        ctx: &CallerContext,
        id: &str,
    ) -> Result<VolumeSnapshotSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_volume_snapshots(
        &self,
        ctx: &CallerContext,
    ) -> Result<Vec<VolumeSnapshotSpec>> {
        self.list(ctx).await
    }

    pub async fn list_volume_snapshots_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<VolumeSnapshotSpec>> {
        self.list_filtered(ctx, params).await
    }

    /// Snapshots taken of volume `volume_id`
    pub async fn list_snapshots_by_volume_id(
        &self,
        ctx: &CallerContext,
        volume_id: &str,
    ) -> Result<Vec<VolumeSnapshotSpec>> {
        let mut snapshots = self.list_volume_snapshots(ctx).await?;
        snapshots.retain(|s| s.volume_id == volume_id);
        Ok(snapshots)
    }

    /// Only name, description, status and metadata can change
    pub async fn update_volume_snapshot(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &VolumeSnapshotSpec,
    ) -> Result<VolumeSnapshotSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_volume_snapshot(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<VolumeSnapshotSpec>(ctx, id).await
    }
}
