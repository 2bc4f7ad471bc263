//! Status updates
//!
//! The directory does not validate status transitions; it persists
//! whatever status the caller supplies.

use super::Directory;
use crate::auth::CallerContext;
use crate::error::Result;
use crate::model::{VolumeGroupSpec, VolumeSpec};

/// Record(s) whose status is being changed
#[derive(Debug, Clone, PartialEq)]
pub enum StatusTarget {
    Volume(VolumeSpec),
    VolumeGroup(VolumeGroupSpec),
    VolumeList(Vec<VolumeSpec>),
}

/// Records as stored after a status change
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    Volume(VolumeSpec),
    VolumeGroup(VolumeGroupSpec),
    VolumeList(Vec<VolumeSpec>),
}

impl Directory {
    /// Set `status` on the target and persist it through the family's update
    pub async fn update_status(
        &self,
        ctx: &CallerContext,
        target: StatusTarget,
        status: &str,
    ) -> Result<StatusOutcome> {
        match target {
            StatusTarget::Volume(mut volume) => {
                volume.status = status.to_string();
                let id = volume.base.id.clone();
                self.update_volume(ctx, &id, &volume)
                    .await
                    .map(StatusOutcome::Volume)
            }
            StatusTarget::VolumeGroup(mut group) => {
                group.status = status.to_string();
                let id = group.base.id.clone();
                self.update_volume_group(ctx, &id, &group)
                    .await
                    .map(StatusOutcome::VolumeGroup)
            }
            StatusTarget::VolumeList(mut volumes) => {
                for volume in &mut volumes {
                    volume.status = status.to_string();
                }
                self.volumes_to_update(ctx, &volumes)
                    .await
                    .map(StatusOutcome::VolumeList)
            }
        }
    }

    /// Fetch volume `id` and set its status
    pub async fn update_volume_status(
        &self,
        ctx: &CallerContext,
        id: &str,
        status: &str,
    ) -> Result<VolumeSpec> {
        let mut volume = self.get_volume(ctx, id).await?;
        volume.status = status.to_string();
        self.update_volume(ctx, id, &volume).await
    }

    /// Fetch volume group `id` and set its status
    pub async fn update_volume_group_status(
        &self,
        ctx: &CallerContext,
        id: &str,
        status: &str,
    ) -> Result<VolumeGroupSpec> {
        let mut group = self.get_volume_group(ctx, id).await?;
        group.status = status.to_string();
        self.update_volume_group(ctx, id, &group).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tests::directory;
    use crate::error::Error;
    use crate::model::BaseModel;
    use assert_matches::assert_matches;

    fn volume(id: &str) -> VolumeSpec {
        VolumeSpec {
            base: BaseModel::new(id, id),
            status: "available".into(),
            size: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_volume_status_to_error() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        let created = dir.create_volume(&ctx, volume("v1")).await.unwrap();
        assert!(created.base.updated_at.is_none());

        dir.update_status(&ctx, StatusTarget::Volume(created), "error")
            .await
            .unwrap();

        let fetched = dir.get_volume(&ctx, "v1").await.unwrap();
        assert_eq!(fetched.status, "error");
        assert!(fetched.base.updated_at > fetched.base.created_at);
    }

    #[tokio::test]
    async fn test_volume_list_status() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        let a = dir.create_volume(&ctx, volume("a")).await.unwrap();
        let b = dir.create_volume(&ctx, volume("b")).await.unwrap();

        let outcome = dir
            .update_status(&ctx, StatusTarget::VolumeList(vec![a, b]), "deleting")
            .await
            .unwrap();
        assert_matches!(outcome, StatusOutcome::VolumeList(ref list) if list.len() == 2);
        for volume in dir.list_volumes(&ctx).await.unwrap() {
            assert_eq!(volume.status, "deleting");
        }
    }

    #[tokio::test]
    async fn test_status_wrappers() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        dir.create_volume(&ctx, volume("v1")).await.unwrap();
        dir.create_volume_group(
            &ctx,
            VolumeGroupSpec {
                base: BaseModel::new("g1", "g1"),
                status: "creating".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let vol = dir.update_volume_status(&ctx, "v1", "in-use").await.unwrap();
        assert_eq!(vol.status, "in-use");
        let group = dir
            .update_volume_group_status(&ctx, "g1", "available")
            .await
            .unwrap();
        assert_eq!(group.status, "available");

        assert_matches!(
            dir.update_volume_status(&ctx, "missing", "error").await,
            Err(Error::NotFound { .. })
        );
    }
}
