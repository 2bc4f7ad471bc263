//! File share and file share snapshot entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::Result;
use crate::model::{FileShareSnapshotSpec, FileShareSpec};
use crate::query::QueryParams;

// =============================================================================
// File Shares
// =============================================================================

impl Directory {
    pub async fn create_fileshare(
        &self,
        ctx: &CallerContext,
        share: FileShareSpec,
    ) -> Result<FileShareSpec> {
        self.create(ctx, share).await
    }

    pub async fn get_fileshare(&self, ctx: &CallerContext, id: &str) -> Result<FileShareSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_fileshares(&self, ctx: &CallerContext) -> Result<Vec<FileShareSpec>> {
        self.list(ctx).await
    }

    pub async fn list_fileshares_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<FileShareSpec>> {
        self.list_filtered(ctx, params).await
    }

    pub async fn update_fileshare(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &FileShareSpec,
    ) -> Result<FileShareSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_fileshare(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<FileShareSpec>(ctx, id).await
    }
}

// =============================================================================
// File Share Snapshots
// =============================================================================

impl Directory {
    pub async fn create_fileshare_snapshot(
        &self,
        ctx: &CallerContext,
        snapshot: FileShareSnapshotSpec,
    ) -> Result<FileShareSnapshotSpec> {
        self.create(ctx, snapshot).await
    }

    pub async fn get_fileshare_snapshot(
        &self,
        ctx: &CallerContext,
        id: &str,
    ) -> Result<FileShareSnapshotSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_fileshare_snapshots(
        &self,
        ctx: &CallerContext,
    ) -> Result<Vec<FileShareSnapshotSpec>> {
        self.list(ctx).await
    }

    pub async fn list_fileshare_snapshots_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<FileShareSnapshotSpec>> {
        self.list_filtered(ctx, params).await
    }

    /// Snapshots taken of share `share_id`
    pub async fn list_fileshare_snapshots_by_share_id(
        &self,
        ctx: &CallerContext,
        share_id: &str,
    ) -> Result<Vec<FileShareSnapshotSpec>> {
        let mut snapshots = self.list_fileshare_snapshots(ctx).await?;
        snapshots.retain(|s| s.fileshare_id == share_id);
        Ok(snapshots)
    }

    pub async fn update_fileshare_snapshot(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &FileShareSnapshotSpec,
    ) -> Result<FileShareSnapshotSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_fileshare_snapshot(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<FileShareSnapshotSpec>(ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::CallerContext;
    use crate::directory::tests::directory;
    use crate::error::Error;
    use crate::model::{BaseModel, FileShareSnapshotSpec, FileShareSpec};
    use crate::query::params_from_pairs;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_fileshare_lifecycle() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        dir.create_fileshare(
            &ctx,
            FileShareSpec {
                base: BaseModel::new("fs1", "home"),
                size: 10,
                protocols: vec!["nfs".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let patch = FileShareSpec {
            export_locations: vec!["10.0.0.5:/home".into()],
            status: "available".into(),
            ..Default::default()
        };
        let updated = dir.update_fileshare(&ctx, "fs1", &patch).await.unwrap();
        assert_eq!(updated.export_locations, vec!["10.0.0.5:/home"]);
        assert_eq!(updated.protocols, vec!["nfs"]);

        let listed = dir
            .list_fileshares_with_filter(&ctx, &params_from_pairs([("status", "Available")]))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        dir.delete_fileshare(&ctx, "fs1").await.unwrap();
        assert_matches!(dir.get_fileshare(&ctx, "fs1").await, Err(Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_fileshare_snapshots_by_share() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        for (id, share) in [("s1", "fs1"), ("s2", "fs2"), ("s3", "fs1")] {
            dir.create_fileshare_snapshot(
                &ctx,
                FileShareSnapshotSpec {
                    base: BaseModel::new(id, id),
                    fileshare_id: share.into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let of_fs1 = dir
            .list_fileshare_snapshots_by_share_id(&ctx, "fs1")
            .await
            .unwrap();
        let ids: Vec<_> = of_fs1.iter().map(|s| s.base.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);

        let filtered = dir
            .list_fileshare_snapshots_with_filter(&ctx, &params_from_pairs([("fileshareId", "fs2")]))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }
}
