//! Volume group entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::Result;
use crate::model::VolumeGroupSpec;
use crate::query::QueryParams;

impl Directory {
    pub async fn create_volume_group(
        &self,
        ctx: &CallerContext,
        group: VolumeGroupSpec,
    ) -> Result<VolumeGroupSpec> {
        self.create(ctx, group).await
    }

    pub async fn get_volume_group(&self, ctx: &CallerContext, id: &str) -> Result<VolumeGroupSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_volume_groups(&self, ctx: &CallerContext) -> Result<Vec<VolumeGroupSpec>> {
        self.list(ctx).await
    }

    pub async fn list_volume_groups_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<VolumeGroupSpec>> {
        self.list_filtered(ctx, params).await
    }

    pub async fn update_volume_group(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &VolumeGroupSpec,
    ) -> Result<VolumeGroupSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_volume_group(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<VolumeGroupSpec>(ctx, id).await
    }
}
