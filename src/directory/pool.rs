//! Storage pool entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::Result;
use crate::model::StoragePoolSpec;
use crate::query::QueryParams;

impl Directory {
    pub async fn create_pool(
        &self,
        ctx: &CallerContext,
        pool: StoragePoolSpec,
    ) -> Result<StoragePoolSpec> {
        self.create(ctx, pool).await
    }

    pub async fn get_pool(&self, ctx: &CallerContext, id: &str) -> Result<StoragePoolSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_pools(&self, ctx: &CallerContext) -> Result<Vec<StoragePoolSpec>> {
        self.list(ctx).await
    }

    pub async fn list_pools_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<StoragePoolSpec>> {
        self.list_filtered(ctx, params).await
    }

    pub async fn update_pool(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &StoragePoolSpec,
    ) -> Result<StoragePoolSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_pool(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<StoragePoolSpec>(ctx, id).await
    }
}
