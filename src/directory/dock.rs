//! Dock entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::{Error, Result};
use crate::model::{DockSpec, StoragePoolSpec};
use crate::query::QueryParams;

impl Directory {
    pub async fn create_dock(&self, ctx: &CallerContext, dock: DockSpec) -> Result<DockSpec> {
        self.create(ctx, dock).await
    }

    pub async fn get_dock(&self, ctx: &CallerContext, id: &str) -> Result<DockSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_docks(&self, ctx: &CallerContext) -> Result<Vec<DockSpec>> {
        self.list(ctx).await
    }

    pub async fn list_docks_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<DockSpec>> {
        self.list_filtered(ctx, params).await
    }

    pub async fn update_dock(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &DockSpec,
    ) -> Result<DockSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_dock(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<DockSpec>(ctx, id).await
    }

    /// Dock that reported pool `pool_id`
    pub async fn get_dock_by_pool_id(&self, ctx: &CallerContext, pool_id: &str) -> Result<DockSpec> {
        let pool: StoragePoolSpec = self.get(ctx, pool_id).await?;
        self.list_docks(ctx)
            .await?
            .into_iter()
            .find(|dock| dock.base.id == pool.dock_id)
            .ok_or_else(|| Error::not_found("dock", pool.dock_id.clone()))
    }
}
