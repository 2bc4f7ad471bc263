//! Attachment entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::Result;
use crate::model::AttachmentSpec;
use crate::query::QueryParams;

impl Directory {
    pub async fn create_attachment(
        &self,
        ctx: &CallerContext,
        attachment: AttachmentSpec,
    ) -> Result<AttachmentSpec> {
        self.create(ctx, attachment).await
    }

    pub async fn get_attachment(&self, ctx: &CallerContext, id: &str) -> Result<AttachmentSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_attachments(&self, ctx: &CallerContext) -> Result<Vec<AttachmentSpec>> {
        self.list(ctx).await
    }

    pub async fn list_attachments_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<AttachmentSpec>> {
        self.list_filtered(ctx, params).await
    }

    /// Attachments of volume `volume_id`
    pub async fn list_attachments_by_volume_id(
        &self,
        ctx: &CallerContext,
        volume_id: &str,
    ) -> Result<Vec<AttachmentSpec>> {
        let mut attachments = self.list_attachments(ctx).await?;
        attachments.retain(|a| a.volume_id == volume_id);
        Ok(attachments)
    }

    pub async fn update_attachment(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &AttachmentSpec,
    ) -> Result<AttachmentSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_attachment(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<AttachmentSpec>(ctx, id).await
    }
}
