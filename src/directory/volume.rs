//! Volume entry points

use super::Directory;
use crate::auth::CallerContext;
use crate::error::{Error, Result};
use crate::model::VolumeSpec;
use crate::query::QueryParams;
use tracing::debug;

impl Directory {
    pub async fn create_volume(&self, ctx: &CallerContext, volume: VolumeSpec) -> Result<VolumeSpec> {
        self.create(ctx, volume).await
    }

    pub async fn get_volume(&self, ctx: &CallerContext, id: &str) -> Result<VolumeSpec> {
        self.get(ctx, id).await
    }

    pub async fn list_volumes(&self, ctx: &CallerContext) -> Result<Vec<VolumeSpec>> {
        self.list(ctx).await
    }

    pub async fn list_volumes_with_filter(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<VolumeSpec>> {
        self.list_filtered(ctx, params).await
    }

    pub async fn update_volume(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &VolumeSpec,
    ) -> Result<VolumeSpec> {
        self.update(ctx, id, update).await
    }

    pub async fn delete_volume(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        self.delete::<VolumeSpec>(ctx, id).await
    }

    /// Volumes whose `groupId` is `group_id`
    pub async fn list_volumes_by_group_id(
        &self,
        ctx: &CallerContext,
        group_id: &str,
    ) -> Result<Vec<VolumeSpec>> {
        let mut volumes = self.list_volumes(ctx).await?;
        volumes.retain(|v| v.group_id == group_id);
        Ok(volumes)
    }

    /// Update each volume in turn, keyed by its own id
    ///
    /// Stops at the first failure; nothing from the batch is returned then,
    /// although earlier updates stay applied.
    pub async fn volumes_to_update(
        &self,
        ctx: &CallerContext,
        volumes: &[VolumeSpec],
    ) -> Result<Vec<VolumeSpec>> {
        let mut updated = Vec::with_capacity(volumes.len());
        for volume in volumes {
            updated.push(self.update_volume(ctx, &volume.base.id, volume).await?);
        }
        debug!("Updated {} volumes", updated.len());
        Ok(updated)
    }

    /// Volume carrying the external durable name `name`
    pub async fn find_volume_by_durable_name(
        &self,
        ctx: &CallerContext,
        name: &str,
    ) -> Result<VolumeSpec> {
        self.list_volumes(ctx)
            .await?
            .into_iter()
            .find(|v| v.durable_name() == Some(name))
            .ok_or_else(|| Error::not_found("volume", format!("durableName={}", name)))
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::CallerContext;
    use crate::directory::tests::directory;
    use crate::error::Error;
    use crate::model::{BaseModel, Identifier, VolumeSpec};
    use crate::query::params_from_pairs;
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;

    fn volume(id: &str, group: &str) -> VolumeSpec {
        VolumeSpec {
            base: BaseModel::new(id, format!("{id}-name")),
            group_id: group.into(),
            size: 1,
            status: "available".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_page_of_five_volumes() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        for i in 1..=5 {
            dir.create_volume(&ctx, volume(&format!("v{i}"), "")).await.unwrap();
        }
        let all = dir.list_volumes(&ctx).await.unwrap();

        let params = params_from_pairs([("limit", "2"), ("offset", "3")]);
        let page = dir.list_volumes_with_filter(&ctx, &params).await.unwrap();
        assert_eq!(page, all[3..5].to_vec());
    }

    #[tokio::test]
    async fn test_list_volumes_by_group_id() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        dir.create_volume(&ctx, volume("v1", "g1")).await.unwrap();
        dir.create_volume(&ctx, volume("v2", "g2")).await.unwrap();
        dir.create_volume(&ctx, volume("v3", "g1")).await.unwrap();

        let grouped = dir.list_volumes_by_group_id(&ctx, "g1").await.unwrap();
        let ids: Vec<_> = grouped.iter().map(|v| v.base.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v3"]);
        assert!(dir.list_volumes_by_group_id(&ctx, "g9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_volume_merge_rules() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        let mut vol = volume("v1", "");
        vol.multi_attach = true;
        vol.metadata.insert("a".into(), "1".into());
        dir.create_volume(&ctx, vol).await.unwrap();

        let mut metadata = BTreeMap::new();
        metadata.insert("b".to_string(), "2".to_string());
        let patch = VolumeSpec {
            size: 8,
            multi_attach: false,
            metadata,
            ..Default::default()
        };
        let updated = dir.update_volume(&ctx, "v1", &patch).await.unwrap();
        assert_eq!(updated.size, 8);
        assert!(updated.multi_attach);
        assert_eq!(updated.metadata.len(), 2);
    }

    #[tokio::test]
    async fn test_volumes_to_update_stops_at_first_error() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        dir.create_volume(&ctx, volume("v1", "")).await.unwrap();
        dir.create_volume(&ctx, volume("v3", "")).await.unwrap();

        let mut batch = vec![volume("v1", ""), volume("v2", ""), volume("v3", "")];
        for v in &mut batch {
            v.status = "error".into();
        }
        assert_matches!(
            dir.volumes_to_update(&ctx, &batch).await,
            Err(Error::NotFound { .. })
        );
        assert_eq!(dir.get_volume(&ctx, "v1").await.unwrap().status, "error");
        assert_eq!(dir.get_volume(&ctx, "v3").await.unwrap().status, "available");

        let ok = dir.volumes_to_update(&ctx, &[batch[2].clone()]).await.unwrap();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].status, "error");
    }

    #[tokio::test]
    async fn test_find_volume_by_durable_name() {
        let (dir, _) = directory();
        let ctx = CallerContext::tenant("t1", "u");
        let mut vol = volume("v1", "");
        vol.identifier = Some(Identifier {
            durable_name: "naa.600a".into(),
            durable_name_format: "NAA".into(),
        });
        dir.create_volume(&ctx, vol).await.unwrap();
        dir.create_volume(&ctx, volume("v2", "")).await.unwrap();

        let found = dir.find_volume_by_durable_name(&ctx, "naa.600a").await.unwrap();
        assert_eq!(found.base.id, "v1");
        assert_matches!(
            dir.find_volume_by_durable_name(&ctx, "").await,
            Err(Error::NotFound { .. })
        );

        let other = CallerContext::tenant("t2", "u");
        assert_matches!(
            dir.find_volume_by_durable_name(&other, "naa.600a").await,
            Err(Error::NotFound { .. })
        );
    }
}
