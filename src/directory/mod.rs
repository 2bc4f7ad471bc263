//! Resource Directory
//!
//! Generic CRUD engine shared by every resource family. Each operation
//! resolves a key, authorizes the caller, talks to the [`KvStore`] and
//! decodes the stored documents. The per-family files only add typed entry
//! points and the few composite lookups each family needs.
//!
//! The directory keeps no state between calls beyond its store handle:
//! updates are read-merge-write without compare-and-swap, so concurrent
//! updates to one record may overwrite each other.

mod attachment;
mod dock;
mod fileshare;
mod pool;
mod snapshot;
mod status;
mod volume;
mod volume_group;

pub use status::{StatusOutcome, StatusTarget};

use crate::auth::{self, CallerContext};
use crate::codec;
use crate::error::{Error, Result};
use crate::metrics::DirectoryMetrics;
use crate::model::{mutation_stamp, now_stamp, Resource};
use crate::query::{self, QueryParams, Queryable};
use crate::store::{KeySpace, KvRequest, KvStatus, KvStore};
use chrono::SubsecRound;
use std::sync::Arc;
use tracing::{debug, error};

/// Handle to the resource directory
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn KvStore>,
    keys: KeySpace,
    metrics: Option<DirectoryMetrics>,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("store", &self.store.name())
            .field("keys", &self.keys)
            .finish()
    }
}

impl Directory {
    pub fn new(store: Arc<dyn KvStore>, keys: KeySpace) -> Self {
        Self {
            store,
            keys,
            metrics: None,
        }
    }

    /// Count every operation on `metrics`
    pub fn with_metrics(mut self, metrics: DirectoryMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    fn observe<T: Resource, R>(&self, operation: &str, result: Result<R>) -> Result<R> {
        if let Some(metrics) = &self.metrics {
            metrics.record(T::KIND, operation, &result);
        }
        result
    }

    // =========================================================================
    // Generic Operations
    // =========================================================================

    /// Persist a new record
    ///
    /// Assigns an id and creation time when absent. For tenant-scoped kinds
    /// an empty tenant is taken from the caller.
    pub async fn create<T: Resource>(&self, ctx: &CallerContext, record: T) -> Result<T> {
        let result = self.create_inner(ctx, record).await;
        self.observe::<T, _>("create", result)
    }

    async fn create_inner<T: Resource>(&self, ctx: &CallerContext, mut record: T) -> Result<T> {
        if T::KIND.is_tenant_scoped() {
            if record.tenant_id().is_empty() {
                record.set_tenant_id(&ctx.tenant_id);
            } else if !auth::may_access(ctx, record.tenant_id()) {
                return Err(Error::permission_denied(
                    "create",
                    T::KIND.to_string(),
                    record.id(),
                ));
            }
        }

        let base = record.base_mut();
        if base.id.is_empty() {
            base.id = uuid::Uuid::new_v4().to_string();
        }
        base.created_at = Some(base.created_at.map_or_else(now_stamp, |ts| ts.trunc_subsecs(0)));
        base.updated_at = base.updated_at.map(|ts| ts.trunc_subsecs(0));

        let key = self.keys.record(T::KIND, record.tenant_id(), record.id());
        let document = codec::encode(&record)?;
        let resp = self.store.create(KvRequest::create(key, document)).await;
        if !resp.is_success() {
            error!("Failed to create {} {}: {}", T::KIND, record.id(), resp.error);
            return Err(Error::persistence(
                "create",
                T::KIND.to_string(),
                record.id(),
                resp.error,
            ));
        }

        debug!("Created {} {}", T::KIND, record.id());
        Ok(record)
    }

    /// Fetch a record visible to the caller
    ///
    /// Records owned by another tenant are reported as not found.
    pub async fn get<T: Resource>(&self, ctx: &CallerContext, id: &str) -> Result<T> {
        let result = self.get_inner(ctx, id).await;
        self.observe::<T, _>("get", result)
    }

    async fn get_inner<T: Resource>(&self, ctx: &CallerContext, id: &str) -> Result<T> {
        let mut record: T = self.fetch(ctx, &ctx.tenant_id, id).await?;
        if T::KIND.is_tenant_scoped() && !auth::may_access(ctx, record.tenant_id()) {
            debug!("{} {} is not visible to tenant {}", T::KIND, id, ctx.tenant_id);
            return Err(Error::not_found(T::KIND.to_string(), id));
        }
        record.resolve_defaults();
        Ok(record)
    }

    /// Every record of `T` visible to the caller, in stored order
    pub async fn list<T: Resource>(&self, ctx: &CallerContext) -> Result<Vec<T>> {
        let result = self.list_inner(ctx).await;
        self.observe::<T, _>("list", result)
    }

    async fn list_inner<T: Resource>(&self, ctx: &CallerContext) -> Result<Vec<T>> {
        let prefix = if auth::is_admin(ctx) {
            self.keys.collection(T::KIND)
        } else {
            self.keys.prefix(T::KIND, &ctx.tenant_id)
        };

        let resp = self.store.list(KvRequest::key(&prefix)).await;
        if !resp.is_success() {
            error!("Failed to list {}: {}", prefix, resp.error);
            return Err(Error::persistence(
                "list",
                T::KIND.to_string(),
                prefix,
                resp.error,
            ));
        }

        let mut records: Vec<T> = codec::decode_all(&resp.message)?;
        if T::KIND.is_tenant_scoped() && !auth::is_admin(ctx) {
            records.retain(|r| auth::owns_tenant(ctx, r.tenant_id()));
        }
        for record in &mut records {
            record.resolve_defaults();
        }
        debug!("Listed {} {} records", records.len(), T::KIND);
        Ok(records)
    }

    /// [`list`](Self::list) piped through the filter/sort/paginate engine
    pub async fn list_filtered<T: Resource + Queryable>(
        &self,
        ctx: &CallerContext,
        params: &QueryParams,
    ) -> Result<Vec<T>> {
        let records = self.list::<T>(ctx).await?;
        Ok(query::select(&records, params))
    }

    /// Merge the non-empty fields of `update` onto the stored record `id`
    pub async fn update<T: Resource>(&self, ctx: &CallerContext, id: &str, update: &T) -> Result<T> {
        let result = self.update_inner(ctx, id, update).await;
        self.observe::<T, _>("update", result)
    }

    async fn update_inner<T: Resource>(
        &self,
        ctx: &CallerContext,
        id: &str,
        update: &T,
    ) -> Result<T> {
        if id.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "{} update requires an id",
                T::KIND
            )));
        }

        let scoped = T::KIND.is_tenant_scoped();
        if scoped && !update.tenant_id().is_empty() && !auth::may_access(ctx, update.tenant_id()) {
            return Err(Error::permission_denied("update", T::KIND.to_string(), id));
        }

        let tenant = if update.tenant_id().is_empty() {
            ctx.tenant_id.as_str()
        } else {
            update.tenant_id()
        };
        let mut record: T = self.fetch(ctx, tenant, id).await?;
        if scoped && !auth::may_access(ctx, record.tenant_id()) {
            return Err(Error::permission_denied("update", T::KIND.to_string(), id));
        }

        record.merge_from(update);
        let base = record.base_mut();
        base.updated_at = Some(mutation_stamp(base.created_at));

        let key = self.keys.record(T::KIND, record.tenant_id(), id);
        let document = codec::encode(&record)?;
        let resp = self.store.update(KvRequest::update(key, document)).await;
        match resp.status {
            KvStatus::Success => {}
            KvStatus::NotFound => return Err(Error::not_found(T::KIND.to_string(), id)),
            KvStatus::Failure => {
                error!("Failed to update {} {}: {}", T::KIND, id, resp.error);
                return Err(Error::persistence(
                    "update",
                    T::KIND.to_string(),
                    id,
                    resp.error,
                ));
            }
        }

        debug!("Updated {} {}", T::KIND, id);
        record.resolve_defaults();
        Ok(record)
    }

    /// Remove record `id`
    ///
    /// Tenant-scoped records are resolved first: admin callers find the
    /// owning tenant that way, other callers must own the stored record.
    pub async fn delete<T: Resource>(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        let result = self.delete_inner::<T>(ctx, id).await;
        self.observe::<T, _>("delete", result)
    }

    async fn delete_inner<T: Resource>(&self, ctx: &CallerContext, id: &str) -> Result<()> {
        let key = if T::KIND.is_tenant_scoped() {
            let record: T = self.fetch(ctx, &ctx.tenant_id, id).await?;
            if !auth::may_access(ctx, record.tenant_id()) {
                return Err(Error::permission_denied("delete", T::KIND.to_string(), id));
            }
            self.keys.record(T::KIND, record.tenant_id(), id)
        } else {
            self.keys.record(T::KIND, &ctx.tenant_id, id)
        };

        let resp = self.store.delete(KvRequest::key(key)).await;
        match resp.status {
            KvStatus::Success => {
                debug!("Deleted {} {}", T::KIND, id);
                Ok(())
            }
            KvStatus::NotFound => Err(Error::not_found(T::KIND.to_string(), id)),
            KvStatus::Failure => {
                error!("Failed to delete {} {}: {}", T::KIND, id, resp.error);
                Err(Error::persistence(
                    "delete",
                    T::KIND.to_string(),
                    id,
                    resp.error,
                ))
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Read the stored document for `id` under `tenant` without access checks
    /// or read-time defaults
    ///
    /// On a miss, admin callers fall back to scanning every tenant.
    async fn fetch<T: Resource>(&self, ctx: &CallerContext, tenant: &str, id: &str) -> Result<T> {
        let key = self.keys.record(T::KIND, tenant, id);
        let resp = self.store.get(KvRequest::key(key)).await;
        match resp.status {
            KvStatus::Success => {
                if let Some(document) = resp.message.first() {
                    return codec::decode(document);
                }
            }
            KvStatus::NotFound => {}
            KvStatus::Failure => {
                error!("Failed to get {} {}: {}", T::KIND, id, resp.error);
                return Err(Error::persistence(
                    "get",
                    T::KIND.to_string(),
                    id,
                    resp.error,
                ));
            }
        }

        if T::KIND.is_tenant_scoped() && auth::is_admin(ctx) {
            debug!("{} {} not under tenant {}, scanning all tenants", T::KIND, id, tenant);
            return self.scan::<T>(id).await;
        }
        Err(Error::not_found(T::KIND.to_string(), id))
    }

    async fn scan<T: Resource>(&self, id: &str) -> Result<T> {
        let prefix = self.keys.collection(T::KIND);
        let resp = self.store.list(KvRequest::key(&prefix)).await;
        if !resp.is_success() {
            return Err(Error::persistence(
                "get",
                T::KIND.to_string(),
                id,
                resp.error,
            ));
        }
        codec::decode_all::<T>(&resp.message)?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| Error::not_found(T::KIND.to_string(), id))
    }
}
