//! Authorization Gate
//!
//! Caller identity and the two checks the directory applies to
//! tenant-scoped records.

use serde::{Deserialize, Serialize};

/// Identity of the caller of a directory operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallerContext {
    pub tenant_id: String,
    pub user_id: String,
    pub is_admin: bool,
}

impl CallerContext {
    /// Admin caller acting from `tenant_id`
    pub fn admin(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: String::new(),
            is_admin: true,
        }
    }

    /// Caller scoped to a single tenant
    pub fn tenant(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            is_admin: false,
        }
    }
}

/// Whether the caller bypasses tenant scoping
pub fn is_admin(ctx: &CallerContext) -> bool {
    ctx.is_admin
}

/// Whether the caller's tenant owns a record of `resource_tenant`
pub fn owns_tenant(ctx: &CallerContext, resource_tenant: &str) -> bool {
    ctx.tenant_id == resource_tenant
}

/// Whether the caller may see or change a record owned by `resource_tenant`
pub fn may_access(ctx: &CallerContext, resource_tenant: &str) -> bool {
    is_admin(ctx) || owns_tenant(ctx, resource_tenant)
}
