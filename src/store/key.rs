//! Key-Space Addressing
//!
//! Deterministic keys for resource instances and collections.
//!
//! ```text
//! <root>/<collection>/<tenant>/<id>    tenant-scoped kinds
//! <root>/<collection>/<id>             docks and pools
//! <root>/<collection>/<tenant>/        tenant prefix
//! <root>/<collection>/                 admin (tenant-less) prefix
//! ```
//!
//! Tenant and id segments are percent-encoded so a `/` inside an
//! identifier can never escape its segment.

use crate::model::ResourceKind;

/// Root of the key space
pub const DEFAULT_ROOT: &str = "/v1beta";

/// Builds keys below a fixed root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    root: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl KeySpace {
    /// Create a key space; trailing slashes on the root are dropped
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let trimmed = root.trim_end_matches('/');
        Self {
            root: trimmed.to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Key of a single record
    ///
    /// `tenant` is ignored for kinds that are not tenant scoped.
    pub fn record(&self, kind: ResourceKind, tenant: &str, id: &str) -> String {
        format!("{}{}", self.prefix(kind, tenant), segment(id))
    }

    /// Prefix of every record of `kind` owned by `tenant`
    pub fn prefix(&self, kind: ResourceKind, tenant: &str) -> String {
        if kind.is_tenant_scoped() {
            format!("{}{}/", self.collection(kind), segment(tenant))
        } else {
            self.collection(kind)
        }
    }

    /// Prefix of every record of `kind` across all tenants
    pub fn collection(&self, kind: ResourceKind) -> String {
        format!("{}/{}/", self.root, kind.collection())
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
