//! REST API Handlers
//!
//! Read-mostly HTTP edge over the directory: list (with the query
//! pipeline) and get for every resource family, plus volume deletion.

use crate::auth::CallerContext;
use crate::directory::Directory;
use crate::error::Error;
use crate::model::{
    AttachmentSpec, DockSpec, FileShareSnapshotSpec, FileShareSpec, Resource, StoragePoolSpec,
    VolumeGroupSpec, VolumeSnapshotSpec, VolumeSpec,
};
use crate::query::{self, Queryable};
use axum::{
    async_trait,
    extract::{FromRequestParts, Json, Path, Query, State},
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Header carrying the caller's tenant
pub const TENANT_HEADER: &str = "x-auth-tenant-id";
/// Header carrying the caller's user
pub const USER_HEADER: &str = "x-auth-user-id";
/// Header marking an admin caller (`true`/`1`)
pub const ADMIN_HEADER: &str = "x-auth-is-admin";

// =============================================================================
// Request/Response Types
// =============================================================================

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Directory error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Error::PermissionDenied { .. } => (StatusCode::FORBIDDEN, "permission_denied"),
            Error::NotImplemented { .. } => (StatusCode::NOT_IMPLEMENTED, "not_implemented"),
            Error::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            Error::Persistence { .. } | Error::Http(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (
            status,
            Json(ApiErrorResponse {
                error: code.into(),
                message: self.0.to_string(),
                details: None,
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Caller Extraction
// =============================================================================

/// Caller identity taken from the auth headers
///
/// Missing headers yield an anonymous, non-admin caller with an empty
/// tenant, which sees only tenant-less records.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerContext);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let admin = header(headers, ADMIN_HEADER);
        Caller(CallerContext {
            tenant_id: header(headers, TENANT_HEADER).to_string(),
            user_id: header(headers, USER_HEADER).to_string(),
            is_admin: admin.eq_ignore_ascii_case("true") || admin == "1",
        })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller::from_headers(&parts.headers))
    }
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    directory: Directory,
}

impl RestRouter {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            directory: self.directory,
        };

        Router::new()
            .route("/v1beta/docks", get(list_records::<DockSpec>))
            .route("/v1beta/docks/:id", get(get_record::<DockSpec>))
            .route("/v1beta/pools", get(list_records::<StoragePoolSpec>))
            .route("/v1beta/pools/:id", get(get_record::<StoragePoolSpec>))
            .route("/v1beta/volumes", get(list_records::<VolumeSpec>))
            .route(
                "/v1beta/volumes/:id",
                get(get_record::<VolumeSpec>).delete(delete_volume),
            )
            .route("/v1beta/volume-groups", get(list_records::<VolumeGroupSpec>))
            .route("/v1beta/volume-groups/:id", get(get_record::<VolumeGroupSpec>))
            .route("/v1beta/attachments", get(list_records::<AttachmentSpec>))
            .route("/v1beta/attachments/:id", get(get_record::<AttachmentSpec>))
            .route("/v1beta/snapshots", get(list_records::<VolumeSnapshotSpec>))
            .route("/v1beta/snapshots/:id", get(get_record::<VolumeSnapshotSpec>))
            .route("/v1beta/fileshares", get(list_records::<FileShareSpec>))
            .route("/v1beta/fileshares/:id", get(get_record::<FileShareSpec>))
            .route(
                "/v1beta/fileshare-snapshots",
                get(list_records::<FileShareSnapshotSpec>),
            )
            .route(
                "/v1beta/fileshare-snapshots/:id",
                get(get_record::<FileShareSnapshotSpec>),
            )
            .route("/healthz", get(health_check))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    directory: Directory,
}

// =============================================================================
// Handlers
// =============================================================================

/// List records visible to the caller, filtered, sorted and paginated
async fn list_records<T>(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<T>>, ApiError>
where
    T: Resource + Queryable,
{
    let params = query::params_from_pairs(pairs);
    let records = state.directory.list_filtered::<T>(&ctx, &params).await?;
    debug!("Returning {} {} records", records.len(), T::KIND);
    Ok(Json(records))
}

/// Get one record by id
async fn get_record<T>(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError>
where
    T: Resource,
{
    let record = state.directory.get::<T>(&ctx, &id).await?;
    Ok(Json(record))
}

/// Delete a volume record
async fn delete_volume(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.directory.delete_volume(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
