//! Suppression-list endpoints. Deletion deactivates; records are kept.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use pressflow_core::types::{is_valid_email, PageMeta, PageParams};
use pressflow_core::{PressflowError, Role};
use pressflow_directory::{
    BlacklistEntry, BlacklistFilter, BlacklistReason, BulkBlacklistReport, CreateBlacklistEntry,
};
use pressflow_platform::require_role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BLACKLIST_MANAGERS: &[Role] = &[Role::Admin, Role::Manager];

#[derive(Debug, Default, Deserialize)]
pub struct ListBlacklistQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub is_active: Option<bool>,
    pub reason: Option<BlacklistReason>,
    pub search: Option<String>,
}

/// GET /api/blacklist
pub async fn list_blacklist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Query(query): Query<ListBlacklistQuery>,
) -> Result<Json<ApiResponse<Vec<BlacklistEntry>>>, ApiError> {
    require_role(&auth, BLACKLIST_MANAGERS)?;

    let page = PageParams::from_query(query.page, query.limit);
    let filter = BlacklistFilter {
        is_active: query.is_active,
        reason: query.reason,
        search: query.search,
    };
    let all = state.directory.list_blacklist(&filter);
    let meta = PageMeta::new(page, all.len());
    Ok(Json(ApiResponse::paginated(page.slice(&all), meta)))
}

/// POST /api/blacklist
pub async fn add_blacklist_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<CreateBlacklistEntry>,
) -> Result<(StatusCode, Json<ApiResponse<BlacklistEntry>>), ApiError> {
    require_role(&auth, BLACKLIST_MANAGERS)?;

    if !is_valid_email(&req.email) {
        return Err(PressflowError::validation("a valid email is required").into());
    }

    let entry = state.directory.add_blacklist_entry(req, Some(auth.id))?;
    metrics::counter!("blacklist.added").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message("email blacklisted", entry)),
    ))
}

/// DELETE /api/blacklist/:id — soft-deactivate, never physical removal.
pub async fn remove_blacklist_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlacklistEntry>>, ApiError> {
    require_role(&auth, BLACKLIST_MANAGERS)?;

    let entry = state.directory.deactivate_blacklist_entry(id)?;
    metrics::counter!("blacklist.deactivated").increment(1);
    Ok(Json(ApiResponse::ok_with_message(
        "email removed from the blacklist",
        entry,
    )))
}

#[derive(Debug, Serialize)]
pub struct BlacklistCheck {
    pub is_blacklisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<BlacklistEntry>,
}

/// GET /api/blacklist/check/:email
pub async fn check_blacklist(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<ApiResponse<BlacklistCheck>> {
    let entry = state.directory.check_blacklist(&email);
    Json(ApiResponse::ok(BlacklistCheck {
        is_blacklisted: entry.is_some(),
        entry,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BulkBlacklistRequest {
    pub emails: Vec<String>,
    pub reason: BlacklistReason,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/blacklist/bulk
pub async fn bulk_blacklist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<BulkBlacklistRequest>,
) -> Result<Json<ApiResponse<BulkBlacklistReport>>, ApiError> {
    require_role(&auth, BLACKLIST_MANAGERS)?;

    if req.emails.is_empty() {
        return Err(PressflowError::validation("at least one email is required").into());
    }

    let report = state.directory.bulk_blacklist(
        &req.emails,
        req.reason,
        req.description,
        Some(auth.id),
    );
    metrics::counter!("blacklist.bulk_requests").increment(1);
    Ok(Json(ApiResponse::ok_with_message(
        "bulk blacklist finished",
        report,
    )))
}
