//! Account management endpoints, role- and ownership-gated.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use pressflow_core::types::{is_valid_email, PageMeta, PageParams};
use pressflow_core::{PressflowError, Role};
use pressflow_platform::accounts::{Account, AccountFilter, CreateAccount, UpdateAccount};
use pressflow_platform::{password, require_admin, require_owner_or_admin, require_role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<Account>>>, ApiError> {
    require_role(&auth, &[Role::Admin, Role::Manager])?;

    let page = PageParams::from_query(query.page, query.limit);
    let filter = AccountFilter {
        search: query.search,
        role: query.role,
        is_active: query.is_active,
    };
    let all = state.accounts.list(&filter);
    let meta = PageMeta::new(page, all.len());
    Ok(Json(ApiResponse::paginated(page.slice(&all), meta)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    require_owner_or_admin(&auth, id)?;
    let account = state
        .accounts
        .get(id)
        .ok_or_else(|| PressflowError::NotFound("account".to_string()))?;
    Ok(Json(ApiResponse::ok(account)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<CreateAccount>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    require_admin(&auth)?;

    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if !is_valid_email(&req.email) {
        errors.push("a valid email is required".to_string());
    }
    if req.password.len() < 6 {
        errors.push("password must be at least 6 characters".to_string());
    }
    if !errors.is_empty() {
        return Err(PressflowError::Validation(errors).into());
    }

    let password_hash = password::hash_password(&req.password)?;
    let account = state.accounts.create(req, password_hash)?;

    metrics::counter!("users.created").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message("account created", account)),
    ))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAccount>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    require_owner_or_admin(&auth, id)?;

    if state.accounts.get(id).is_none() {
        return Err(PressflowError::NotFound("account".to_string()).into());
    }

    // Only the admin assigns roles; in particular a non-admin caller can
    // never change their own role.
    if req.role.is_some() && !auth.role.is_admin() {
        return Err(
            PressflowError::Forbidden("you may not change your own role".into()).into(),
        );
    }

    if let Some(email) = &req.email {
        if !is_valid_email(email) {
            return Err(PressflowError::validation("a valid email is required").into());
        }
    }
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(PressflowError::validation("name must not be empty").into());
        }
    }

    let account = state.accounts.update(id, req)?;
    Ok(Json(ApiResponse::ok_with_message(
        "account updated",
        account,
    )))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&auth)?;

    if state.accounts.get(id).is_none() {
        return Err(PressflowError::NotFound("account".to_string()).into());
    }
    if auth.id == id {
        return Err(
            PressflowError::Forbidden("you may not delete your own account".into()).into(),
        );
    }

    state.accounts.delete(id);
    metrics::counter!("users.deleted").increment(1);
    Ok(Json(ApiResponse::message("account deleted")))
}
