//! Press-contact endpoints with the unique-email guard.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use pressflow_core::types::{is_valid_email, PageMeta, PageParams};
use pressflow_core::{PressflowError, Role};
use pressflow_directory::{
    Beat, CreatePressContact, MediaType, PressContact, PressFilter, UpdatePressContact,
};
use pressflow_platform::require_role;
use serde::Deserialize;
use uuid::Uuid;

const PRESS_WRITERS: &[Role] = &[Role::Admin, Role::Manager, Role::DataEntry];

#[derive(Debug, Default, Deserialize)]
pub struct ListPressQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub media_type: Option<MediaType>,
    pub beat: Option<Beat>,
    pub region: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// GET /api/press
pub async fn list_press(
    State(state): State<AppState>,
    Query(query): Query<ListPressQuery>,
) -> Result<Json<ApiResponse<Vec<PressContact>>>, ApiError> {
    let page = PageParams::from_query(query.page, query.limit);
    let filter = PressFilter {
        media_type: query.media_type,
        beat: query.beat,
        region: query.region,
        is_active: query.is_active,
        search: query.search,
    };
    let all = state.directory.list_press_contacts(&filter);
    let meta = PageMeta::new(page, all.len());
    Ok(Json(ApiResponse::paginated(page.slice(&all), meta)))
}

/// GET /api/press/:id
pub async fn get_press(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PressContact>>, ApiError> {
    let contact = state
        .directory
        .get_press_contact(id)
        .ok_or_else(|| PressflowError::NotFound("press contact".to_string()))?;
    Ok(Json(ApiResponse::ok(contact)))
}

/// POST /api/press
pub async fn create_press(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<CreatePressContact>,
) -> Result<(StatusCode, Json<ApiResponse<PressContact>>), ApiError> {
    require_role(&auth, PRESS_WRITERS)?;

    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if !is_valid_email(&req.email) {
        errors.push("a valid email is required".to_string());
    }
    if !errors.is_empty() {
        return Err(PressflowError::Validation(errors).into());
    }

    let contact = state.directory.create_press_contact(req)?;
    metrics::counter!("press.created").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message("press contact created", contact)),
    ))
}

/// PUT /api/press/:id
pub async fn update_press(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePressContact>,
) -> Result<Json<ApiResponse<PressContact>>, ApiError> {
    require_role(&auth, PRESS_WRITERS)?;

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

    let contact = state.directory.update_press_contact(id, req)?;
    Ok(Json(ApiResponse::ok_with_message(
        "press contact updated",
        contact,
    )))
}

/// DELETE /api/press/:id
pub async fn delete_press(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_role(&auth, PRESS_WRITERS)?;

    if !state.directory.delete_press_contact(id) {
        return Err(PressflowError::NotFound("press contact".to_string()).into());
    }
    metrics::counter!("press.deleted").increment(1);
    Ok(Json(ApiResponse::message("press contact deleted")))
}
