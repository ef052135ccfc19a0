//! Campaign endpoints: CRUD under the ownership/mutability guards, plus send.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use pressflow_campaigns::{Campaign, CampaignStatus, CreateCampaign, UpdateCampaign};
use pressflow_core::types::{is_valid_email, PageMeta, PageParams};
use pressflow_core::{PressflowError, Role};
use pressflow_platform::{require_owner_or_admin, require_role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListCampaignsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<CampaignStatus>,
}

/// Non-admin callers only see their own campaigns.
fn owner_scope(auth: &AuthAccount) -> Option<Uuid> {
    if auth.role.is_admin() {
        None
    } else {
        Some(auth.id)
    }
}

/// GET /api/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<ApiResponse<Vec<Campaign>>>, ApiError> {
    let page = PageParams::from_query(query.page, query.limit);
    let all = state.campaigns.list(owner_scope(&auth), query.status);
    let meta = PageMeta::new(page, all.len());
    Ok(Json(ApiResponse::paginated(page.slice(&all), meta)))
}

/// GET /api/campaigns/:id
pub async fn get_campaign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Campaign>>, ApiError> {
    let campaign = state
        .campaigns
        .get(id)
        .ok_or_else(|| PressflowError::NotFound("campaign".to_string()))?;
    require_owner_or_admin(&auth, campaign.created_by)?;
    Ok(Json(ApiResponse::ok(campaign)))
}

fn validate_create(req: &CreateCampaign) -> Result<(), PressflowError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if req.subject.trim().is_empty() {
        errors.push("subject is required".to_string());
    }
    if req.sender_name.trim().is_empty() {
        errors.push("sender_name is required".to_string());
    }
    if !is_valid_email(&req.sender_email) {
        errors.push("a valid sender_email is required".to_string());
    }
    if req.content.trim().is_empty() {
        errors.push("content is required".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PressflowError::Validation(errors))
    }
}

/// POST /api/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<CreateCampaign>,
) -> Result<(StatusCode, Json<ApiResponse<Campaign>>), ApiError> {
    require_role(&auth, &[Role::Admin, Role::Manager])?;
    validate_create(&req)?;

    let campaign = state.campaigns.create(req, auth.id)?;
    metrics::counter!("campaigns.created").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message("campaign created", campaign)),
    ))
}

/// PUT /api/campaigns/:id
pub async fn update_campaign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCampaign>,
) -> Result<Json<ApiResponse<Campaign>>, ApiError> {
    let campaign = state
        .campaigns
        .get(id)
        .ok_or_else(|| PressflowError::NotFound("campaign".to_string()))?;
    require_owner_or_admin(&auth, campaign.created_by)?;

    if let Some(email) = &req.sender_email {
        if !is_valid_email(email) {
            return Err(PressflowError::validation("a valid sender_email is required").into());
        }
    }

    let campaign = state.campaigns.update(id, req)?;
    Ok(Json(ApiResponse::ok_with_message(
        "campaign updated",
        campaign,
    )))
}

/// DELETE /api/campaigns/:id
pub async fn delete_campaign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let campaign = state
        .campaigns
        .get(id)
        .ok_or_else(|| PressflowError::NotFound("campaign".to_string()))?;
    require_owner_or_admin(&auth, campaign.created_by)?;

    state.campaigns.delete(id)?;
    metrics::counter!("campaigns.deleted").increment(1);
    Ok(Json(ApiResponse::message("campaign deleted")))
}

/// POST /api/campaigns/:id/send
pub async fn send_campaign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Campaign>>, ApiError> {
    let campaign = state.sender.send(id, &auth).await?;
    Ok(Json(ApiResponse::ok_with_message("campaign sent", campaign)))
}
