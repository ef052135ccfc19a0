//! Contact directory endpoints: contacts and contact lists.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use pressflow_core::types::{is_valid_email, PageMeta, PageParams};
use pressflow_core::{PressflowError, Role};
use pressflow_directory::{Contact, ContactFilter, ContactList, CreateContact, CreateContactList};
use pressflow_platform::require_role;
use serde::Deserialize;
use uuid::Uuid;

const DIRECTORY_WRITERS: &[Role] = &[Role::Admin, Role::Manager, Role::DataEntry];

#[derive(Debug, Default, Deserialize)]
pub struct ListContactsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub list_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// GET /api/contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<ApiResponse<Vec<Contact>>>, ApiError> {
    let page = PageParams::from_query(query.page, query.limit);
    let filter = ContactFilter {
        list_id: query.list_id,
        is_active: query.is_active,
        search: query.search,
    };
    let all = state.directory.list_contacts(&filter);
    let meta = PageMeta::new(page, all.len());
    Ok(Json(ApiResponse::paginated(page.slice(&all), meta)))
}

/// POST /api/contacts
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<CreateContact>,
) -> Result<(StatusCode, Json<ApiResponse<Contact>>), ApiError> {
    require_role(&auth, DIRECTORY_WRITERS)?;

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

    let contact = state.directory.create_contact(req)?;
    metrics::counter!("contacts.created").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message("contact created", contact)),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListListsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
}

/// GET /api/contacts/lists — non-admin callers see only their own lists.
pub async fn list_contact_lists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Query(query): Query<ListListsQuery>,
) -> Result<Json<ApiResponse<Vec<ContactList>>>, ApiError> {
    let page = PageParams::from_query(query.page, query.limit);
    let owner = if auth.role.is_admin() {
        None
    } else {
        Some(auth.id)
    };
    let all = state
        .directory
        .list_lists(owner, query.search.as_deref());
    let meta = PageMeta::new(page, all.len());
    Ok(Json(ApiResponse::paginated(page.slice(&all), meta)))
}

/// POST /api/contacts/lists
pub async fn create_contact_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<CreateContactList>,
) -> Result<(StatusCode, Json<ApiResponse<ContactList>>), ApiError> {
    require_role(&auth, DIRECTORY_WRITERS)?;

    if req.name.trim().is_empty() {
        return Err(PressflowError::validation("list name is required").into());
    }

    let list = state.directory.create_list(req, auth.id);
    metrics::counter!("contact_lists.created").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message("contact list created", list)),
    ))
}
