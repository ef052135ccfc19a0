//! Multipart CSV upload endpoints for bulk import.
//!
//! The upload is read fully into memory under the configured body-size cap;
//! row-level failures land in the per-request report, never abort the batch.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use pressflow_core::{PressflowError, Role};
use pressflow_directory::{import_contacts, import_press, ImportReport};
use pressflow_platform::require_role;
use tracing::info;

const UPLOADERS: &[Role] = &[Role::Admin, Role::Manager, Role::DataEntry];

/// Pull the first file field out of the multipart body.
async fn read_csv_part(multipart: &mut Multipart) -> Result<Vec<u8>, PressflowError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PressflowError::validation(format!("malformed multipart body: {e}")))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| PressflowError::validation(format!("failed to read upload: {e}")))?;
        return Ok(data.to_vec());
    }
    Err(PressflowError::validation("a CSV file is required"))
}

/// POST /api/upload/contacts
pub async fn upload_contacts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    require_role(&auth, UPLOADERS)?;

    let data = read_csv_part(&mut multipart).await?;
    let report = import_contacts(&state.directory, &data)?;

    info!(
        account_id = %auth.id,
        imported = report.imported,
        skipped = report.skipped,
        "Contact CSV processed"
    );
    metrics::counter!("uploads.contacts").increment(1);
    Ok(Json(ApiResponse::ok_with_message(
        "contact import finished",
        report,
    )))
}

/// POST /api/upload/press
pub async fn upload_press(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    require_role(&auth, UPLOADERS)?;

    let data = read_csv_part(&mut multipart).await?;
    let report = import_press(&state.directory, &data)?;

    info!(
        account_id = %auth.id,
        imported = report.imported,
        skipped = report.skipped,
        "Press CSV processed"
    );
    metrics::counter!("uploads.press").increment(1);
    Ok(Json(ApiResponse::ok_with_message(
        "press import finished",
        report,
    )))
}
