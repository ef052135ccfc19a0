//! Uniform JSON envelope and the error-to-response mapping.
//!
//! Every handler returns `{success, message?, data?, errors?, pagination?}`;
//! expected error kinds convert to the envelope at this boundary, anything
//! unexpected becomes a logged 500 with the detail suppressed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pressflow_core::types::PageMeta;
use pressflow_core::PressflowError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
            pagination: None,
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn paginated(data: T, pagination: PageMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            errors: None,
            pagination: None,
        }
    }
}

/// Handler error carrying the domain error into the response conversion.
#[derive(Debug)]
pub struct ApiError(pub PressflowError);

impl From<PressflowError> for ApiError {
    fn from(err: PressflowError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self.0 {
            PressflowError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation error".to_string(),
                Some(errors),
            ),
            PressflowError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            PressflowError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            PressflowError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.0.to_string(), None)
            }
            PressflowError::InvalidTransition { .. }
            | PressflowError::ImmutableCampaignState(_)
            | PressflowError::Conflict(_) => (StatusCode::BAD_REQUEST, self.0.to_string(), None),
            PressflowError::UpstreamDelivery(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Delivery provider error: {msg}"),
                None,
            ),
            other => {
                error!(error = %other, "Unhandled internal error");
                metrics::counter!("api.internal_errors").increment(1);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".into(), None)
            }
        };

        let body = ApiResponse::<()> {
            success: false,
            message: Some(message),
            data: None,
            errors,
            pagination: None,
        };
        (status, Json(body)).into_response()
    }
}
