//! Authentication endpoints: login, profile, password reset and change.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use pressflow_channels::EmailDeliverer;
use pressflow_core::types::is_valid_email;
use pressflow_core::PressflowError;
use pressflow_platform::accounts::Account;
use pressflow_platform::{password, tokens};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: Account,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    pub token: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push("a valid email is required".to_string());
    }
    if req.password.is_empty() {
        errors.push("password is required".to_string());
    }
    if !errors.is_empty() {
        return Err(PressflowError::Validation(errors).into());
    }

    let invalid =
        || PressflowError::Unauthenticated("invalid email or password".to_string());

    let account = state
        .accounts
        .find_by_email(&req.email)
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &account.password_hash) {
        warn!(email = %account.email, "Login failed: bad credentials");
        metrics::counter!("auth.login_failures").increment(1);
        return Err(invalid().into());
    }

    if !account.is_active {
        return Err(PressflowError::Unauthenticated(
            "this account has been disabled".into(),
        )
        .into());
    }

    state.accounts.record_login(account.id);
    let token = state.tokens.issue(account.id)?;
    // Re-read so the response carries the fresh last_login.
    let user = state.accounts.get(account.id).ok_or_else(invalid)?;

    info!(account_id = %user.id, "Login succeeded");
    metrics::counter!("auth.logins").increment(1);
    Ok(Json(ApiResponse::ok_with_message(
        "login successful",
        LoginData { token, user },
    )))
}

/// GET /api/auth/me
pub async fn me(
    Extension(auth): Extension<AuthAccount>,
) -> Json<ApiResponse<Account>> {
    Json(ApiResponse::ok(auth.0.as_ref().clone()))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !is_valid_email(&req.email) {
        return Err(PressflowError::validation("a valid email is required").into());
    }

    let account = state
        .accounts
        .find_by_email(&req.email)
        .ok_or_else(|| PressflowError::NotFound("account".to_string()))?;

    let (token_hash, raw_token) = tokens::generate_reset_token();
    let expires = Utc::now() + Duration::minutes(state.config.auth.reset_token_ttl_minutes);
    state
        .accounts
        .set_reset_token(account.id, token_hash, expires);

    let body = format!(
        "A password reset was requested for your account.\n\n\
         Reset token: {raw_token}\n\n\
         The token is valid for {} minutes. If you did not request this, \
         ignore this message.",
        state.config.auth.reset_token_ttl_minutes
    );

    if let Err(e) = state
        .deliverer
        .send_message(&account.email, "Password reset", &body)
        .await
    {
        // Roll back the pending token so a failed mail leaves no live reset.
        state.accounts.clear_reset_token(account.id);
        warn!(account_id = %account.id, error = %e, "Reset mail delivery failed");
        return Err(PressflowError::UpstreamDelivery(e.to_string()).into());
    }

    info!(account_id = %account.id, "Password reset requested");
    Ok(Json(ApiResponse::message(
        "password reset email sent",
    )))
}

/// PUT /api/auth/reset-password/:resettoken
pub async fn reset_password(
    State(state): State<AppState>,
    Path(resettoken): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<TokenData>>, ApiError> {
    if req.password.len() < 6 {
        return Err(
            PressflowError::validation("password must be at least 6 characters").into(),
        );
    }

    let token_hash = tokens::hash_reset_token(&resettoken);
    let password_hash = password::hash_password(&req.password)?;

    let account = state
        .accounts
        .redeem_reset_token(&token_hash, password_hash)
        .ok_or_else(|| PressflowError::validation("invalid or expired reset token"))?;

    let token = state.tokens.issue(account.id)?;
    Ok(Json(ApiResponse::ok_with_message(
        "password updated",
        TokenData { token },
    )))
}

/// PUT /api/auth/update-password
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<TokenData>>, ApiError> {
    if req.new_password.len() < 6 {
        return Err(
            PressflowError::validation("password must be at least 6 characters").into(),
        );
    }
    if !password::verify_password(&req.current_password, &auth.password_hash) {
        return Err(PressflowError::validation("current password is incorrect").into());
    }

    let password_hash = password::hash_password(&req.new_password)?;
    state.accounts.set_password(auth.id, password_hash);

    let token = state.tokens.issue(auth.id)?;
    info!(account_id = %auth.id, "Password changed");
    Ok(Json(ApiResponse::ok_with_message(
        "password updated",
        TokenData { token },
    )))
}
