//! Bearer-token authentication middleware.
//!
//! Authentication runs once per request; the resolved account is attached
//! as an explicit extension value and handlers receive it through
//! `Extension<AuthAccount>` rather than re-verifying credentials.

use crate::envelope::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use pressflow_platform::accounts::Account;
use pressflow_platform::authenticate_token;
use std::sync::Arc;

/// The caller's identity, resolved by the middleware.
#[derive(Clone)]
pub struct AuthAccount(pub Arc<Account>);

impl std::ops::Deref for AuthAccount {
    type Target = Account;

    fn deref(&self) -> &Account {
        &self.0
    }
}

/// Axum middleware: resolve the bearer credential or reject with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match authenticate_token(&state.tokens, &state.accounts, authorization) {
        Ok(account) => {
            req.extensions_mut().insert(AuthAccount(Arc::new(account)));
            next.run(req).await
        }
        Err(e) => {
            metrics::counter!("api.auth_rejections").increment(1);
            ApiError::from(e).into_response()
        }
    }
}
