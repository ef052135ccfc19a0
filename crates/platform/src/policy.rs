//! Access-control predicates composed per route.
//!
//! Each policy is a pure function over the already-resolved caller identity;
//! handlers call exactly the predicates their route needs instead of
//! re-deriving role logic inline.

use crate::accounts::{Account, AccountStore};
use crate::tokens::TokenCodec;
use pressflow_core::{PressflowError, PressflowResult, Role};
use uuid::Uuid;

/// Resolve a bearer credential to an active account.
///
/// Error order matches the request path: missing/malformed header, then
/// signature/expiry, then principal lookup, then the active flag.
pub fn authenticate_token(
    codec: &TokenCodec,
    store: &AccountStore,
    authorization: Option<&str>,
) -> PressflowResult<Account> {
    let header = authorization
        .ok_or_else(|| PressflowError::Unauthenticated("authentication required".into()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| PressflowError::Unauthenticated("authentication required".into()))?;

    let account_id = codec.verify(token)?;

    let account = store.get(account_id).ok_or_else(|| {
        PressflowError::Unauthenticated("no account for this token".into())
    })?;

    if !account.is_active {
        return Err(PressflowError::Unauthenticated(
            "this account has been disabled".into(),
        ));
    }

    Ok(account)
}

/// Pass only when the caller's role is one of `allowed`.
pub fn require_role(account: &Account, allowed: &[Role]) -> PressflowResult<()> {
    if allowed.contains(&account.role) {
        Ok(())
    } else {
        Err(PressflowError::Forbidden(format!(
            "role {} may not perform this operation",
            account.role
        )))
    }
}

/// Pass only for the top-level administrator.
pub fn require_admin(account: &Account) -> PressflowResult<()> {
    require_role(account, &[Role::Admin])
}

/// Pass for the admin, or when the caller owns the target resource.
/// `target_id` is the owning account id: the record itself for accounts,
/// `created_by` for owned resources.
pub fn require_owner_or_admin(account: &Account, target_id: Uuid) -> PressflowResult<()> {
    if account.role.is_admin() || account.id == target_id {
        Ok(())
    } else {
        Err(PressflowError::Forbidden(
            "you may only access resources you own".into(),
        ))
    }
}
