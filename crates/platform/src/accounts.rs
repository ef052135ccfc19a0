//! Account records and the in-memory account store.
//!
//! The store is the sole serialization point for the unique-email invariant:
//! all writes that touch an address go through the `by_email` index entry.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pressflow_core::types::normalize_email;
use pressflow_core::{PressflowError, PressflowResult, Role};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// An authenticated principal. The credential hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Filters for the account listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Thread-safe in-memory account store.
pub struct AccountStore {
    accounts: DashMap<Uuid, Account>,
    /// normalized email -> account id
    by_email: DashMap<String, Uuid>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            by_email: DashMap::new(),
        }
    }

    /// Insert a new account. `password_hash` must already be hashed.
    pub fn create(
        &self,
        req: CreateAccount,
        password_hash: String,
    ) -> PressflowResult<Account> {
        let email = normalize_email(&req.email);
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            name: req.name,
            email: email.clone(),
            password_hash,
            role: req.role,
            is_active: true,
            last_login: None,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        };

        match self.by_email.entry(email) {
            Entry::Occupied(_) => {
                return Err(PressflowError::Conflict(
                    "an account with this email already exists".into(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(account.id);
            }
        }

        info!(account_id = %account.id, role = %account.role, "Account created");
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    pub fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts.get(&id).map(|r| r.value().clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<Account> {
        let id = *self.by_email.get(&normalize_email(email))?;
        self.get(id)
    }

    /// Filtered listing, newest first.
    pub fn list(&self, filter: &AccountFilter) -> Vec<Account> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|r| {
                let a = r.value();
                if let Some(role) = filter.role {
                    if a.role != role {
                        return false;
                    }
                }
                if let Some(active) = filter.is_active {
                    if a.is_active != active {
                        return false;
                    }
                }
                if let Some(q) = &needle {
                    if !a.name.to_lowercase().contains(q) && !a.email.contains(q) {
                        return false;
                    }
                }
                true
            })
            .map(|r| r.value().clone())
            .collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        accounts
    }

    /// Apply a partial update. Email changes re-run the uniqueness check.
    pub fn update(&self, id: Uuid, req: UpdateAccount) -> PressflowResult<Account> {
        if !self.accounts.contains_key(&id) {
            return Err(PressflowError::NotFound("account".into()));
        }
        if let Some(email) = &req.email {
            let email = normalize_email(email);
            match self.by_email.entry(email.clone()) {
                Entry::Occupied(existing) if *existing.get() != id => {
                    return Err(PressflowError::Conflict(
                        "this email is used by another account".into(),
                    ));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("account".into()))?;
        let a = entry.value_mut();

        if let Some(email) = req.email {
            let email = normalize_email(&email);
            if email != a.email {
                self.by_email.remove(&a.email);
                a.email = email;
            }
        }
        if let Some(name) = req.name {
            a.name = name;
        }
        if let Some(role) = req.role {
            a.role = role;
        }
        if let Some(active) = req.is_active {
            a.is_active = active;
        }
        a.updated_at = Utc::now();
        Ok(a.clone())
    }

    pub fn delete(&self, id: Uuid) -> bool {
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.by_email.remove(&account.email);
            info!(account_id = %id, "Account deleted");
            true
        } else {
            false
        }
    }

    pub fn record_login(&self, id: Uuid) {
        if let Some(mut entry) = self.accounts.get_mut(&id) {
            entry.value_mut().last_login = Some(Utc::now());
        }
    }

    pub fn set_password(&self, id: Uuid, password_hash: String) -> bool {
        if let Some(mut entry) = self.accounts.get_mut(&id) {
            let a = entry.value_mut();
            a.password_hash = password_hash;
            a.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Store a reset-token hash with its expiry.
    pub fn set_reset_token(&self, id: Uuid, token_hash: String, expires: DateTime<Utc>) {
        if let Some(mut entry) = self.accounts.get_mut(&id) {
            let a = entry.value_mut();
            a.reset_token_hash = Some(token_hash);
            a.reset_token_expires = Some(expires);
        }
    }

    /// Roll back a pending reset token (delivery failure path).
    pub fn clear_reset_token(&self, id: Uuid) {
        if let Some(mut entry) = self.accounts.get_mut(&id) {
            let a = entry.value_mut();
            a.reset_token_hash = None;
            a.reset_token_expires = None;
        }
    }

    /// Consume an unexpired reset token and set the new credential in one
    /// step, so a token redeems exactly once.
    pub fn redeem_reset_token(
        &self,
        token_hash: &str,
        password_hash: String,
    ) -> Option<Account> {
        let id = self.accounts.iter().find_map(|r| {
            let a = r.value();
            let matches = a.reset_token_hash.as_deref() == Some(token_hash)
                && a.reset_token_expires.map(|t| t > Utc::now()).unwrap_or(false);
            matches.then_some(a.id)
        })?;

        let mut entry = self.accounts.get_mut(&id)?;
        let a = entry.value_mut();
        // Re-check under the entry lock; a concurrent redeem may have won.
        if a.reset_token_hash.as_deref() != Some(token_hash) {
            return None;
        }
        a.password_hash = password_hash;
        a.reset_token_hash = None;
        a.reset_token_expires = None;
        a.updated_at = Utc::now();
        info!(account_id = %a.id, "Password reset redeemed");
        Some(a.clone())
    }

    // ─── Aggregations ───────────────────────────────────────────────────────

    pub fn count(&self) -> usize {
        self.accounts.len()
    }

    pub fn count_active(&self) -> usize {
        self.accounts.iter().filter(|r| r.value().is_active).count()
    }

    /// Accounts per role, in `Role::all()` order.
    pub fn role_distribution(&self) -> Vec<(Role, usize)> {
        Role::all()
            .into_iter()
            .map(|role| {
                let n = self
                    .accounts
                    .iter()
                    .filter(|r| r.value().role == role)
                    .count();
                (role, n)
            })
            .collect()
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
