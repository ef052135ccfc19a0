//! Accounts and access control: credential storage, the bearer-token codec,
//! and the per-route authorization policies.

pub mod accounts;
pub mod password;
pub mod policy;
pub mod tokens;

pub use accounts::{Account, AccountStore, CreateAccount, UpdateAccount};
pub use policy::{authenticate_token, require_admin, require_owner_or_admin, require_role};
pub use tokens::TokenCodec;
