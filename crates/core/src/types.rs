//! Shared domain primitives: roles, pagination, email normalization.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Closed set of account roles.
///
/// `Admin` is the top-level administrator; every other role is scoped by the
/// per-route policies in the platform crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    DataEntry,
    Viewer,
}

impl Role {
    /// All role variants.
    pub fn all() -> [Role; 4] {
        [Role::Admin, Role::Manager, Role::DataEntry, Role::Viewer]
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::DataEntry => "data_entry",
            Role::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Pagination ─────────────────────────────────────────────────────────────

/// Query-string pagination parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}
fn default_limit() -> usize {
    10
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageParams {
    /// Build from optional query values, falling back to the defaults.
    pub fn from_query(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or_else(default_page).max(1),
            limit: limit.unwrap_or_else(default_limit),
        }
    }

    /// Number of records to skip. Page numbering is 1-based.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }

    /// Apply the window to an already-sorted vector.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset())
            .take(self.limit)
            .cloned()
            .collect()
    }
}

/// Pagination metadata echoed in list responses.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl PageMeta {
    pub fn new(params: PageParams, total: usize) -> Self {
        let pages = if params.limit == 0 {
            0
        } else {
            total.div_ceil(params.limit)
        };
        Self {
            page: params.page,
            limit: params.limit,
            total,
            pages,
        }
    }
}

// ─── Email helpers ──────────────────────────────────────────────────────────

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\w+([.\-]?\w+)*@\w+([.\-]?\w+)*(\.\w{2,})+$").expect("email regex")
    })
}

/// Lowercase + trim an email for storage and index lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// RFC-shaped address check used at every boundary that accepts an email.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::DataEntry.as_str(), "data_entry");
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let role: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, Role::Viewer);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last@sub.example.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_page_meta() {
        let params = PageParams { page: 2, limit: 10 };
        assert_eq!(params.offset(), 10);
        let meta = PageMeta::new(params, 25);
        assert_eq!(meta.pages, 3);

        let items: Vec<u32> = (0..25).collect();
        let window = params.slice(&items);
        assert_eq!(window.first(), Some(&10));
        assert_eq!(window.len(), 10);
    }
}
