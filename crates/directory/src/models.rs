//! Directory domain types: contacts, press contacts, lists, blacklist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Contact ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lists: Vec<Uuid>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_blacklisted: bool,
    pub bounce_count: u32,
    pub last_email_sent: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub source: ContactSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    Manual,
    Import,
    Api,
    Signup,
}

impl Default for ContactSource {
    fn default() -> Self {
        ContactSource::Manual
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub lists: Vec<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: ContactSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    pub list_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// ─── Contact List ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ContactList {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub is_active: bool,
    /// Denormalized count, maintained by the store.
    pub contact_count: usize,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactList {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ─── Press Contact ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PressContact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub media_type: MediaType,
    pub beat: Beat,
    pub influence: Influence,
    pub region: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_blacklisted: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outlet type of a press contact. Required on every record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Newspaper,
    Magazine,
    Tv,
    Radio,
    Online,
    Agency,
    Blog,
    Podcast,
}

impl MediaType {
    /// Parse the wire name, as used by CSV import rows.
    pub fn parse(s: &str) -> Option<MediaType> {
        match s.trim().to_lowercase().as_str() {
            "newspaper" => Some(MediaType::Newspaper),
            "magazine" => Some(MediaType::Magazine),
            "tv" => Some(MediaType::Tv),
            "radio" => Some(MediaType::Radio),
            "online" => Some(MediaType::Online),
            "agency" => Some(MediaType::Agency),
            "blog" => Some(MediaType::Blog),
            "podcast" => Some(MediaType::Podcast),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Beat {
    Economy,
    Politics,
    Technology,
    Sports,
    Culture,
    Health,
    Education,
    Environment,
    Other,
}

impl Default for Beat {
    fn default() -> Self {
        Beat::Other
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Influence {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Default for Influence {
    fn default() -> Self {
        Influence::Medium
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePressContact {
    pub name: String,
    pub email: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub beat: Beat,
    #[serde(default)]
    pub influence: Influence,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePressContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub media_type: Option<MediaType>,
    pub job_title: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub beat: Option<Beat>,
    pub influence: Option<Influence>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PressFilter {
    pub media_type: Option<MediaType>,
    pub beat: Option<Beat>,
    pub region: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// ─── Blacklist ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub email: String,
    pub reason: BlacklistReason,
    pub description: Option<String>,
    pub added_by: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    pub bounce_type: Option<BounceType>,
    pub bounce_count: u32,
    /// Entries are deactivated, never removed.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlacklistReason {
    Unsubscribe,
    Bounce,
    SpamComplaint,
    Manual,
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BounceType {
    Hard,
    Soft,
    Block,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlacklistEntry {
    pub email: String,
    pub reason: BlacklistReason,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    #[serde(default)]
    pub bounce_type: Option<BounceType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlacklistFilter {
    pub is_active: Option<bool>,
    pub reason: Option<BlacklistReason>,
    pub search: Option<String>,
}

/// Outcome of a bulk blacklist request, keyed by input address.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkBlacklistReport {
    pub added: Vec<String>,
    pub existing: Vec<String>,
    pub failed: Vec<String>,
}
