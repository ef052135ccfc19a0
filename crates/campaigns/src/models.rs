//! Campaign domain types.

use crate::lifecycle::CampaignStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub sender_name: String,
    pub sender_email: String,
    pub content: String,
    pub plain_text_content: Option<String>,
    pub status: CampaignStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub target_lists: Vec<Uuid>,
    pub tags: Vec<String>,
    pub attachments: Vec<AttachmentMeta>,
    pub analytics: CampaignAnalytics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata of an uploaded attachment; the payload lives in file storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignAnalytics {
    pub total_sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub bounced: u64,
    pub unsubscribed: u64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub bounce_rate: f64,
}

impl CampaignAnalytics {
    /// Recompute the derived rates from the raw counters.
    pub fn recompute_rates(&mut self) {
        if self.total_sent == 0 {
            self.open_rate = 0.0;
            self.click_rate = 0.0;
            self.bounce_rate = 0.0;
            return;
        }
        let sent = self.total_sent as f64;
        self.open_rate = self.opened as f64 / sent * 100.0;
        self.click_rate = self.clicked as f64 / sent * 100.0;
        self.bounce_rate = self.bounced as f64 / sent * 100.0;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub subject: String,
    pub sender_name: String,
    pub sender_email: String,
    pub content: String,
    #[serde(default)]
    pub plain_text_content: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_lists: Vec<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaign {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub content: Option<String>,
    pub plain_text_content: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub target_lists: Option<Vec<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<AttachmentMeta>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recompute_rates() {
        let mut analytics = CampaignAnalytics {
            total_sent: 200,
            opened: 50,
            clicked: 10,
            bounced: 4,
            ..Default::default()
        };
        analytics.recompute_rates();
        assert_eq!(analytics.open_rate, 25.0);
        assert_eq!(analytics.click_rate, 5.0);
        assert_eq!(analytics.bounce_rate, 2.0);
    }

    #[test]
    fn test_recompute_rates_zero_sent() {
        let mut analytics = CampaignAnalytics {
            opened: 5,
            ..Default::default()
        };
        analytics.recompute_rates();
        assert_eq!(analytics.open_rate, 0.0);
    }
}
