//! SendGrid email delivery with per-campaign counters.
//!
//! The provider builds the SendGrid API payload and tracks delivery
//! analytics keyed by campaign id. The HTTP POST itself is stubbed; the
//! `fail_delivery` switch makes every send fail for exercising the failure
//! path in development and tests.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pressflow_core::config::EmailConfig;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A resolved audience member.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Recipient {
    pub contact_id: Uuid,
    pub email: String,
    pub name: String,
}

/// What the provider reports back after accepting a campaign batch.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub provider_message_id: String,
    pub accepted: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("provider rejected the batch: {0}")]
    Rejected(String),
    #[error("empty audience, nothing to deliver")]
    EmptyAudience,
}

/// Campaign content handed to the deliverer.
#[derive(Debug, Clone)]
pub struct OutboundCampaign {
    pub campaign_id: Uuid,
    pub subject: String,
    pub sender_name: String,
    pub sender_email: String,
    pub html_body: String,
    pub plain_text_body: Option<String>,
}

/// Email delivery collaborator interface.
#[async_trait::async_trait]
pub trait EmailDeliverer: Send + Sync {
    /// Deliver a campaign to a resolved audience.
    async fn send_campaign(
        &self,
        campaign: &OutboundCampaign,
        audience: &[Recipient],
    ) -> Result<DeliveryReport, DeliveryError>;

    /// Deliver a single transactional message (password reset and similar).
    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError>;
}

/// Per-campaign counters the provider keeps for its own reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderCounters {
    pub batches: u64,
    pub total_accepted: u64,
}

/// SendGrid email provider.
/// In production: POST to https://api.sendgrid.com/v3/mail/send
pub struct SendGridProvider {
    config: EmailConfig,
    counters: DashMap<Uuid, ProviderCounters>,
}

impl SendGridProvider {
    pub fn new(config: EmailConfig) -> Self {
        info!(
            from = %config.from_email,
            fail_delivery = config.fail_delivery,
            "SendGrid provider initialized"
        );
        Self {
            config,
            counters: DashMap::new(),
        }
    }

    pub fn counters(&self, campaign_id: Uuid) -> Option<ProviderCounters> {
        self.counters.get(&campaign_id).map(|r| r.value().clone())
    }

    fn build_payload(
        &self,
        campaign: &OutboundCampaign,
        audience: &[Recipient],
    ) -> serde_json::Value {
        let personalizations: Vec<serde_json::Value> = audience
            .iter()
            .map(|r| {
                serde_json::json!({
                    "to": [{"email": r.email, "name": r.name}],
                    "custom_args": {
                        "campaign_id": campaign.campaign_id,
                        "contact_id": r.contact_id,
                    }
                })
            })
            .collect();

        serde_json::json!({
            "personalizations": personalizations,
            "from": {
                "email": campaign.sender_email,
                "name": campaign.sender_name,
            },
            "subject": campaign.subject,
            "content": [{
                "type": "text/html",
                "value": campaign.html_body,
            }],
            "tracking_settings": {
                "click_tracking": {"enable": true},
                "open_tracking": {"enable": true},
            }
        })
    }
}

#[async_trait::async_trait]
impl EmailDeliverer for SendGridProvider {
    async fn send_campaign(
        &self,
        campaign: &OutboundCampaign,
        audience: &[Recipient],
    ) -> Result<DeliveryReport, DeliveryError> {
        if audience.is_empty() {
            return Err(DeliveryError::EmptyAudience);
        }
        if self.config.fail_delivery {
            warn!(campaign_id = %campaign.campaign_id, "Delivery failure injected");
            return Err(DeliveryError::Rejected("delivery disabled".into()));
        }

        debug!(
            campaign_id = %campaign.campaign_id,
            recipients = audience.len(),
            subject = %campaign.subject,
            "Sending campaign via SendGrid"
        );

        // Build SendGrid API payload (stub; production issues the HTTP POST)
        let _payload = self.build_payload(campaign, audience);

        metrics::counter!("email.campaigns_dispatched").increment(1);
        metrics::counter!("email.recipients_accepted").increment(audience.len() as u64);

        let mut counters = self.counters.entry(campaign.campaign_id).or_default();
        counters.batches += 1;
        counters.total_accepted += audience.len() as u64;

        Ok(DeliveryReport {
            provider_message_id: format!("sg-{}", Uuid::new_v4()),
            accepted: audience.len(),
            completed_at: Utc::now(),
        })
    }

    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        if self.config.fail_delivery {
            warn!(to = %to, "Transactional delivery failure injected");
            return Err(DeliveryError::Rejected("delivery disabled".into()));
        }

        let _payload = serde_json::json!({
            "personalizations": [{"to": [{"email": to}]}],
            "from": {
                "email": self.config.from_email,
                "name": self.config.from_name,
            },
            "subject": subject,
            "content": [{"type": "text/plain", "value": body}],
        });

        metrics::counter!("email.messages_sent").increment(1);
        debug!(to = %to, subject = %subject, "Transactional message sent");
        Ok(())
    }
}
