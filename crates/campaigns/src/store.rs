//! In-memory campaign store.
//!
//! State changes go through the lifecycle `transition` function, and the
//! draft/scheduled -> sending move in `begin_send` is a compare-and-set
//! performed under the campaign's entry lock, so two racing send requests
//! cannot both pass the precondition.

use crate::lifecycle::{self, CampaignStatus, LifecycleEvent};
use crate::models::*;
use chrono::{DateTime, Datelike, Utc};
use dashmap::DashMap;
use pressflow_core::{PressflowError, PressflowResult};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

pub struct CampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
}

/// Dashboard counts by status.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CampaignCounts {
    pub total: usize,
    pub sent: usize,
    pub draft: usize,
}

/// Aggregate raw counters across campaigns.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EmailTotals {
    pub total_sent: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
}

/// One month of sent-campaign performance.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub campaigns: usize,
    pub total_sent: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
}

/// Per-owner campaign activity.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerActivity {
    pub account_id: Uuid,
    pub campaign_count: usize,
    pub sent_campaigns: usize,
}

impl CampaignStore {
    pub fn new() -> Self {
        Self {
            campaigns: DashMap::new(),
        }
    }

    /// Create a draft. A future `scheduled_at` moves it straight to
    /// scheduled through the normal transition; a past one is rejected.
    pub fn create(&self, req: CreateCampaign, created_by: Uuid) -> PressflowResult<Campaign> {
        let now = Utc::now();
        let mut status = CampaignStatus::Draft;
        if let Some(at) = req.scheduled_at {
            if at <= now {
                return Err(PressflowError::validation(
                    "scheduled_at must be in the future",
                ));
            }
            status = lifecycle::transition(status, LifecycleEvent::Schedule)?;
        }

        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: req.name,
            subject: req.subject,
            sender_name: req.sender_name,
            sender_email: req.sender_email,
            content: req.content,
            plain_text_content: req.plain_text_content,
            status,
            scheduled_at: req.scheduled_at,
            sent_at: None,
            created_by,
            target_lists: req.target_lists,
            tags: req.tags,
            attachments: req.attachments,
            analytics: CampaignAnalytics::default(),
            created_at: now,
            updated_at: now,
        };
        info!(campaign_id = %campaign.id, status = %campaign.status, "Campaign created");
        self.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    pub fn get(&self, id: Uuid) -> Option<Campaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    /// Listing, newest first; `owner` scopes to that creator.
    pub fn list(&self, owner: Option<Uuid>, status: Option<CampaignStatus>) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|r| {
                let c = r.value();
                owner.map(|o| c.created_by == o).unwrap_or(true)
                    && status.map(|s| c.status == s).unwrap_or(true)
            })
            .map(|r| r.value().clone())
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns
    }

    /// Apply a partial update under the mutability guard.
    pub fn update(&self, id: Uuid, req: UpdateCampaign) -> PressflowResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;
        let c = entry.value_mut();

        lifecycle::ensure_mutable(c.status)?;

        if let Some(at) = req.scheduled_at {
            if at <= Utc::now() {
                return Err(PressflowError::validation(
                    "scheduled_at must be in the future",
                ));
            }
            // Draft moves to scheduled; an already-scheduled campaign just
            // gets the new timestamp.
            if c.status == CampaignStatus::Draft {
                c.status = lifecycle::transition(c.status, LifecycleEvent::Schedule)?;
            }
            c.scheduled_at = Some(at);
        }

        if let Some(name) = req.name {
            c.name = name;
        }
        if let Some(subject) = req.subject {
            c.subject = subject;
        }
        if let Some(sender_name) = req.sender_name {
            c.sender_name = sender_name;
        }
        if let Some(sender_email) = req.sender_email {
            c.sender_email = sender_email;
        }
        if let Some(content) = req.content {
            c.content = content;
        }
        if let Some(text) = req.plain_text_content {
            c.plain_text_content = Some(text);
        }
        if let Some(lists) = req.target_lists {
            c.target_lists = lists;
        }
        if let Some(tags) = req.tags {
            c.tags = tags;
        }
        if let Some(attachments) = req.attachments {
            c.attachments = attachments;
        }
        c.updated_at = Utc::now();
        Ok(c.clone())
    }

    /// Delete under the mutability guard.
    pub fn delete(&self, id: Uuid) -> PressflowResult<()> {
        {
            let entry = self
                .campaigns
                .get(&id)
                .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;
            lifecycle::ensure_mutable(entry.value().status)?;
        }
        if self.campaigns.remove(&id).is_some() {
            info!(campaign_id = %id, "Campaign deleted");
            Ok(())
        } else {
            Err(PressflowError::NotFound("campaign".into()))
        }
    }

    /// State-guarded move to `sending`. The check and the write happen under
    /// the entry lock: of two concurrent callers exactly one succeeds, the
    /// other observes `sending` and gets `InvalidTransition`.
    pub fn begin_send(&self, id: Uuid) -> PressflowResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;
        let c = entry.value_mut();
        c.status = lifecycle::transition(c.status, LifecycleEvent::LaunchSend)?;
        c.updated_at = Utc::now();
        info!(campaign_id = %id, "Campaign send started");
        Ok(c.clone())
    }

    /// Record delivery success: sending -> sent, with the analytics seed.
    pub fn complete_send(&self, id: Uuid, accepted: usize) -> PressflowResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;
        let c = entry.value_mut();
        c.status = lifecycle::transition(c.status, LifecycleEvent::DeliverySucceeded)?;
        c.sent_at = Some(Utc::now());
        c.analytics.total_sent = accepted as u64;
        c.analytics.recompute_rates();
        c.updated_at = Utc::now();
        info!(campaign_id = %id, accepted, "Campaign sent");
        Ok(c.clone())
    }

    /// Record delivery failure: sending -> failed.
    pub fn fail_send(&self, id: Uuid) -> PressflowResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;
        let c = entry.value_mut();
        c.status = lifecycle::transition(c.status, LifecycleEvent::DeliveryFailed)?;
        c.updated_at = Utc::now();
        info!(campaign_id = %id, "Campaign delivery failed");
        Ok(c.clone())
    }

    /// Apply delivery feedback to the analytics counters. Feedback arrives
    /// after the terminal state, so this bypasses the mutability guard but
    /// never touches the status field.
    pub fn record_engagement(
        &self,
        id: Uuid,
        delivered: u64,
        opened: u64,
        clicked: u64,
        bounced: u64,
        unsubscribed: u64,
    ) -> PressflowResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;
        let c = entry.value_mut();
        c.analytics.delivered += delivered;
        c.analytics.opened += opened;
        c.analytics.clicked += clicked;
        c.analytics.bounced += bounced;
        c.analytics.unsubscribed += unsubscribed;
        c.analytics.recompute_rates();
        c.updated_at = Utc::now();
        Ok(c.clone())
    }

    // ─── Aggregations ───────────────────────────────────────────────────────

    pub fn counts(&self, owner: Option<Uuid>) -> CampaignCounts {
        let mut counts = CampaignCounts::default();
        for r in self.campaigns.iter() {
            let c = r.value();
            if owner.map(|o| c.created_by == o).unwrap_or(true) {
                counts.total += 1;
                match c.status {
                    CampaignStatus::Sent => counts.sent += 1,
                    CampaignStatus::Draft => counts.draft += 1,
                    _ => {}
                }
            }
        }
        counts
    }

    pub fn email_totals(&self, owner: Option<Uuid>) -> EmailTotals {
        let mut totals = EmailTotals::default();
        for r in self.campaigns.iter() {
            let c = r.value();
            if owner.map(|o| c.created_by == o).unwrap_or(true) {
                totals.total_sent += c.analytics.total_sent;
                totals.total_opened += c.analytics.opened;
                totals.total_clicked += c.analytics.clicked;
            }
        }
        totals
    }

    /// Monthly performance over sent campaigns, oldest month first.
    pub fn monthly_stats(
        &self,
        owner: Option<Uuid>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Vec<MonthlyStats> {
        use std::collections::BTreeMap;

        let mut buckets: BTreeMap<(i32, u32), Vec<Campaign>> = BTreeMap::new();
        for r in self.campaigns.iter() {
            let c = r.value();
            if c.status != CampaignStatus::Sent {
                continue;
            }
            if !owner.map(|o| c.created_by == o).unwrap_or(true) {
                continue;
            }
            let Some(sent_at) = c.sent_at else { continue };
            if let Some((start, end)) = range {
                if sent_at < start || sent_at > end {
                    continue;
                }
            }
            buckets
                .entry((sent_at.year(), sent_at.month()))
                .or_default()
                .push(c.clone());
        }

        buckets
            .into_iter()
            .map(|((year, month), group)| {
                let n = group.len();
                MonthlyStats {
                    year,
                    month,
                    campaigns: n,
                    total_sent: group.iter().map(|c| c.analytics.total_sent).sum(),
                    total_opened: group.iter().map(|c| c.analytics.opened).sum(),
                    total_clicked: group.iter().map(|c| c.analytics.clicked).sum(),
                    avg_open_rate: group.iter().map(|c| c.analytics.open_rate).sum::<f64>()
                        / n as f64,
                    avg_click_rate: group.iter().map(|c| c.analytics.click_rate).sum::<f64>()
                        / n as f64,
                }
            })
            .collect()
    }

    /// Best-performing sent campaigns by open rate.
    pub fn top_by_open_rate(&self, owner: Option<Uuid>, limit: usize) -> Vec<Campaign> {
        let mut sent: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|r| {
                let c = r.value();
                c.status == CampaignStatus::Sent
                    && owner.map(|o| c.created_by == o).unwrap_or(true)
            })
            .map(|r| r.value().clone())
            .collect();
        sent.sort_by(|a, b| {
            b.analytics
                .open_rate
                .partial_cmp(&a.analytics.open_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sent.truncate(limit);
        sent
    }

    /// Campaign counts per owning account, busiest first.
    pub fn owner_activity(&self) -> Vec<OwnerActivity> {
        use std::collections::HashMap;

        let mut by_owner: HashMap<Uuid, (usize, usize)> = HashMap::new();
        for r in self.campaigns.iter() {
            let c = r.value();
            let slot = by_owner.entry(c.created_by).or_default();
            slot.0 += 1;
            if c.status == CampaignStatus::Sent {
                slot.1 += 1;
            }
        }

        let mut activity: Vec<OwnerActivity> = by_owner
            .into_iter()
            .map(|(account_id, (campaign_count, sent_campaigns))| OwnerActivity {
                account_id,
                campaign_count,
                sent_campaigns,
            })
            .collect();
        activity.sort_by(|a, b| b.campaign_count.cmp(&a.campaign_count));
        activity
    }
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}
