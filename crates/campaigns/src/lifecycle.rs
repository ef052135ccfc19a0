//! Campaign lifecycle state machine.
//!
//! The status field has exactly one mutator: `transition`. Everything that
//! changes a campaign's state goes through this table.

use pressflow_core::{PressflowError, PressflowResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Scheduled,
    Sending,
    Sent,
    Failed,
}

impl CampaignStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Sent | CampaignStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Sending => "sending",
            CampaignStatus::Sent => "sent",
            CampaignStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event that moves a campaign from one state to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Draft -> Scheduled
    Schedule,
    /// Draft | Scheduled -> Sending
    LaunchSend,
    /// Sending -> Sent
    DeliverySucceeded,
    /// Sending -> Failed
    DeliveryFailed,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Schedule => "schedule",
            LifecycleEvent::LaunchSend => "launch_send",
            LifecycleEvent::DeliverySucceeded => "delivery_succeeded",
            LifecycleEvent::DeliveryFailed => "delivery_failed",
        }
    }
}

/// Validate that `event` is allowed from `current` and return the next state.
pub fn transition(
    current: CampaignStatus,
    event: LifecycleEvent,
) -> PressflowResult<CampaignStatus> {
    match (current, event) {
        (CampaignStatus::Draft, LifecycleEvent::Schedule) => Ok(CampaignStatus::Scheduled),
        (CampaignStatus::Draft, LifecycleEvent::LaunchSend)
        | (CampaignStatus::Scheduled, LifecycleEvent::LaunchSend) => Ok(CampaignStatus::Sending),
        (CampaignStatus::Sending, LifecycleEvent::DeliverySucceeded) => Ok(CampaignStatus::Sent),
        (CampaignStatus::Sending, LifecycleEvent::DeliveryFailed) => Ok(CampaignStatus::Failed),
        _ => Err(PressflowError::InvalidTransition {
            from: current.to_string(),
            event: event.as_str().to_string(),
        }),
    }
}

/// Edit/delete guard: campaigns are mutable only before a send starts.
pub fn ensure_mutable(status: CampaignStatus) -> PressflowResult<()> {
    match status {
        CampaignStatus::Draft | CampaignStatus::Scheduled => Ok(()),
        other => Err(PressflowError::ImmutableCampaignState(other.to_string())),
    }
}
