//! Campaign domain: lifecycle state machine, store, audience resolution,
//! and the send pipeline in front of the delivery collaborator.

pub mod audience;
pub mod lifecycle;
pub mod models;
pub mod sender;
pub mod store;

pub use lifecycle::{CampaignStatus, LifecycleEvent};
pub use models::{Campaign, CampaignAnalytics, CreateCampaign, UpdateCampaign};
pub use sender::CampaignSender;
pub use store::CampaignStore;
