//! Outbound email channel: the delivery trait and the SendGrid-style
//! provider used in development.

pub mod email;

pub use email::{
    DeliveryError, DeliveryReport, EmailDeliverer, OutboundCampaign, Recipient, SendGridProvider,
};
