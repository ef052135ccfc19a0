//! Campaign send pipeline: ownership guard, state-guarded launch, audience
//! resolution, delivery, terminal-state bookkeeping.

use crate::audience::resolve_audience;
use crate::models::Campaign;
use crate::store::CampaignStore;
use pressflow_channels::email::OutboundCampaign;
use pressflow_channels::EmailDeliverer;
use pressflow_core::{PressflowError, PressflowResult};
use pressflow_directory::DirectoryStore;
use pressflow_platform::accounts::Account;
use pressflow_platform::require_owner_or_admin;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

pub struct CampaignSender {
    campaigns: Arc<CampaignStore>,
    directory: Arc<DirectoryStore>,
    deliverer: Arc<dyn EmailDeliverer>,
}

impl CampaignSender {
    pub fn new(
        campaigns: Arc<CampaignStore>,
        directory: Arc<DirectoryStore>,
        deliverer: Arc<dyn EmailDeliverer>,
    ) -> Self {
        Self {
            campaigns,
            directory,
            deliverer,
        }
    }

    /// Send a campaign on behalf of `caller`.
    ///
    /// The draft/scheduled -> sending move is a compare-and-set in the store;
    /// the terminal state is recorded once the delivery collaborator
    /// responds, within this request.
    pub async fn send(&self, campaign_id: Uuid, caller: &Account) -> PressflowResult<Campaign> {
        let campaign = self
            .campaigns
            .get(campaign_id)
            .ok_or_else(|| PressflowError::NotFound("campaign".into()))?;

        require_owner_or_admin(caller, campaign.created_by)?;

        let campaign = self.campaigns.begin_send(campaign_id)?;

        let audience = resolve_audience(&self.directory, &campaign.target_lists);

        let outbound = OutboundCampaign {
            campaign_id: campaign.id,
            subject: campaign.subject.clone(),
            sender_name: campaign.sender_name.clone(),
            sender_email: campaign.sender_email.clone(),
            html_body: campaign.content.clone(),
            plain_text_body: campaign.plain_text_content.clone(),
        };

        match self.deliverer.send_campaign(&outbound, &audience).await {
            Ok(report) => {
                for recipient in &audience {
                    self.directory.mark_contact_emailed(recipient.contact_id);
                }
                let sent = self.campaigns.complete_send(campaign_id, report.accepted)?;
                info!(
                    campaign_id = %campaign_id,
                    accepted = report.accepted,
                    provider_message_id = %report.provider_message_id,
                    "Campaign delivery completed"
                );
                metrics::counter!("campaigns.sent").increment(1);
                Ok(sent)
            }
            Err(e) => {
                error!(campaign_id = %campaign_id, error = %e, "Campaign delivery failed");
                metrics::counter!("campaigns.failed").increment(1);
                self.campaigns.fail_send(campaign_id)?;
                Err(PressflowError::UpstreamDelivery(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateCampaign;
    use pressflow_channels::email::{DeliveryError, DeliveryReport, Recipient};
    use pressflow_channels::{EmailDeliverer, SendGridProvider};
    use pressflow_core::config::EmailConfig;
    use pressflow_core::Role;
    use pressflow_directory::{CreateContact, CreateContactList};
    use pressflow_platform::accounts::{AccountStore, CreateAccount};

    struct RecordingDeliverer {
        delivered: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl EmailDeliverer for RecordingDeliverer {
        async fn send_campaign(
            &self,
            _campaign: &OutboundCampaign,
            audience: &[Recipient],
        ) -> Result<DeliveryReport, DeliveryError> {
            let mut delivered = self.delivered.lock().unwrap();
            delivered.extend(audience.iter().map(|r| r.email.clone()));
            Ok(DeliveryReport {
                provider_message_id: "test-batch".into(),
                accepted: audience.len(),
                completed_at: chrono::Utc::now(),
            })
        }

        async fn send_message(
            &self,
            _to: &str,
            _subject: &str,
            _body: &str,
        ) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn account(role: Role) -> Account {
        let store = AccountStore::new();
        store
            .create(
                CreateAccount {
                    name: "T".into(),
                    email: format!("{}@example.com", Uuid::new_v4()),
                    password: "x".into(),
                    role,
                },
                "hash".into(),
            )
            .unwrap()
    }

    fn campaign_req(lists: Vec<Uuid>) -> CreateCampaign {
        CreateCampaign {
            name: "Launch".into(),
            subject: "S".into(),
            sender_name: "P".into(),
            sender_email: "p@example.com".into(),
            content: "<p>b</p>".into(),
            plain_text_content: None,
            scheduled_at: None,
            target_lists: lists,
            tags: Vec::new(),
            attachments: Vec::new(),
        }
    }

    fn setup_audience(directory: &DirectoryStore) -> Uuid {
        let list = directory.create_list(
            CreateContactList {
                name: "L".into(),
                description: None,
                tags: Vec::new(),
            },
            Uuid::new_v4(),
        );
        for (name, email) in [("A", "a@example.com"), ("B", "b@example.com")] {
            directory
                .create_contact(CreateContact {
                    name: name.into(),
                    email: email.into(),
                    organization: None,
                    position: None,
                    phone: None,
                    website: None,
                    lists: vec![list.id],
                    tags: Vec::new(),
                    notes: None,
                    source: Default::default(),
                })
                .unwrap();
        }
        list.id
    }

    #[tokio::test]
    async fn test_send_happy_path() {
        let campaigns = Arc::new(CampaignStore::new());
        let directory = Arc::new(DirectoryStore::new());
        let list = setup_audience(&directory);
        let deliverer = Arc::new(RecordingDeliverer {
            delivered: std::sync::Mutex::new(Vec::new()),
        });

        let owner = account(Role::Manager);
        let c = campaigns.create(campaign_req(vec![list]), owner.id).unwrap();

        let sender = CampaignSender::new(campaigns.clone(), directory.clone(), deliverer.clone());
        let sent = sender.send(c.id, &owner).await.unwrap();

        assert_eq!(sent.status, crate::CampaignStatus::Sent);
        assert_eq!(sent.analytics.total_sent, 2);
        assert_eq!(deliverer.delivered.lock().unwrap().len(), 2);
        // Contacts get their last_email_sent stamp.
        assert!(directory
            .list_contacts(&Default::default())
            .iter()
            .all(|c| c.last_email_sent.is_some()));
    }

    #[tokio::test]
    async fn test_send_requires_ownership() {
        let campaigns = Arc::new(CampaignStore::new());
        let directory = Arc::new(DirectoryStore::new());
        let deliverer = Arc::new(SendGridProvider::new(EmailConfig::default()));

        let owner = account(Role::Manager);
        let stranger = account(Role::Manager);
        let admin = account(Role::Admin);
        let list = setup_audience(&directory);
        let c = campaigns.create(campaign_req(vec![list]), owner.id).unwrap();

        let sender = CampaignSender::new(campaigns.clone(), directory, deliverer);
        let err = sender.send(c.id, &stranger).await.unwrap_err();
        assert!(matches!(err, PressflowError::Forbidden(_)));
        // State untouched by the rejected attempt.
        assert_eq!(
            campaigns.get(c.id).unwrap().status,
            crate::CampaignStatus::Draft
        );

        // The admin may send someone else's campaign.
        assert!(sender.send(c.id, &admin).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_from_terminal_state_fails() {
        let campaigns = Arc::new(CampaignStore::new());
        let directory = Arc::new(DirectoryStore::new());
        let list = setup_audience(&directory);
        let deliverer = Arc::new(SendGridProvider::new(EmailConfig::default()));

        let owner = account(Role::Manager);
        let c = campaigns.create(campaign_req(vec![list]), owner.id).unwrap();

        let sender = CampaignSender::new(campaigns.clone(), directory, deliverer);
        sender.send(c.id, &owner).await.unwrap();

        let err = sender.send(c.id, &owner).await.unwrap_err();
        assert!(matches!(err, PressflowError::InvalidTransition { .. }));
        assert_eq!(
            campaigns.get(c.id).unwrap().status,
            crate::CampaignStatus::Sent
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_marks_failed() {
        let campaigns = Arc::new(CampaignStore::new());
        let directory = Arc::new(DirectoryStore::new());
        let list = setup_audience(&directory);
        let deliverer = Arc::new(SendGridProvider::new(EmailConfig {
            fail_delivery: true,
            ..Default::default()
        }));

        let owner = account(Role::Manager);
        let c = campaigns.create(campaign_req(vec![list]), owner.id).unwrap();

        let sender = CampaignSender::new(campaigns.clone(), directory, deliverer);
        let err = sender.send(c.id, &owner).await.unwrap_err();
        assert!(matches!(err, PressflowError::UpstreamDelivery(_)));
        assert_eq!(
            campaigns.get(c.id).unwrap().status,
            crate::CampaignStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_missing_campaign_is_not_found() {
        let sender = CampaignSender::new(
            Arc::new(CampaignStore::new()),
            Arc::new(DirectoryStore::new()),
            Arc::new(SendGridProvider::new(EmailConfig::default())),
        );
        let caller = account(Role::Admin);
        let err = sender.send(Uuid::new_v4(), &caller).await.unwrap_err();
        assert!(matches!(err, PressflowError::NotFound(_)));
    }
}
