//! Shared application state and the development seed.

use chrono::{Duration, Utc};
use pressflow_campaigns::{CampaignSender, CampaignStore, CreateCampaign};
use pressflow_channels::{EmailDeliverer, SendGridProvider};
use pressflow_core::{AppConfig, PressflowResult, Role};
use pressflow_directory::{
    Beat, BlacklistReason, CreateBlacklistEntry, CreateContact, CreateContactList,
    CreatePressContact, DirectoryStore, Influence, MediaType,
};
use pressflow_platform::accounts::{AccountStore, CreateAccount};
use pressflow_platform::{password, TokenCodec};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<AccountStore>,
    pub directory: Arc<DirectoryStore>,
    pub campaigns: Arc<CampaignStore>,
    pub deliverer: Arc<dyn EmailDeliverer>,
    pub sender: Arc<CampaignSender>,
    pub tokens: TokenCodec,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let deliverer: Arc<dyn EmailDeliverer> =
            Arc::new(SendGridProvider::new(config.email.clone()));
        Self::with_deliverer(config, deliverer)
    }

    /// Build the state with an explicit delivery collaborator (tests).
    pub fn with_deliverer(config: AppConfig, deliverer: Arc<dyn EmailDeliverer>) -> Self {
        let accounts = Arc::new(AccountStore::new());
        let directory = Arc::new(DirectoryStore::new());
        let campaigns = Arc::new(CampaignStore::new());
        let sender = Arc::new(CampaignSender::new(
            campaigns.clone(),
            directory.clone(),
            deliverer.clone(),
        ));
        let tokens = TokenCodec::new(&config.auth.jwt_secret, config.auth.jwt_expiry_days);

        Self {
            config: Arc::new(config),
            accounts,
            directory,
            campaigns,
            deliverer,
            sender,
            tokens,
            start_time: Instant::now(),
        }
    }

    /// Seed development data: one account per role, a contact list with
    /// members, press contacts, a blacklist entry, and campaigns in
    /// several states.
    pub fn seed_demo_data(&self) -> PressflowResult<()> {
        let admin = self.accounts.create(
            CreateAccount {
                name: "Admin User".into(),
                email: "admin@pressflow.io".into(),
                password: String::new(),
                role: Role::Admin,
            },
            password::hash_password("admin123")?,
        )?;
        let manager = self.accounts.create(
            CreateAccount {
                name: "Maya Manager".into(),
                email: "maya@pressflow.io".into(),
                password: String::new(),
                role: Role::Manager,
            },
            password::hash_password("maya1234")?,
        )?;
        self.accounts.create(
            CreateAccount {
                name: "Devin Data".into(),
                email: "devin@pressflow.io".into(),
                password: String::new(),
                role: Role::DataEntry,
            },
            password::hash_password("devin123")?,
        )?;
        let viewer = self.accounts.create(
            CreateAccount {
                name: "Vera Viewer".into(),
                email: "vera@pressflow.io".into(),
                password: String::new(),
                role: Role::Viewer,
            },
            password::hash_password("vera1234")?,
        )?;
        self.accounts.update(
            viewer.id,
            pressflow_platform::accounts::UpdateAccount {
                is_active: Some(false),
                ..Default::default()
            },
        )?;

        let tech_list = self.directory.create_list(
            CreateContactList {
                name: "Technology Desk".into(),
                description: Some("Technology reporters and editors".into()),
                tags: vec!["tech".into()],
            },
            admin.id,
        );
        let business_list = self.directory.create_list(
            CreateContactList {
                name: "Business Desk".into(),
                description: Some("Business and finance reporters".into()),
                tags: vec!["business".into()],
            },
            manager.id,
        );

        for (name, email, org, lists) in [
            (
                "Zoe Tran",
                "zoe@dailybyte.example.com",
                "Daily Byte",
                vec![tech_list.id],
            ),
            (
                "Arthur Kline",
                "arthur@ledgerpost.example.com",
                "Ledger Post",
                vec![business_list.id],
            ),
            (
                "Irene Vasquez",
                "irene@wireline.example.com",
                "Wireline",
                vec![tech_list.id, business_list.id],
            ),
        ] {
            self.directory.create_contact(CreateContact {
                name: name.into(),
                email: email.into(),
                organization: Some(org.into()),
                position: None,
                phone: None,
                website: None,
                lists,
                tags: Vec::new(),
                notes: None,
                source: Default::default(),
            })?;
        }

        for (name, email, media_type, beat) in [
            (
                "Nadia Osei",
                "nadia@morningsignal.example.com",
                MediaType::Newspaper,
                Beat::Economy,
            ),
            (
                "Felix Brand",
                "felix@techcast.example.com",
                MediaType::Podcast,
                Beat::Technology,
            ),
        ] {
            self.directory.create_press_contact(CreatePressContact {
                name: name.into(),
                email: email.into(),
                media_type,
                job_title: None,
                organization: None,
                phone: None,
                website: None,
                beat,
                influence: Influence::High,
                region: None,
                language: Some("en".into()),
                tags: Vec::new(),
                notes: None,
            })?;
        }

        self.directory.add_blacklist_entry(
            CreateBlacklistEntry {
                email: "bounced@oldnews.example.com".into(),
                reason: BlacklistReason::Bounce,
                description: Some("hard bounce on the last two sends".into()),
                campaign_id: None,
                bounce_type: Some(pressflow_directory::BounceType::Hard),
            },
            Some(admin.id),
        )?;

        let draft = CreateCampaign {
            name: "Product Launch Brief".into(),
            subject: "Embargoed: launch details inside".into(),
            sender_name: "PressFlow Comms".into(),
            sender_email: "press@pressflow.io".into(),
            content: "<p>Launch details for your desk.</p>".into(),
            plain_text_content: None,
            scheduled_at: None,
            target_lists: vec![tech_list.id],
            tags: vec!["launch".into()],
            attachments: Vec::new(),
        };
        self.campaigns.create(draft.clone(), manager.id)?;

        let scheduled = CreateCampaign {
            name: "Quarterly Numbers".into(),
            scheduled_at: Some(Utc::now() + Duration::days(2)),
            target_lists: vec![business_list.id],
            ..draft.clone()
        };
        self.campaigns.create(scheduled, manager.id)?;

        let sent = self.campaigns.create(
            CreateCampaign {
                name: "Beta Program Announcement".into(),
                target_lists: vec![tech_list.id],
                ..draft
            },
            admin.id,
        )?;
        self.campaigns.begin_send(sent.id)?;
        self.campaigns.complete_send(sent.id, 3)?;
        self.campaigns.record_engagement(sent.id, 3, 2, 1, 0, 0)?;

        info!("Demo data seeded");
        Ok(())
    }
}
