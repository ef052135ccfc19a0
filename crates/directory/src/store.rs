//! In-memory directory store backed by DashMap.
//!
//! Email uniqueness (contacts, press contacts, active blacklist entries) is
//! enforced through the normalized-email index entries, which makes the
//! store the sole serialization point for those invariants.

use crate::models::*;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pressflow_core::types::normalize_email;
use pressflow_core::{PressflowError, PressflowResult};
use tracing::info;
use uuid::Uuid;

pub struct DirectoryStore {
    contacts: DashMap<Uuid, Contact>,
    contacts_by_email: DashMap<String, Uuid>,
    lists: DashMap<Uuid, ContactList>,
    press: DashMap<Uuid, PressContact>,
    press_by_email: DashMap<String, Uuid>,
    blacklist: DashMap<Uuid, BlacklistEntry>,
    /// normalized email -> entry id, active entries only
    blacklist_active: DashMap<String, Uuid>,
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self {
            contacts: DashMap::new(),
            contacts_by_email: DashMap::new(),
            lists: DashMap::new(),
            press: DashMap::new(),
            press_by_email: DashMap::new(),
            blacklist: DashMap::new(),
            blacklist_active: DashMap::new(),
        }
    }

    // ─── Contacts ───────────────────────────────────────────────────────────

    pub fn create_contact(&self, req: CreateContact) -> PressflowResult<Contact> {
        let email = normalize_email(&req.email);
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            name: req.name,
            email: email.clone(),
            organization: req.organization,
            position: req.position,
            phone: req.phone,
            website: req.website,
            lists: req.lists,
            tags: req.tags,
            is_active: true,
            is_blacklisted: false,
            bounce_count: 0,
            last_email_sent: None,
            notes: req.notes,
            source: req.source,
            created_at: now,
            updated_at: now,
        };

        match self.contacts_by_email.entry(email) {
            Entry::Occupied(_) => {
                return Err(PressflowError::Conflict(
                    "a contact with this email already exists".into(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(contact.id);
            }
        }

        for list_id in &contact.lists {
            if let Some(mut list) = self.lists.get_mut(list_id) {
                list.value_mut().contact_count += 1;
            }
        }

        self.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    pub fn get_contact(&self, id: Uuid) -> Option<Contact> {
        self.contacts.get(&id).map(|r| r.value().clone())
    }

    pub fn contact_email_exists(&self, email: &str) -> bool {
        self.contacts_by_email.contains_key(&normalize_email(email))
    }

    /// Filtered listing, newest first.
    pub fn list_contacts(&self, filter: &ContactFilter) -> Vec<Contact> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut contacts: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|r| {
                let c = r.value();
                if let Some(list_id) = filter.list_id {
                    if !c.lists.contains(&list_id) {
                        return false;
                    }
                }
                if let Some(active) = filter.is_active {
                    if c.is_active != active {
                        return false;
                    }
                }
                if let Some(q) = &needle {
                    let org = c.organization.as_deref().unwrap_or("").to_lowercase();
                    if !c.name.to_lowercase().contains(q)
                        && !c.email.contains(q)
                        && !org.contains(q)
                    {
                        return false;
                    }
                }
                true
            })
            .map(|r| r.value().clone())
            .collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        contacts
    }

    /// Active contacts belonging to any of the given lists.
    pub fn contacts_in_lists(&self, list_ids: &[Uuid]) -> Vec<Contact> {
        self.contacts
            .iter()
            .filter(|r| {
                let c = r.value();
                c.is_active && c.lists.iter().any(|l| list_ids.contains(l))
            })
            .map(|r| r.value().clone())
            .collect()
    }

    /// Flip the contact-level suppression flag (bounce handling, manual ops).
    pub fn set_contact_blacklisted(&self, id: Uuid, blacklisted: bool) -> bool {
        if let Some(mut entry) = self.contacts.get_mut(&id) {
            let c = entry.value_mut();
            c.is_blacklisted = blacklisted;
            c.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    pub fn mark_contact_emailed(&self, id: Uuid) {
        if let Some(mut entry) = self.contacts.get_mut(&id) {
            entry.value_mut().last_email_sent = Some(Utc::now());
        }
    }

    pub fn count_contacts(&self) -> usize {
        self.contacts.len()
    }

    pub fn count_active_contacts(&self) -> usize {
        self.contacts.iter().filter(|r| r.value().is_active).count()
    }

    // ─── Contact Lists ──────────────────────────────────────────────────────

    pub fn create_list(&self, req: CreateContactList, created_by: Uuid) -> ContactList {
        let now = Utc::now();
        let list = ContactList {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            created_by,
            is_active: true,
            contact_count: 0,
            tags: req.tags,
            created_at: now,
            updated_at: now,
        };
        info!(list_id = %list.id, "Contact list created");
        self.lists.insert(list.id, list.clone());
        list
    }

    pub fn get_list(&self, id: Uuid) -> Option<ContactList> {
        self.lists.get(&id).map(|r| r.value().clone())
    }

    /// Lists visible to a caller; `owner` restricts to that creator.
    pub fn list_lists(&self, owner: Option<Uuid>, search: Option<&str>) -> Vec<ContactList> {
        let needle = search.map(str::to_lowercase);
        let mut lists: Vec<ContactList> = self
            .lists
            .iter()
            .filter(|r| {
                let l = r.value();
                if let Some(owner) = owner {
                    if l.created_by != owner {
                        return false;
                    }
                }
                if let Some(q) = &needle {
                    if !l.name.to_lowercase().contains(q) {
                        return false;
                    }
                }
                true
            })
            .map(|r| r.value().clone())
            .collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        lists
    }

    // ─── Press Contacts ─────────────────────────────────────────────────────

    pub fn create_press_contact(&self, req: CreatePressContact) -> PressflowResult<PressContact> {
        let email = normalize_email(&req.email);
        let now = Utc::now();
        let contact = PressContact {
            id: Uuid::new_v4(),
            name: req.name,
            email: email.clone(),
            job_title: req.job_title,
            organization: req.organization,
            phone: req.phone,
            website: req.website,
            media_type: req.media_type,
            beat: req.beat,
            influence: req.influence,
            region: req.region,
            language: req.language,
            tags: req.tags,
            is_active: true,
            is_blacklisted: false,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };

        match self.press_by_email.entry(email) {
            Entry::Occupied(_) => {
                return Err(PressflowError::Conflict(
                    "a press contact with this email already exists".into(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(contact.id);
            }
        }

        self.press.insert(contact.id, contact.clone());
        Ok(contact)
    }

    pub fn get_press_contact(&self, id: Uuid) -> Option<PressContact> {
        self.press.get(&id).map(|r| r.value().clone())
    }

    pub fn press_email_exists(&self, email: &str) -> bool {
        self.press_by_email.contains_key(&normalize_email(email))
    }

    pub fn update_press_contact(
        &self,
        id: Uuid,
        req: UpdatePressContact,
    ) -> PressflowResult<PressContact> {
        if !self.press.contains_key(&id) {
            return Err(PressflowError::NotFound("press contact".into()));
        }
        if let Some(email) = &req.email {
            let email = normalize_email(email);
            match self.press_by_email.entry(email) {
                Entry::Occupied(existing) if *existing.get() != id => {
                    return Err(PressflowError::Conflict(
                        "this email is used by another press contact".into(),
                    ));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let mut entry = self
            .press
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("press contact".into()))?;
        let c = entry.value_mut();

        if let Some(email) = req.email {
            let email = normalize_email(&email);
            if email != c.email {
                self.press_by_email.remove(&c.email);
                c.email = email;
            }
        }
        if let Some(name) = req.name {
            c.name = name;
        }
        if let Some(media_type) = req.media_type {
            c.media_type = media_type;
        }
        if let Some(job_title) = req.job_title {
            c.job_title = Some(job_title);
        }
        if let Some(organization) = req.organization {
            c.organization = Some(organization);
        }
        if let Some(phone) = req.phone {
            c.phone = Some(phone);
        }
        if let Some(website) = req.website {
            c.website = Some(website);
        }
        if let Some(beat) = req.beat {
            c.beat = beat;
        }
        if let Some(influence) = req.influence {
            c.influence = influence;
        }
        if let Some(region) = req.region {
            c.region = Some(region);
        }
        if let Some(language) = req.language {
            c.language = Some(language);
        }
        if let Some(tags) = req.tags {
            c.tags = tags;
        }
        if let Some(active) = req.is_active {
            c.is_active = active;
        }
        if let Some(notes) = req.notes {
            c.notes = Some(notes);
        }
        c.updated_at = Utc::now();
        Ok(c.clone())
    }

    pub fn delete_press_contact(&self, id: Uuid) -> bool {
        if let Some((_, contact)) = self.press.remove(&id) {
            self.press_by_email.remove(&contact.email);
            info!(press_id = %id, "Press contact deleted");
            true
        } else {
            false
        }
    }

    pub fn list_press_contacts(&self, filter: &PressFilter) -> Vec<PressContact> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut contacts: Vec<PressContact> = self
            .press
            .iter()
            .filter(|r| {
                let c = r.value();
                if let Some(media_type) = filter.media_type {
                    if c.media_type != media_type {
                        return false;
                    }
                }
                if let Some(beat) = filter.beat {
                    if c.beat != beat {
                        return false;
                    }
                }
                if let Some(region) = &filter.region {
                    if c.region.as_deref() != Some(region.as_str()) {
                        return false;
                    }
                }
                if let Some(active) = filter.is_active {
                    if c.is_active != active {
                        return false;
                    }
                }
                if let Some(q) = &needle {
                    let org = c.organization.as_deref().unwrap_or("").to_lowercase();
                    let title = c.job_title.as_deref().unwrap_or("").to_lowercase();
                    if !c.name.to_lowercase().contains(q)
                        && !c.email.contains(q)
                        && !org.contains(q)
                        && !title.contains(q)
                    {
                        return false;
                    }
                }
                true
            })
            .map(|r| r.value().clone())
            .collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        contacts
    }

    pub fn count_press_contacts(&self) -> usize {
        self.press.len()
    }

    pub fn count_active_press_contacts(&self) -> usize {
        self.press.iter().filter(|r| r.value().is_active).count()
    }

    // ─── Blacklist ──────────────────────────────────────────────────────────

    /// Add an address to the suppression list. Fails with `Conflict` when an
    /// active entry for the address already exists.
    pub fn add_blacklist_entry(
        &self,
        req: CreateBlacklistEntry,
        added_by: Option<Uuid>,
    ) -> PressflowResult<BlacklistEntry> {
        let email = normalize_email(&req.email);
        let now = Utc::now();
        let entry = BlacklistEntry {
            id: Uuid::new_v4(),
            email: email.clone(),
            reason: req.reason,
            description: req.description,
            added_by,
            campaign_id: req.campaign_id,
            bounce_type: req.bounce_type,
            bounce_count: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match self.blacklist_active.entry(email) {
            Entry::Occupied(_) => {
                return Err(PressflowError::Conflict(
                    "this email is already blacklisted".into(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(entry.id);
            }
        }

        info!(email = %entry.email, reason = ?entry.reason, "Email blacklisted");
        self.blacklist.insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Bulk suppression; accounting per input address, in input order.
    pub fn bulk_blacklist(
        &self,
        emails: &[String],
        reason: BlacklistReason,
        description: Option<String>,
        added_by: Option<Uuid>,
    ) -> BulkBlacklistReport {
        let mut report = BulkBlacklistReport::default();
        for email in emails {
            if !pressflow_core::types::is_valid_email(email) {
                report.failed.push(email.clone());
                continue;
            }
            let req = CreateBlacklistEntry {
                email: email.clone(),
                reason,
                description: description.clone(),
                campaign_id: None,
                bounce_type: None,
            };
            match self.add_blacklist_entry(req, added_by) {
                Ok(_) => report.added.push(email.clone()),
                Err(PressflowError::Conflict(_)) => report.existing.push(email.clone()),
                Err(_) => report.failed.push(email.clone()),
            }
        }
        report
    }

    /// Soft-deactivate an entry; the record is kept for audit.
    pub fn deactivate_blacklist_entry(&self, id: Uuid) -> PressflowResult<BlacklistEntry> {
        let mut entry = self
            .blacklist
            .get_mut(&id)
            .ok_or_else(|| PressflowError::NotFound("blacklist entry".into()))?;
        let e = entry.value_mut();
        if e.is_active {
            e.is_active = false;
            e.updated_at = Utc::now();
            self.blacklist_active.remove(&e.email);
            info!(email = %e.email, "Blacklist entry deactivated");
        }
        Ok(e.clone())
    }

    /// Active entry for an address, if any.
    pub fn check_blacklist(&self, email: &str) -> Option<BlacklistEntry> {
        let id = *self.blacklist_active.get(&normalize_email(email))?;
        self.blacklist.get(&id).map(|r| r.value().clone())
    }

    pub fn is_email_blacklisted(&self, email: &str) -> bool {
        self.blacklist_active.contains_key(&normalize_email(email))
    }

    pub fn list_blacklist(&self, filter: &BlacklistFilter) -> Vec<BlacklistEntry> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut entries: Vec<BlacklistEntry> = self
            .blacklist
            .iter()
            .filter(|r| {
                let e = r.value();
                if let Some(active) = filter.is_active {
                    if e.is_active != active {
                        return false;
                    }
                }
                if let Some(reason) = filter.reason {
                    if e.reason != reason {
                        return false;
                    }
                }
                if let Some(q) = &needle {
                    if !e.email.contains(q) {
                        return false;
                    }
                }
                true
            })
            .map(|r| r.value().clone())
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_req(name: &str, email: &str, lists: Vec<Uuid>) -> CreateContact {
        CreateContact {
            name: name.into(),
            email: email.into(),
            organization: None,
            position: None,
            phone: None,
            website: None,
            lists,
            tags: Vec::new(),
            notes: None,
            source: ContactSource::Manual,
        }
    }

    fn press_req(name: &str, email: &str) -> CreatePressContact {
        CreatePressContact {
            name: name.into(),
            email: email.into(),
            media_type: MediaType::Online,
            job_title: None,
            organization: None,
            phone: None,
            website: None,
            beat: Beat::default(),
            influence: Influence::default(),
            region: None,
            language: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn test_contact_unique_email() {
        let store = DirectoryStore::new();
        store
            .create_contact(contact_req("A", "a@example.com", vec![]))
            .unwrap();
        let err = store
            .create_contact(contact_req("B", "A@Example.com", vec![]))
            .unwrap_err();
        assert!(matches!(err, PressflowError::Conflict(_)));
    }

    #[test]
    fn test_list_contact_count_maintained() {
        let store = DirectoryStore::new();
        let owner = Uuid::new_v4();
        let list = store.create_list(
            CreateContactList {
                name: "Tech desk".into(),
                description: None,
                tags: Vec::new(),
            },
            owner,
        );
        store
            .create_contact(contact_req("A", "a@example.com", vec![list.id]))
            .unwrap();
        store
            .create_contact(contact_req("B", "b@example.com", vec![list.id]))
            .unwrap();
        assert_eq!(store.get_list(list.id).unwrap().contact_count, 2);
    }

    #[test]
    fn test_contacts_in_lists_union() {
        let store = DirectoryStore::new();
        let owner = Uuid::new_v4();
        let l1 = store.create_list(
            CreateContactList {
                name: "One".into(),
                description: None,
                tags: Vec::new(),
            },
            owner,
        );
        let l2 = store.create_list(
            CreateContactList {
                name: "Two".into(),
                description: None,
                tags: Vec::new(),
            },
            owner,
        );
        store
            .create_contact(contact_req("A", "a@example.com", vec![l1.id]))
            .unwrap();
        store
            .create_contact(contact_req("B", "b@example.com", vec![l2.id]))
            .unwrap();
        store
            .create_contact(contact_req("C", "c@example.com", vec![l1.id, l2.id]))
            .unwrap();

        let union = store.contacts_in_lists(&[l1.id, l2.id]);
        assert_eq!(union.len(), 3);
        let only_l1 = store.contacts_in_lists(&[l1.id]);
        assert_eq!(only_l1.len(), 2);
    }

    #[test]
    fn test_press_update_unique_email() {
        let store = DirectoryStore::new();
        store.create_press_contact(press_req("A", "a@example.com")).unwrap();
        let b = store.create_press_contact(press_req("B", "b@example.com")).unwrap();

        let err = store
            .update_press_contact(
                b.id,
                UpdatePressContact {
                    email: Some("a@example.com".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, PressflowError::Conflict(_)));
    }

    #[test]
    fn test_blacklist_soft_deactivate_and_reuse() {
        let store = DirectoryStore::new();
        let entry = store
            .add_blacklist_entry(
                CreateBlacklistEntry {
                    email: "x@example.com".into(),
                    reason: BlacklistReason::Bounce,
                    description: None,
                    campaign_id: None,
                    bounce_type: Some(BounceType::Hard),
                },
                None,
            )
            .unwrap();

        assert!(store.is_email_blacklisted("X@example.com"));

        // Duplicate active entry is rejected.
        assert!(store
            .add_blacklist_entry(
                CreateBlacklistEntry {
                    email: "x@example.com".into(),
                    reason: BlacklistReason::Manual,
                    description: None,
                    campaign_id: None,
                    bounce_type: None,
                },
                None,
            )
            .is_err());

        let deactivated = store.deactivate_blacklist_entry(entry.id).unwrap();
        assert!(!deactivated.is_active);
        assert!(!store.is_email_blacklisted("x@example.com"));
        // The record survives deactivation.
        assert_eq!(
            store
                .list_blacklist(&BlacklistFilter {
                    is_active: Some(false),
                    ..Default::default()
                })
                .len(),
            1
        );

        // The address can be re-blacklisted afterwards.
        store
            .add_blacklist_entry(
                CreateBlacklistEntry {
                    email: "x@example.com".into(),
                    reason: BlacklistReason::Manual,
                    description: None,
                    campaign_id: None,
                    bounce_type: None,
                },
                None,
            )
            .unwrap();
    }

    #[test]
    fn test_bulk_blacklist_accounting() {
        let store = DirectoryStore::new();
        store
            .add_blacklist_entry(
                CreateBlacklistEntry {
                    email: "dup@example.com".into(),
                    reason: BlacklistReason::Manual,
                    description: None,
                    campaign_id: None,
                    bounce_type: None,
                },
                None,
            )
            .unwrap();

        let report = store.bulk_blacklist(
            &[
                "new@example.com".into(),
                "dup@example.com".into(),
                "not-an-email".into(),
            ],
            BlacklistReason::Unsubscribe,
            None,
            None,
        );
        assert_eq!(report.added, vec!["new@example.com"]);
        assert_eq!(report.existing, vec!["dup@example.com"]);
        assert_eq!(report.failed, vec!["not-an-email"]);
    }
}
