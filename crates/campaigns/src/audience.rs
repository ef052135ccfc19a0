//! Send-time audience resolution.
//!
//! The suppression check runs here, at send time, so blacklist entries added
//! after a list was built still take effect: no resolved audience ever
//! contains an actively blacklisted address.

use pressflow_channels::Recipient;
use pressflow_directory::DirectoryStore;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Resolve the deduplicated, suppression-filtered recipient set for the
/// union of the given contact lists.
pub fn resolve_audience(directory: &DirectoryStore, target_lists: &[Uuid]) -> Vec<Recipient> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut audience: Vec<Recipient> = Vec::new();

    for contact in directory.contacts_in_lists(target_lists) {
        if contact.is_blacklisted || directory.is_email_blacklisted(&contact.email) {
            continue;
        }
        if !seen.insert(contact.email.clone()) {
            continue;
        }
        audience.push(Recipient {
            contact_id: contact.id,
            email: contact.email,
            name: contact.name,
        });
    }

    // Stable output order regardless of map iteration order.
    audience.sort_by(|a, b| a.email.cmp(&b.email));

    debug!(
        lists = target_lists.len(),
        recipients = audience.len(),
        "Audience resolved"
    );
    audience
}
