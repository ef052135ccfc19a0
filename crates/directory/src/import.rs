//! CSV bulk import for contacts and press contacts.
//!
//! Rows are processed sequentially; every row lands in exactly one bucket
//! (imported or skipped) and failures never abort the batch, so the report
//! is deterministic for a given input.

use crate::models::{ContactSource, CreateContact, CreatePressContact, MediaType};
use crate::store::DirectoryStore;
use pressflow_core::types::{is_valid_email, normalize_email};
use pressflow_core::{PressflowError, PressflowResult};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

/// Per-request import accounting.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn skip(&mut self, message: String) {
        self.skipped += 1;
        self.errors.push(message);
    }
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PressRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    media_type: String,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Import contacts from CSV bytes (header row expected: name, email, ...).
pub fn import_contacts(store: &DirectoryStore, data: &[u8]) -> PressflowResult<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut report = ImportReport::default();
    let mut seen_in_batch: HashSet<String> = HashSet::new();

    for result in reader.deserialize::<ContactRow>() {
        report.total += 1;
        let row_no = report.total;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                report.skip(format!("row {row_no}: malformed row - {e}"));
                continue;
            }
        };

        if row.name.is_empty() || row.email.is_empty() {
            report.skip(format!("row {row_no}: name and email are required"));
            continue;
        }
        if !is_valid_email(&row.email) {
            report.skip(format!("row {row_no}: invalid email format - {}", row.email));
            continue;
        }

        let email = normalize_email(&row.email);
        if seen_in_batch.contains(&email) || store.contact_email_exists(&email) {
            report.skip(format!("email already exists: {email}"));
            continue;
        }

        let req = CreateContact {
            name: row.name,
            email: email.clone(),
            organization: row.organization.filter(|s| !s.is_empty()),
            position: row.position.filter(|s| !s.is_empty()),
            phone: row.phone.filter(|s| !s.is_empty()),
            website: None,
            lists: Vec::new(),
            tags: Vec::new(),
            notes: row.notes.filter(|s| !s.is_empty()),
            source: ContactSource::Import,
        };
        match store.create_contact(req) {
            Ok(_) => {
                seen_in_batch.insert(email);
                report.imported += 1;
            }
            Err(PressflowError::Conflict(_)) => {
                report.skip(format!("email already exists: {email}"));
            }
            Err(e) => {
                report.skip(format!("row {row_no}: {e}"));
            }
        }
    }

    info!(
        total = report.total,
        imported = report.imported,
        skipped = report.skipped,
        "Contact import finished"
    );
    Ok(report)
}

/// Import press contacts from CSV bytes; `media_type` is required per row.
pub fn import_press(store: &DirectoryStore, data: &[u8]) -> PressflowResult<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut report = ImportReport::default();
    let mut seen_in_batch: HashSet<String> = HashSet::new();

    for result in reader.deserialize::<PressRow>() {
        report.total += 1;
        let row_no = report.total;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                report.skip(format!("row {row_no}: malformed row - {e}"));
                continue;
            }
        };

        if row.name.is_empty() || row.email.is_empty() || row.media_type.is_empty() {
            report.skip(format!(
                "row {row_no}: name, email and media_type are required"
            ));
            continue;
        }
        if !is_valid_email(&row.email) {
            report.skip(format!("row {row_no}: invalid email format - {}", row.email));
            continue;
        }
        let media_type = match MediaType::parse(&row.media_type) {
            Some(mt) => mt,
            None => {
                report.skip(format!(
                    "row {row_no}: invalid media type - {}",
                    row.media_type
                ));
                continue;
            }
        };

        let email = normalize_email(&row.email);
        if seen_in_batch.contains(&email) || store.press_email_exists(&email) {
            report.skip(format!("email already exists: {email}"));
            continue;
        }

        let req = CreatePressContact {
            name: row.name,
            email: email.clone(),
            media_type,
            job_title: row.job_title.filter(|s| !s.is_empty()),
            organization: row.organization.filter(|s| !s.is_empty()),
            phone: row.phone.filter(|s| !s.is_empty()),
            website: row.website.filter(|s| !s.is_empty()),
            beat: Default::default(),
            influence: Default::default(),
            region: None,
            language: None,
            tags: Vec::new(),
            notes: row.notes.filter(|s| !s.is_empty()),
        };
        match store.create_press_contact(req) {
            Ok(_) => {
                seen_in_batch.insert(email);
                report.imported += 1;
            }
            Err(PressflowError::Conflict(_)) => {
                report.skip(format!("email already exists: {email}"));
            }
            Err(e) => {
                report.skip(format!("row {row_no}: {e}"));
            }
        }
    }

    info!(
        total = report.total,
        imported = report.imported,
        skipped = report.skipped,
        "Press import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_import_accounting() {
        let store = DirectoryStore::new();
        let csv = b"name,email\nX,x@y.com\n,z@y.com\nDup,x@y.com\n";
        let report = import_contacts(&store, csv).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("required"));
        assert!(report.errors[1].contains("already exists"));
        assert_eq!(store.count_contacts(), 1);
    }

    #[test]
    fn test_contact_import_rejects_bad_email() {
        let store = DirectoryStore::new();
        let csv = b"name,email\nA,not-an-email\n";
        let report = import_contacts(&store, csv).unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 1);
        assert!(report.errors[0].contains("invalid email format"));
    }

    #[test]
    fn test_contact_import_skips_existing_in_store() {
        let store = DirectoryStore::new();
        store
            .create_contact(CreateContact {
                name: "Already".into(),
                email: "x@y.com".into(),
                organization: None,
                position: None,
                phone: None,
                website: None,
                lists: Vec::new(),
                tags: Vec::new(),
                notes: None,
                source: ContactSource::Manual,
            })
            .unwrap();

        let report = import_contacts(&store, b"name,email\nX,x@y.com\n").unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_contact_import_optional_columns() {
        let store = DirectoryStore::new();
        let csv =
            b"name,email,organization,position\nAda,ada@example.com,Daily Planet,Editor\n";
        let report = import_contacts(&store, csv).unwrap();
        assert_eq!(report.imported, 1);
        let contact = &store.list_contacts(&Default::default())[0];
        assert_eq!(contact.organization.as_deref(), Some("Daily Planet"));
        assert_eq!(contact.source, ContactSource::Import);
    }

    #[test]
    fn test_press_import_media_type_enum() {
        let store = DirectoryStore::new();
        let csv = b"name,email,media_type\n\
            Ana,ana@example.com,online\n\
            Bo,bo@example.com,carrier-pigeon\n\
            Cy,cy@example.com,\n";
        let report = import_press(&store, csv).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 2);
        assert!(report.errors[0].contains("invalid media type"));
        assert!(report.errors[1].contains("required"));
    }

    #[test]
    fn test_press_import_in_batch_duplicate() {
        let store = DirectoryStore::new();
        let csv = b"name,email,media_type\nA,a@y.com,tv\nB,a@y.com,radio\n";
        let report = import_press(&store, csv).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.count_press_contacts(), 1);
    }
}
