//! Contact directories: contacts, contact lists, press contacts, and the
//! suppression (blacklist) list, plus CSV bulk import.

pub mod import;
pub mod models;
pub mod store;

pub use import::{import_contacts, import_press, ImportReport};
pub use models::*;
pub use store::DirectoryStore;
