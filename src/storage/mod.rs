pub mod local;
#[cfg(test)]
pub mod memory;
pub mod s3;

pub use local::LocalStore;
#[cfg(test)]
pub use memory::MemoryStore;
pub use s3::S3Store;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::ListingId;

/// Key of the completed-ID ledger
pub const COMPLETED_KEY: &str = "completed.txt";
/// Key of the pending batch written by the discovery pass
pub const PENDING_KEY: &str = "need_update.txt";

/// Text object storage shared by the ledger, the pending batch and the
/// listing documents. Local disk and S3 are interchangeable behind it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read a whole object. `Ok(None)` when the key does not exist.
    async fn read_text(&self, key: &str) -> Result<Option<String>>;

    /// Replace the object at `key` with `text`
    async fn write_text(&self, key: &str, text: &str) -> Result<()>;

    /// Remove the object. Removing a missing key succeeds.
    async fn delete_key(&self, key: &str) -> Result<()>;

    /// Every key starting with `prefix`
    async fn list_keys(&self, prefix: &str) -> Result<BTreeSet<String>>;

    /// Backend name for log lines
    fn describe(&self) -> String;
}

/// Prefix under which one day's listing documents live
pub fn document_prefix(date: NaiveDate) -> String {
    format!("json-files/{}/", date.format("%Y-%m-%d"))
}

pub fn document_key(date: NaiveDate, id: &ListingId) -> String {
    format!("{}{}.json", document_prefix(date), id)
}

pub fn log_key(date: NaiveDate) -> String {
    format!("logs/{}-log.log", date.format("%Y-%m-%d"))
}

/// Map a listed document key back to its listing ID. Keys that are not
/// `.json` objects directly under the prefix are ignored.
pub fn id_from_document_key(prefix: &str, key: &str) -> Option<ListingId> {
    let name = key.strip_prefix(prefix)?;
    let id = name.strip_suffix(".json")?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(ListingId::from(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn keys_are_date_partitioned() {
        assert_eq!(document_prefix(date()), "json-files/2024-03-09/");
        assert_eq!(
            document_key(date(), &ListingId::from("3312")),
            "json-files/2024-03-09/3312.json"
        );
        assert_eq!(log_key(date()), "logs/2024-03-09-log.log");
    }

    #[test]
    fn document_key_round_trips_to_id() {
        let prefix = document_prefix(date());
        let key = document_key(date(), &ListingId::from("77"));
        assert_eq!(id_from_document_key(&prefix, &key), Some(ListingId::from("77")));
    }

    #[test]
    fn foreign_keys_are_not_ids() {
        let prefix = document_prefix(date());
        assert_eq!(id_from_document_key(&prefix, "json-files/2024-03-09/notes.txt"), None);
        assert_eq!(id_from_document_key(&prefix, "json-files/2024-03-10/1.json"), None);
        assert_eq!(id_from_document_key(&prefix, "json-files/2024-03-09/a/1.json"), None);
        assert_eq!(id_from_document_key(&prefix, "json-files/2024-03-09/.json"), None);
    }
}
