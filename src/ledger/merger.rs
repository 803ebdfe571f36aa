use anyhow::{Context, Result};
use tracing::{error, info};

use super::read_id_set;
use crate::storage::{ObjectStore, COMPLETED_KEY, PENDING_KEY};

/// What a merge did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No pending batch, or an empty one. Nothing was written.
    NothingPending,
    Merged {
        /// IDs from the batch that were new to the ledger
        added: usize,
        /// Ledger size after the merge
        total: usize,
        /// Whether the pending batch was deleted afterwards
        pending_retired: bool,
    },
}

/// Fold the persisted pending batch into the completed ledger.
///
/// Both sets are read fresh from the store. The ledger is rewritten in full
/// as the sorted union, then the pending batch is deleted. A failed delete is
/// only logged: merging the same batch again is a no-op. An unreadable ledger
/// aborts the merge before anything is written.
pub async fn merge_pending(store: &dyn ObjectStore) -> Result<MergeOutcome> {
    let pending = match read_id_set(store, PENDING_KEY).await? {
        Some(ids) if !ids.is_empty() => ids,
        Some(_) => {
            info!("{} is empty. No IDs to merge.", PENDING_KEY);
            return Ok(MergeOutcome::NothingPending);
        }
        None => {
            info!("{} does not exist. No IDs to merge.", PENDING_KEY);
            return Ok(MergeOutcome::NothingPending);
        }
    };

    let completed = read_id_set(store, COMPLETED_KEY)
        .await
        .context("Ledger unreadable, merge aborted")?
        .unwrap_or_default();

    let merged = completed.union(&pending);
    let added = merged.len() - completed.len();

    store
        .write_text(COMPLETED_KEY, &merged.to_text())
        .await
        .with_context(|| format!("Failed to write {COMPLETED_KEY}"))?;
    info!(
        "Merged {} IDs into {} ({} new, {} total)",
        pending.len(),
        COMPLETED_KEY,
        added,
        merged.len()
    );

    let pending_retired = match store.delete_key(PENDING_KEY).await {
        Ok(()) => {
            info!("{} has been deleted.", PENDING_KEY);
            true
        }
        Err(e) => {
            error!("Failed to delete {}: {:#}", PENDING_KEY, e);
            false
        }
    };

    Ok(MergeOutcome::Merged {
        added,
        total: merged.len(),
        pending_retired,
    })
}
