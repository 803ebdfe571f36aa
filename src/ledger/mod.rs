pub mod differ;
pub mod merger;

pub use differ::pending_batch;
pub use merger::{merge_pending, MergeOutcome};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::models::IdSet;
use crate::storage::{ObjectStore, COMPLETED_KEY, PENDING_KEY};

/// Read an ID set stored at `key`. `Ok(None)` when the object does not exist.
pub async fn read_id_set(store: &dyn ObjectStore, key: &str) -> Result<Option<IdSet>> {
    let text = store
        .read_text(key)
        .await
        .with_context(|| format!("Failed to read {key}"))?;
    Ok(text.map(|t| IdSet::parse(&t)))
}

/// Load the completed ledger for a discovery pass. A missing ledger is a
/// first run; an unreadable one is logged and treated the same way so the
/// pass can still make progress.
pub async fn load_completed(store: &dyn ObjectStore) -> IdSet {
    match read_id_set(store, COMPLETED_KEY).await {
        Ok(Some(ids)) => ids,
        Ok(None) => {
            info!("{} not found. Starting fresh.", COMPLETED_KEY);
            IdSet::new()
        }
        Err(e) => {
            error!("Error reading {}: {:#}", COMPLETED_KEY, e);
            IdSet::new()
        }
    }
}

/// Persist the pending batch, replacing any earlier one
pub async fn write_pending(store: &dyn ObjectStore, pending: &IdSet) -> Result<()> {
    store
        .write_text(PENDING_KEY, &pending.to_text())
        .await
        .with_context(|| format!("Failed to write {PENDING_KEY}"))?;
    info!("{} written with {} IDs", PENDING_KEY, pending.len());
    Ok(())
}

/// Remove `ids` from the persisted pending batch so the next merge leaves
/// them out of the ledger. Returns how many were removed.
pub async fn withdraw_from_pending(store: &dyn ObjectStore, ids: &IdSet) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let Some(pending) = read_id_set(store, PENDING_KEY).await? else {
        return Ok(0);
    };

    let kept = pending.difference(ids);
    let removed = pending.len() - kept.len();
    if removed > 0 {
        write_pending(store, &kept).await?;
    }
    Ok(removed)
}
