use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::error::FetchError;
use crate::ledger::{self, MergeOutcome};
use crate::models::{IdSet, ListingId};
use crate::scrapers::{ListingIndex, ListingSource};
use crate::storage::{self, ObjectStore, PENDING_KEY};

/// Result of collecting one listing
#[derive(Debug)]
pub enum ListingOutcome {
    Stored,
    /// The page did not carry the valid-listing marker
    NotFound,
    Failed(FetchError),
}

/// Counters for one run attempt
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub observed: usize,
    pub pending: usize,
    pub already_stored: usize,
    pub stored: usize,
    pub not_found: usize,
    pub failed: usize,
    pub withdrawn: usize,
    pub merged: Option<usize>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "observed={} pending={} already_stored={} stored={} not_found={} failed={} withdrawn={}",
            self.observed,
            self.pending,
            self.already_stored,
            self.stored,
            self.not_found,
            self.failed,
            self.withdrawn
        )?;
        if let Some(added) = self.merged {
            write!(f, " merged={added}")?;
        }
        Ok(())
    }
}

/// One collection run: discovery, fetch loop, ledger merge.
/// Collaborators are injected so each stage can run against fakes.
pub struct Collector<'a> {
    store: &'a dyn ObjectStore,
    index: &'a dyn ListingIndex,
    source: &'a dyn ListingSource,
    config: &'a RunConfig,
}

impl<'a> Collector<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        index: &'a dyn ListingIndex,
        source: &'a dyn ListingSource,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            store,
            index,
            source,
            config,
        }
    }

    /// Run every stage once
    pub async fn run(&self) -> Result<RunReport> {
        info!("Starting the data collection process...");
        let mut report = RunReport::default();

        let observed = self.discovery_pass(&mut report).await?;
        report.observed = observed;

        info!("Fetching listing pages from {}", self.source.source_name());
        let failures = self.fetch_pending(&mut report).await?;

        if !self.config.fold_failures {
            report.withdrawn = ledger::withdraw_from_pending(self.store, &failures)
                .await
                .context("Failed to withdraw failed IDs from the pending batch")?;
            if report.withdrawn > 0 {
                info!("{} failed IDs left out of this merge", report.withdrawn);
            }
        }

        report.merged = match ledger::merge_pending(self.store).await? {
            MergeOutcome::NothingPending => None,
            MergeOutcome::Merged {
                added,
                total,
                pending_retired,
            } => {
                if !pending_retired {
                    warn!("{} kept after merge; the next merge will fold it again", PENDING_KEY);
                }
                info!("Ledger now holds {} IDs", total);
                Some(added)
            }
        };

        info!("Data collection completed successfully. {}", report);
        Ok(report)
    }

    /// Enumerate the index and persist the IDs the ledger has not seen.
    /// Returns how many IDs were observed.
    pub async fn discovery_pass(&self, report: &mut RunReport) -> Result<usize> {
        let observed = self
            .index
            .discover_listing_ids()
            .await
            .context("Listing discovery failed")?;

        let completed = ledger::load_completed(self.store).await;
        let pending = ledger::pending_batch(&observed, &completed);
        info!("Total Number of {} IDs need to be scraped", pending.len());

        ledger::write_pending(self.store, &pending).await?;
        report.pending = pending.len();
        Ok(observed.len())
    }

    /// Fetch every pending listing that has no document for today yet.
    /// Returns the IDs that could not be collected.
    pub async fn fetch_pending(&self, report: &mut RunReport) -> Result<IdSet> {
        let Some(pending) = ledger::read_id_set(self.store, PENDING_KEY).await? else {
            info!("{} not found. Nothing to process.", PENDING_KEY);
            return Ok(IdSet::new());
        };
        info!("{} IDs read from {}", pending.len(), PENDING_KEY);

        let existing = self.stored_today().await;
        let todo = pending.difference(&existing);
        report.already_stored = pending.len() - todo.len();
        info!("{} unique IDs to process", todo.len());

        let mut failures = IdSet::new();
        for id in todo {
            match self.collect_listing(&id).await {
                ListingOutcome::Stored => report.stored += 1,
                ListingOutcome::NotFound => {
                    warn!(id = %id, "Not a valid property ID");
                    report.not_found += 1;
                    failures.insert(id);
                }
                ListingOutcome::Failed(e) => {
                    warn!(id = %id, "Failed to read property: {}", e);
                    report.failed += 1;
                    failures.insert(id);
                }
            }
        }

        Ok(failures)
    }

    /// Fetch one listing and store its document. Never fails the batch.
    pub async fn collect_listing(&self, id: &ListingId) -> ListingOutcome {
        let document = match self.source.fetch_listing(id).await {
            Ok(Some(document)) => document,
            Ok(None) => return ListingOutcome::NotFound,
            Err(e) => return ListingOutcome::Failed(e),
        };

        let json = match document.to_json() {
            Ok(json) => json,
            Err(e) => return ListingOutcome::Failed(e.into()),
        };

        let key = storage::document_key(self.config.run_date, id);
        match self.store.write_text(&key, &json).await {
            Ok(()) => {
                info!("Uploaded {} to {}", key, self.store.describe());
                ListingOutcome::Stored
            }
            Err(e) => ListingOutcome::Failed(FetchError::Store(e)),
        }
    }

    /// IDs that already have a document in today's partition. A listing
    /// failure is logged and treated as "none stored yet".
    async fn stored_today(&self) -> IdSet {
        let prefix = storage::document_prefix(self.config.run_date);
        let keys = match self.store.list_keys(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Error listing stored documents: {:#}", e);
                BTreeSet::new()
            }
        };

        keys.iter()
            .filter_map(|key| storage::id_from_document_key(&prefix, key))
            .collect()
    }
}
