use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{CatalogEntry, NormalizedName};
use crate::remote::RemoteCollection;
use crate::remote_error::RemoteError;

/// How a catalog is reconciled against the remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Insert entries whose normalized name is absent; never touch existing rows.
    SkipIfPresent,
    /// Insert or overwrite every entry by its surrogate id.
    ForceUpsertById,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SkipIfPresent => f.write_str("skip-if-present"),
            Strategy::ForceUpsertById => f.write_str("force-upsert-by-id"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Inserted,
    AlreadyExisted,
    Upserted,
    Failed(String),
}

/// Outcome of one catalog entry, reported as soon as the entry is processed.
#[derive(Debug, Clone)]
pub struct EntryReport<'a> {
    /// Zero-based position in the catalog.
    pub position: usize,
    pub entry: &'a CatalogEntry,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub inserted: usize,
    pub already_existed: usize,
    pub upserted: usize,
    pub errored: usize,
    pub total: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &EntryOutcome) {
        self.total += 1;
        match outcome {
            EntryOutcome::Inserted => self.inserted += 1,
            EntryOutcome::AlreadyExisted => self.already_existed += 1,
            EntryOutcome::Upserted => self.upserted += 1,
            EntryOutcome::Failed(_) => self.errored += 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Failed to list existing names: {0}")]
    Listing(#[source] RemoteError),
}

/// Runs a catalog against a remote collection, one entry at a time.
///
/// A failed write is reported and counted, never fatal. Only the initial name
/// listing of [`Strategy::SkipIfPresent`] can abort a run.
pub struct ReconcileService<R> {
    remote: R,
}

impl<R: RemoteCollection> ReconcileService<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub async fn run(
        &self,
        strategy: Strategy,
        entries: &[CatalogEntry],
    ) -> Result<RunSummary, ReconcileError> {
        self.run_with_progress(strategy, entries, |_| {}).await
    }

    #[instrument(skip(self, entries, on_entry), fields(strategy = %strategy, entries = entries.len()))]
    pub async fn run_with_progress<F>(
        &self,
        strategy: Strategy,
        entries: &[CatalogEntry],
        mut on_entry: F,
    ) -> Result<RunSummary, ReconcileError>
    where
        F: FnMut(&EntryReport<'_>),
    {
        let start_time = Instant::now();
        info!("Reconciling {} entries", entries.len());

        let mut existing = match strategy {
            Strategy::SkipIfPresent => Some(self.existing_names().await?),
            Strategy::ForceUpsertById => None,
        };

        let mut summary = RunSummary::default();
        for (position, entry) in entries.iter().enumerate() {
            let outcome = match existing.as_mut() {
                Some(names) => self.insert_if_absent(entry, names).await,
                None => self.upsert(entry).await,
            };

            summary.record(&outcome);
            on_entry(&EntryReport {
                position,
                entry,
                outcome,
            });
        }

        info!(
            inserted = summary.inserted,
            already_existed = summary.already_existed,
            upserted = summary.upserted,
            errored = summary.errored,
            total = summary.total,
            duration_secs = %format!("{:.2}", start_time.elapsed().as_secs_f64()),
            "Reconciliation finished"
        );
        if summary.errored > 0 {
            warn!("{} of {} entries failed", summary.errored, summary.total);
        }

        Ok(summary)
    }

    async fn existing_names(&self) -> Result<HashSet<NormalizedName>, ReconcileError> {
        let names = self.remote.list_names().await.map_err(|e| {
            error!(error = %e, "Failed to list existing names");
            ReconcileError::Listing(e)
        })?;

        let existing: HashSet<NormalizedName> =
            names.iter().map(|n| NormalizedName::new(n)).collect();
        info!("{} distinct names already stored", existing.len());
        Ok(existing)
    }

    // Existing rows are never refreshed here, even when catalog fields changed.
    async fn insert_if_absent(
        &self,
        entry: &CatalogEntry,
        existing: &mut HashSet<NormalizedName>,
    ) -> EntryOutcome {
        let key = entry.normalized_name();
        if existing.contains(&key) {
            debug!(name = %entry.name(), "Already exists, skipping");
            return EntryOutcome::AlreadyExisted;
        }

        match self.remote.insert(entry).await {
            Ok(()) => {
                debug!(name = %entry.name(), "Inserted");
                existing.insert(key);
                EntryOutcome::Inserted
            }
            Err(e) => {
                warn!(name = %entry.name(), error = %e, "Insert failed");
                EntryOutcome::Failed(e.to_string())
            }
        }
    }

    async fn upsert(&self, entry: &CatalogEntry) -> EntryOutcome {
        if entry.id().is_none() {
            let e = RemoteError::MissingId(entry.name().to_string());
            warn!(name = %entry.name(), error = %e, "Skipping upsert");
            return EntryOutcome::Failed(e.to_string());
        }

        match self.remote.upsert_by_id(entry).await {
            Ok(()) => {
                debug!(name = %entry.name(), id = ?entry.id(), "Upserted");
                EntryOutcome::Upserted
            }
            Err(e) => {
                warn!(name = %entry.name(), error = %e, "Upsert failed");
                EntryOutcome::Failed(e.to_string())
            }
        }
    }
}
