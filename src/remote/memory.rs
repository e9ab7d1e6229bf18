use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::catalog::{CatalogEntry, EntryError, NormalizedName};
use crate::remote::{RemoteCollection, RemoteRow};
use crate::remote_error::RemoteError;

const TABLE: &str = "memory";

#[derive(Default)]
struct State {
    rows: Vec<CatalogEntry>,
    next_id: u64,
    writes: usize,
    failing_names: HashSet<NormalizedName>,
    fail_listing: bool,
}

impl State {
    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }

    fn check_write(&mut self, entry: &CatalogEntry) -> Result<(), RemoteError> {
        self.writes += 1;
        if self.failing_names.contains(&entry.normalized_name()) {
            return Err(RemoteError::status(400, TABLE, "simulated write failure"));
        }
        Ok(())
    }
}

/// In-process remote collection with the same semantics as the PostgREST
/// table: inserts always add a row, upserts replace the row with the same id.
/// Writes for chosen names can be made to fail.
#[derive(Default)]
pub struct MemoryCollection {
    state: Mutex<State>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows; rows without an id get one assigned.
    pub fn with_rows(rows: Vec<CatalogEntry>) -> Result<Self, EntryError> {
        let mut state = State::default();
        for row in rows {
            let row = match row.id() {
                Some(_) => row,
                None => {
                    let id = state.assign_id();
                    row.with_id(id)?
                }
            };
            state.rows.push(row);
        }
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Make every write of an entry with this (normalized) name fail.
    pub async fn fail_writes_for(&self, name: &str) {
        self.state
            .lock()
            .await
            .failing_names
            .insert(NormalizedName::new(name));
    }

    pub async fn fail_listing(&self) {
        self.state.lock().await.fail_listing = true;
    }

    /// Snapshot of the stored rows in storage order.
    pub async fn rows(&self) -> Vec<CatalogEntry> {
        self.state.lock().await.rows.clone()
    }

    /// Number of write attempts seen, failed ones included.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }
}

#[async_trait]
impl RemoteCollection for MemoryCollection {
    async fn list_names(&self) -> Result<Vec<String>, RemoteError> {
        let state = self.state.lock().await;
        if state.fail_listing {
            return Err(RemoteError::status(503, TABLE, "simulated listing failure"));
        }
        Ok(state.rows.iter().map(|r| r.name().to_string()).collect())
    }

    async fn insert(&self, entry: &CatalogEntry) -> Result<(), RemoteError> {
        let mut state = self.state.lock().await;
        state.check_write(entry)?;

        let row = match entry.id() {
            Some(id) if state.rows.iter().any(|r| r.id() == Some(id)) => {
                return Err(RemoteError::status(409, TABLE, "duplicate key value"));
            }
            Some(_) => entry.clone(),
            None => {
                let id = state.assign_id();
                entry
                    .with_id(id)
                    .map_err(|e| RemoteError::status(400, TABLE, &e.to_string()))?
            }
        };
        state.rows.push(row);
        Ok(())
    }

    async fn upsert_by_id(&self, entry: &CatalogEntry) -> Result<(), RemoteError> {
        let id = entry
            .id()
            .ok_or_else(|| RemoteError::MissingId(entry.name().to_string()))?;

        let mut state = self.state.lock().await;
        state.check_write(entry)?;

        match state.rows.iter().position(|r| r.id() == Some(id)) {
            Some(index) => state.rows[index] = entry.clone(),
            None => state.rows.push(entry.clone()),
        }
        Ok(())
    }

    async fn list_rows(&self) -> Result<Vec<RemoteRow>, RemoteError> {
        let state = self.state.lock().await;
        if state.fail_listing {
            return Err(RemoteError::status(503, TABLE, "simulated listing failure"));
        }

        let mut rows: Vec<RemoteRow> = state
            .rows
            .iter()
            .map(|r| RemoteRow {
                id: r.id().unwrap_or_default().to_string(),
                name: r.name().to_string(),
                category: Some(r.category().to_string()),
                price_min: Some(r.price_min()),
                price_max: Some(r.price_max()),
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }
}
