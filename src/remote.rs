pub mod memory;
pub mod postgrest;

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::CatalogEntry;
use crate::remote_error::RemoteError;

pub use memory::MemoryCollection;
pub use postgrest::PostgrestCollection;

/// Projection of a remote row used for inspection listings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteRow {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "preco_min", default)]
    pub price_min: Option<f64>,
    #[serde(rename = "preco_max", default)]
    pub price_max: Option<f64>,
}

/// The persisted collection of catalog entries, as seen by the runner.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Names of every row currently stored, as stored.
    async fn list_names(&self) -> Result<Vec<String>, RemoteError>;

    /// Insert a new row. The backend assigns an id when the entry has none.
    async fn insert(&self, entry: &CatalogEntry) -> Result<(), RemoteError>;

    /// Insert or fully overwrite the row with the entry's surrogate id.
    async fn upsert_by_id(&self, entry: &CatalogEntry) -> Result<(), RemoteError>;

    /// Every row, ordered by name.
    async fn list_rows(&self) -> Result<Vec<RemoteRow>, RemoteError>;
}
