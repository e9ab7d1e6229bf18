pub mod entry;
pub mod normalized_name;
pub mod seed;

use std::path::Path;

use tracing::{debug, instrument};

pub use entry::{CatalogEntry, EntryError, EntryFields};
pub use normalized_name::NormalizedName;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON array of entries. Every entry is validated; the first invalid
/// one fails the whole catalog.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
    debug!("Parsed catalog with {} entries", entries.len());
    Ok(entries)
}

#[instrument(fields(path = %path.display()))]
pub fn load_catalog_file(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&json)
}
