//! Catalogs bundled with the binary.

use crate::catalog::{parse_catalog, CatalogEntry, CatalogError};

const NEW_LISTINGS: &str = include_str!("../../catalogs/new_listings.json");
const CURATED_LISTINGS: &str = include_str!("../../catalogs/curated_listings.json");

/// Listings that may not exist remotely yet. They carry no surrogate id, the
/// backend assigns one on insert.
pub fn new_listings() -> Result<Vec<CatalogEntry>, CatalogError> {
    parse_catalog(NEW_LISTINGS)
}

/// Curated listings keyed by surrogate id, authoritative over the remote rows
/// with the same ids.
pub fn curated_listings() -> Result<Vec<CatalogEntry>, CatalogError> {
    parse_catalog(CURATED_LISTINGS)
}
