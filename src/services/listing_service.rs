use std::collections::BTreeMap;

use tracing::{info, instrument};

use crate::catalog::NormalizedName;
use crate::remote::{RemoteCollection, RemoteRow};
use crate::remote_error::RemoteError;

/// Read-only view over a remote collection, for inspection tools.
pub struct ListingService<R> {
    remote: R,
}

impl<R: RemoteCollection> ListingService<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    #[instrument(skip(self))]
    pub async fn rows(&self) -> Result<Vec<RemoteRow>, RemoteError> {
        let rows = self.remote.list_rows().await?;
        info!("Listed {} rows", rows.len());
        Ok(rows)
    }

    /// Stored names paired with the key the skip-if-present strategy dedups on.
    #[instrument(skip(self))]
    pub async fn names(&self) -> Result<Vec<(String, NormalizedName)>, RemoteError> {
        let names = self.remote.list_names().await?;
        info!("Listed {} names", names.len());
        Ok(names
            .into_iter()
            .map(|name| {
                let key = NormalizedName::new(&name);
                (name, key)
            })
            .collect())
    }
}

/// Groups of stored names that collapse to the same normalized name.
pub fn duplicate_groups(names: &[(String, NormalizedName)]) -> Vec<(NormalizedName, Vec<String>)> {
    let mut by_key: BTreeMap<&NormalizedName, Vec<String>> = BTreeMap::new();
    for (name, key) in names {
        by_key.entry(key).or_default().push(name.clone());
    }

    by_key
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(key, group)| (key.clone(), group))
        .collect()
}

pub fn format_price_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min == max => format!("R$ {min:.2}"),
        (Some(min), Some(max)) => format!("R$ {min:.2} - R$ {max:.2}"),
        (Some(min), None) => format!("a partir de R$ {min:.2}"),
        (None, Some(max)) => format!("até R$ {max:.2}"),
        (None, None) => "sem preço".to_string(),
    }
}
