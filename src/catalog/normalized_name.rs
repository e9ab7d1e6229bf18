use std::fmt;

/// Case-insensitive, whitespace-collapsed projection of an entry name.
///
/// Only used as a deduplication key; it is recomputed on demand and never
/// sent to the backend.
///
/// # Examples
///
/// ```
/// use tour_catalog_sync::catalog::NormalizedName;
///
/// assert_eq!(
///     NormalizedName::new("  PASSEIO de   Buggy "),
///     NormalizedName::new("passeio de buggy"),
/// );
/// assert_eq!(NormalizedName::new("TRANSFER\tEXCLUSIVO").as_str(), "transfer exclusivo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn new(name: &str) -> Self {
        let lowered = name.to_lowercase();
        Self(lowered.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
