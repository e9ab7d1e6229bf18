use serde::{Deserialize, Serialize};

use crate::catalog::NormalizedName;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    #[error("Entry name must not be blank")]
    BlankName,
    #[error("Entry '{name}' has a blank {field}")]
    BlankField { name: String, field: &'static str },
    #[error("Entry '{0}' has a blank surrogate id")]
    BlankId(String),
    #[error("Entry '{name}' has an invalid price {value} (must be finite and non-negative)")]
    InvalidPrice { name: String, value: f64 },
    #[error("Entry '{name}' has price_min {min} greater than price_max {max}")]
    PriceRange { name: String, min: f64, max: f64 },
}

/// Raw field set of a catalog entry, as authored in catalog files and as sent
/// to the backend. Column names follow the remote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "local")]
    pub location: String,
    #[serde(rename = "duracao")]
    pub duration: String,
    #[serde(rename = "preco_min")]
    pub price_min: f64,
    #[serde(rename = "preco_max")]
    pub price_max: f64,
    pub includes: String,
    #[serde(rename = "horarios", default)]
    pub schedule: Option<String>,
}

/// One sellable offering. Always valid: the only way to obtain one is through
/// [`CatalogEntry::new`], which checks names, prices and the price range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntryFields", into = "EntryFields")]
pub struct CatalogEntry {
    fields: EntryFields,
}

impl CatalogEntry {
    pub fn new(fields: EntryFields) -> Result<Self, EntryError> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(EntryError::BlankName);
        }

        let required = [
            ("category", &fields.category),
            ("description", &fields.description),
            ("location", &fields.location),
            ("duration", &fields.duration),
            ("includes", &fields.includes),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(EntryError::BlankField {
                    name: name.to_string(),
                    field,
                });
            }
        }

        if let Some(id) = &fields.id {
            if id.trim().is_empty() {
                return Err(EntryError::BlankId(name.to_string()));
            }
        }

        for value in [fields.price_min, fields.price_max] {
            if !value.is_finite() || value < 0.0 {
                return Err(EntryError::InvalidPrice {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if fields.price_min > fields.price_max {
            return Err(EntryError::PriceRange {
                name: name.to_string(),
                min: fields.price_min,
                max: fields.price_max,
            });
        }

        Ok(Self { fields })
    }

    /// Copy of this entry carrying the given surrogate id. The id goes
    /// through the same checks as [`CatalogEntry::new`].
    pub fn with_id(&self, id: impl Into<String>) -> Result<Self, EntryError> {
        let mut fields = self.fields.clone();
        fields.id = Some(id.into());
        CatalogEntry::new(fields)
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn normalized_name(&self) -> NormalizedName {
        NormalizedName::new(&self.fields.name)
    }

    pub fn category(&self) -> &str {
        &self.fields.category
    }

    pub fn description(&self) -> &str {
        &self.fields.description
    }

    pub fn location(&self) -> &str {
        &self.fields.location
    }

    pub fn duration(&self) -> &str {
        &self.fields.duration
    }

    pub fn price_min(&self) -> f64 {
        self.fields.price_min
    }

    pub fn price_max(&self) -> f64 {
        self.fields.price_max
    }

    pub fn includes(&self) -> &str {
        &self.fields.includes
    }

    pub fn schedule(&self) -> Option<&str> {
        self.fields.schedule.as_deref()
    }
}

impl TryFrom<EntryFields> for CatalogEntry {
    type Error = EntryError;

    fn try_from(fields: EntryFields) -> Result<Self, Self::Error> {
        CatalogEntry::new(fields)
    }
}

impl From<CatalogEntry> for EntryFields {
    fn from(entry: CatalogEntry) -> Self {
        entry.fields
    }
}
