/// Maximum number of response body characters kept in a status error.
pub const BODY_PREVIEW_CHARS: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Remote returned {status} on {table}: {body}")]
    Status {
        status: u16,
        table: String,
        body: String,
    },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Listing {table} reached {max_rows} rows without a short page")]
    ListingTooLarge { table: String, max_rows: usize },
    #[error("Entry '{0}' has no surrogate id to upsert on")]
    MissingId(String),
}

impl RemoteError {
    pub fn status(status: u16, table: &str, body: &str) -> Self {
        RemoteError::Status {
            status,
            table: table.to_string(),
            body: body.chars().take(BODY_PREVIEW_CHARS).collect(),
        }
    }
}
