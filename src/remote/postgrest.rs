use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::catalog::CatalogEntry;
use crate::config::Config;
use crate::remote::{RemoteCollection, RemoteRow};
use crate::remote_error::RemoteError;

const ROW_COLUMNS: &str = "id,nome,categoria,preco_min,preco_max";

#[derive(Debug, Deserialize)]
struct NameRow {
    nome: Option<String>,
}

/// Remote collection backed by a PostgREST table (`/rest/v1/<table>`).
///
/// Every request is authenticated with the service-role key, sent both as the
/// `apikey` header and as a bearer token.
#[derive(Clone)]
pub struct PostgrestCollection {
    client: reqwest::Client,
    rest_url: String,
    table: String,
    api_key: String,
    page_size: usize,
    max_rows: usize,
}

impl PostgrestCollection {
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rest_url: config.rest_url(),
            table: config.table.clone(),
            api_key: config.service_role_key.clone(),
            page_size: config.page_size.max(1),
            max_rows: config.max_listed_rows,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, self.table)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check_status(&self, response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            table = %self.table,
            status = status.as_u16(),
            body = %body,
            "Remote request failed"
        );
        Err(RemoteError::status(status.as_u16(), &self.table, &body))
    }

    /// Fetch every row matching `select`, one page of `page_size` rows at a
    /// time, until a short page comes back.
    ///
    /// `order` must be a total order over the table; offset paging over ties
    /// can skip or repeat rows.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        select: &str,
        order: &str,
    ) -> Result<Vec<T>, RemoteError> {
        let mut rows = Vec::new();
        let mut offset: usize = 0;

        loop {
            let query = [
                ("select", select.to_string()),
                ("order", order.to_string()),
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ];

            debug!("Requesting page at offset {}", offset);
            let response = self.request(Method::GET).query(&query).send().await?;
            let response = self.check_status(response).await?;
            let body = response.text().await?;
            let page: Vec<T> =
                serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))?;

            let fetched = page.len();
            rows.extend(page);
            debug!("Fetched {} rows (total so far: {})", fetched, rows.len());

            if fetched < self.page_size {
                break;
            }
            offset += self.page_size;
            if offset >= self.max_rows {
                warn!("Listing {} exceeded {} rows", self.table, self.max_rows);
                return Err(RemoteError::ListingTooLarge {
                    table: self.table.clone(),
                    max_rows: self.max_rows,
                });
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl RemoteCollection for PostgrestCollection {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn list_names(&self) -> Result<Vec<String>, RemoteError> {
        let rows: Vec<NameRow> = self.fetch_all("nome", "id").await?;
        Ok(rows.into_iter().filter_map(|r| r.nome).collect())
    }

    #[instrument(skip(self, entry), fields(table = %self.table, name = %entry.name()))]
    async fn insert(&self, entry: &CatalogEntry) -> Result<(), RemoteError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await?;
        self.check_status(response).await?;
        debug!("Inserted row");
        Ok(())
    }

    #[instrument(skip(self, entry), fields(table = %self.table, name = %entry.name()))]
    async fn upsert_by_id(&self, entry: &CatalogEntry) -> Result<(), RemoteError> {
        if entry.id().is_none() {
            return Err(RemoteError::MissingId(entry.name().to_string()));
        }

        let response = self
            .request(Method::POST)
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(entry)
            .send()
            .await?;
        self.check_status(response).await?;
        debug!("Upserted row");
        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn list_rows(&self) -> Result<Vec<RemoteRow>, RemoteError> {
        self.fetch_all(ROW_COLUMNS, "nome,id").await
    }
}
