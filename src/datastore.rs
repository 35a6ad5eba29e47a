use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::DataApiConfig;

/// Schema introspection must fail fast when the data API is down.
const SCHEMA_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Ordering for a select, rendered as PostgREST `order=column.desc`.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Table-scoped access to the backing data API.
///
/// Only equality filters and single-column ordering are needed; anything
/// fancier belongs to the data API itself.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch the API's self-describing schema document (OpenAPI JSON).
    async fn fetch_schema(&self) -> anyhow::Result<Value>;

    async fn select(
        &self,
        table: &str,
        columns: Option<&str>,
        filters: &[(&str, &str)],
        order: Option<&OrderBy>,
    ) -> anyhow::Result<Vec<Value>>;

    /// Insert one row and return its stored representation.
    async fn insert(&self, table: &str, row: &Map<String, Value>) -> anyhow::Result<Value>;

    /// Patch all rows matching the filter; returns the updated rows.
    async fn update(
        &self,
        table: &str,
        filter: (&str, &str),
        patch: &Map<String, Value>,
    ) -> anyhow::Result<Vec<Value>>;

    async fn delete(&self, table: &str, filter: (&str, &str)) -> anyhow::Result<()>;
}

/// PostgREST/Supabase client over reqwest.
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(config: &DataApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build data api client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

fn order_param(order: &OrderBy) -> String {
    format!(
        "{}.{}",
        order.column,
        if order.descending { "desc" } else { "asc" }
    )
}

fn build_query(
    columns: Option<&str>,
    filters: &[(&str, &str)],
    order: Option<&OrderBy>,
) -> Vec<(String, String)> {
    let mut query = vec![("select".to_string(), columns.unwrap_or("*").to_string())];
    for (column, value) in filters {
        query.push(((*column).to_string(), format!("eq.{}", value)));
    }
    if let Some(order) = order {
        query.push(("order".to_string(), order_param(order)));
    }
    query
}

#[async_trait]
impl DataStore for PostgrestStore {
    async fn fetch_schema(&self) -> anyhow::Result<Value> {
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self
            .authed(self.http.get(&url))
            .timeout(SCHEMA_FETCH_TIMEOUT)
            .send()
            .await
            .context("schema description request failed")?
            .error_for_status()
            .context("schema description request rejected")?;
        let document = response
            .json::<Value>()
            .await
            .context("schema description is not valid JSON")?;
        Ok(document)
    }

    async fn select(
        &self,
        table: &str,
        columns: Option<&str>,
        filters: &[(&str, &str)],
        order: Option<&OrderBy>,
    ) -> anyhow::Result<Vec<Value>> {
        let rows = self
            .authed(self.http.get(self.table_url(table)))
            .query(&build_query(columns, filters, order))
            .send()
            .await
            .with_context(|| format!("select from {}", table))?
            .error_for_status()
            .with_context(|| format!("select from {} rejected", table))?
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("select from {} returned malformed rows", table))?;
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: &Map<String, Value>) -> anyhow::Result<Value> {
        let mut rows = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .with_context(|| format!("insert into {}", table))?
            .error_for_status()
            .with_context(|| format!("insert into {} rejected", table))?
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("insert into {} returned malformed rows", table))?;
        if rows.is_empty() {
            anyhow::bail!("insert into {} returned no data", table);
        }
        Ok(rows.remove(0))
    }

    async fn update(
        &self,
        table: &str,
        filter: (&str, &str),
        patch: &Map<String, Value>,
    ) -> anyhow::Result<Vec<Value>> {
        let rows = self
            .authed(self.http.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&build_query(None, &[filter], None))
            .json(patch)
            .send()
            .await
            .with_context(|| format!("update {}", table))?
            .error_for_status()
            .with_context(|| format!("update {} rejected", table))?
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("update {} returned malformed rows", table))?;
        Ok(rows)
    }

    async fn delete(&self, table: &str, filter: (&str, &str)) -> anyhow::Result<()> {
        self.authed(self.http.delete(self.table_url(table)))
            .query(&build_query(None, &[filter], None))
            .send()
            .await
            .with_context(|| format!("delete from {}", table))?
            .error_for_status()
            .with_context(|| format!("delete from {} rejected", table))?;
        Ok(())
    }
}
