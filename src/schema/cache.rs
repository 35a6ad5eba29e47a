use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::datastore::DataStore;
use crate::error::AppError;

/// Process-wide memo of the data API's self-describing schema document.
///
/// The document is fetched once and reused for the lifetime of the process
/// unless `invalidate` is called. Racing first fetches are tolerated: the
/// content is idempotent, so last write wins.
pub struct SchemaCache {
    store: Arc<dyn DataStore>,
    document: RwLock<Option<Arc<Value>>>,
}

impl SchemaCache {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            document: RwLock::new(None),
        }
    }

    /// The cached schema document, fetching it on first use.
    ///
    /// A failed or malformed fetch is an error, never an empty document:
    /// pretending the backend has no columns would make the mapper treat
    /// every table as missing everything.
    pub async fn document(&self) -> Result<Arc<Value>, AppError> {
        if let Some(document) = self.document.read().await.clone() {
            return Ok(document);
        }

        let fetched = self.store.fetch_schema().await.map_err(|e| {
            error!(error = %e, "schema description fetch failed");
            AppError::SchemaUnavailable(e.to_string())
        })?;
        if !fetched.is_object() {
            return Err(AppError::SchemaUnavailable(
                "schema description is not a JSON object".into(),
            ));
        }

        debug!("schema description cached");
        let document = Arc::new(fetched);
        *self.document.write().await = Some(document.clone());
        Ok(document)
    }

    /// Column names of `table`, or an empty set when the table is absent
    /// from the description (a valid signal, distinct from a failed fetch).
    pub async fn table_columns(&self, table: &str) -> Result<HashSet<String>, AppError> {
        let document = self.document().await?;
        Ok(columns_from_document(&document, table))
    }

    /// Drop the memo; the next call refetches.
    pub async fn invalidate(&self) {
        *self.document.write().await = None;
    }
}

/// The description comes in one of two known shapes: the legacy Swagger
/// `definitions` map or the OpenAPI 3 `components.schemas` map.
fn columns_from_document(document: &Value, table: &str) -> HashSet<String> {
    for prefix in ["/definitions/", "/components/schemas/"] {
        let pointer = format!("{}{}/properties", prefix, table);
        if let Some(properties) = document.pointer(&pointer).and_then(Value::as_object) {
            return properties.keys().cloned().collect();
        }
    }
    HashSet::new()
}
