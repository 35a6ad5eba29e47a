//! Test doubles: an in-memory data API and a canned LLM, wired into an
//! `AppState` the same way the real collaborators are.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::config::{AppConfig, DataApiConfig, JwtConfig, LlmConfig};
use crate::datastore::{DataStore, OrderBy};
use crate::generate::llm::LlmClient;
use crate::state::AppState;

/// In-memory stand-in for the PostgREST data API.
///
/// `schema: None` simulates an unreachable schema endpoint; seeded tables
/// behave like their REST counterparts for equality filters, ordering and
/// representation-returning writes.
#[derive(Default)]
pub struct MemStore {
    pub schema: Mutex<Option<Value>>,
    pub tables: Mutex<HashMap<String, Vec<Value>>>,
    pub schema_fetches: AtomicUsize,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(document: Value) -> Self {
        let store = Self::default();
        *store.schema.lock().unwrap() = Some(document);
        store
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

fn matches(row: &Value, filters: &[(&str, &str)]) -> bool {
    filters.iter().all(|(column, value)| match row.get(*column) {
        Some(Value::String(s)) => s == value,
        Some(Value::Number(n)) => n.to_string() == *value,
        Some(Value::Bool(b)) => b.to_string() == *value,
        _ => false,
    })
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn project_columns(row: &Value, columns: &str) -> Value {
    let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
    let mut out = Map::new();
    if let Some(object) = row.as_object() {
        for key in wanted {
            if let Some(value) = object.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
    }
    Value::Object(out)
}

#[async_trait]
impl DataStore for MemStore {
    async fn fetch_schema(&self) -> anyhow::Result<Value> {
        self.schema_fetches.fetch_add(1, Ordering::SeqCst);
        self.schema
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("schema endpoint unreachable"))
    }

    async fn select(
        &self,
        table: &str,
        columns: Option<&str>,
        filters: &[(&str, &str)],
        order: Option<&OrderBy>,
    ) -> anyhow::Result<Vec<Value>> {
        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| matches(row, filters))
            .collect();
        if let Some(order) = order {
            rows.sort_by_key(|row| sort_key(row, &order.column));
            if order.descending {
                rows.reverse();
            }
        }
        if let Some(columns) = columns {
            rows = rows
                .iter()
                .map(|row| project_columns(row, columns))
                .collect();
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: &Map<String, Value>) -> anyhow::Result<Value> {
        let mut stored = row.clone();
        stored
            .entry("id".to_string())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        let stored = Value::Object(stored);
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        filter: (&str, &str),
        patch: &Map<String, Value>,
    ) -> anyhow::Result<Vec<Value>> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if matches(row, &[filter]) {
                if let Some(object) = row.as_object_mut() {
                    for (key, value) in patch {
                        object.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: (&str, &str)) -> anyhow::Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !matches(row, &[filter]));
        }
        Ok(())
    }
}

/// LLM double that always answers with the same text.
pub struct CannedLlm {
    reply: String,
}

impl CannedLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

impl Default for CannedLlm {
    fn default() -> Self {
        Self::new("{\"slides\":[]}")
    }
}

#[async_trait]
impl LlmClient for CannedLlm {
    async fn generate(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
        Ok(self.reply.clone())
    }
}

/// Schema document exposing a `projects` table with the given column names.
pub fn project_schema(columns: &[&str]) -> Value {
    let properties: Map<String, Value> = columns
        .iter()
        .map(|column| (column.to_string(), json!({})))
        .collect();
    json!({
        "components": {
            "schemas": {
                "projects": { "properties": properties }
            }
        }
    })
}

/// Schema document for the canonical `users` table.
pub fn users_schema() -> Value {
    json!({
        "components": {
            "schemas": {
                "users": {
                    "properties": {
                        "id": {}, "email": {}, "password_hash": {},
                        "name": {}, "role": {}, "company_id": {}, "created_at": {}
                    }
                }
            }
        }
    })
}

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        data_api: DataApiConfig {
            base_url: "http://data.local".into(),
            api_key: "test-key".into(),
            timeout_secs: 5,
        },
        jwt: JwtConfig {
            secret: "test-secret".into(),
            ttl_minutes: 30,
        },
        llm: LlmConfig {
            base_url: "http://llm.local".into(),
            api_key: "test-key".into(),
            model: "qwen-plus".into(),
            timeout_secs: 5,
        },
    })
}

pub fn state_with_store(store: Arc<MemStore>) -> AppState {
    AppState::from_parts(store, Arc::new(CannedLlm::default()), test_config())
}

pub fn state_with_llm(llm: Arc<CannedLlm>) -> AppState {
    AppState::from_parts(Arc::new(MemStore::new()), llm, test_config())
}
