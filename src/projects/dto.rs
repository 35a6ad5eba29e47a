use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed external shape of a design project.
///
/// Field values stay as raw JSON: the backing columns are discovered at
/// runtime, so their types are whatever the table holds, and an unresolved
/// field simply comes back null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignProject {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub user_id: Value,
    #[serde(default)]
    pub r#type: Value,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default)]
    pub updated_at: Value,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub r#type: String,
    pub title: String,
    pub content: Value, // arbitrary structured JSON
}

/// Partial update: absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub content: Option<Value>,
}
