use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;

/// User record normalized from a raw `users` row.
///
/// Unlike `projects`, the `users` table uses canonical column names, so no
/// mapping layer is involved here.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String, // opaque, stringified from whatever the row carries
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub company_id: Option<String>,
    pub created_at: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never exposed in JSON
}

impl User {
    /// Requires email and password_hash; everything else is optional.
    pub fn from_row(row: &Value) -> Option<User> {
        let email = row.get("email")?.as_str()?.to_string();
        let password_hash = row.get("password_hash")?.as_str()?.to_string();
        Some(User {
            id: stringify_id(row.get("id")),
            email,
            name: string_field(row, "name"),
            role: string_field(row, "role").unwrap_or_else(|| "member".to_string()),
            company_id: string_field(row, "company_id"),
            created_at: string_field(row, "created_at"),
            password_hash,
        })
    }
}

fn string_field(row: &Value, key: &str) -> Option<String> {
    row.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Ownership comparisons downstream are plain string equality, so the id is
/// stringified once here and passed around as text.
fn stringify_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Look up a user by login email. `None` means no usable row.
pub async fn find_by_email(state: &AppState, email: &str) -> anyhow::Result<Option<User>> {
    let rows = state
        .store
        .select("users", None, &[("email", email)], None)
        .await?;
    Ok(rows.first().and_then(User::from_row))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::testing::{state_with_store, users_schema, MemStore};

    #[tokio::test]
    async fn finds_user_by_email() {
        let store = Arc::new(MemStore::with_schema(users_schema()));
        store.seed(
            "users",
            vec![json!({
                "id": "u1",
                "email": "ana@example.com",
                "password_hash": "$argon2$fake",
                "role": "admin",
            })],
        );
        let state = state_with_store(store);

        let user = find_by_email(&state, "ana@example.com")
            .await
            .expect("select")
            .expect("user exists");
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, "admin");
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let store = Arc::new(MemStore::with_schema(users_schema()));
        let state = state_with_store(store);

        let user = find_by_email(&state, "ghost@example.com")
            .await
            .expect("select");
        assert!(user.is_none());
    }

    #[test]
    fn numeric_id_is_stringified() {
        let user = User::from_row(&json!({
            "id": 42,
            "email": "bo@example.com",
            "password_hash": "$argon2$fake",
        }))
        .expect("row is usable");
        assert_eq!(user.id, "42");
        assert_eq!(user.role, "member");
    }

    #[test]
    fn row_without_password_hash_is_unusable() {
        assert!(User::from_row(&json!({ "email": "bo@example.com" })).is_none());
    }
}
