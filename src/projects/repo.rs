use anyhow::Context;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;

use crate::{
    datastore::OrderBy,
    error::AppError,
    schema::mapping::{TableMapping, PROJECT_FIELDS, PROJECT_TABLE},
    state::AppState,
};

use super::dto::{CreateProjectRequest, DesignProject, UpdateProjectRequest};

/// Every operation starts here: discover the table's columns, then resolve
/// the logical fields against them.
async fn project_mapping(state: &AppState) -> Result<TableMapping, AppError> {
    let columns = state.schema.table_columns(PROJECT_TABLE).await?;
    Ok(TableMapping::build(PROJECT_TABLE, PROJECT_FIELDS, &columns))
}

fn to_project(mapping: &TableMapping, row: &Value) -> DesignProject {
    serde_json::from_value(mapping.row_to_external(row)).unwrap_or_default()
}

fn now_rfc3339() -> Result<String, AppError> {
    let stamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format utc timestamp")?;
    Ok(stamp)
}

/// Projects owned by `owner_id`, newest change first when the table has an
/// updated-at column, backend default order otherwise.
pub async fn list(state: &AppState, owner_id: &str) -> Result<Vec<DesignProject>, AppError> {
    let mapping = project_mapping(state).await?;
    let user_col = mapping.require_physical("user")?;

    let order = mapping.physical("updated_at").map(OrderBy::desc);
    let rows = state
        .store
        .select(PROJECT_TABLE, None, &[(user_col, owner_id)], order.as_ref())
        .await?;
    debug!(owner = %owner_id, count = rows.len(), "listed projects");
    Ok(rows.iter().map(|row| to_project(&mapping, row)).collect())
}

/// Insert a project. Never a partial insert: if any required logical field
/// has no backing column the whole call fails up front.
pub async fn create(
    state: &AppState,
    owner_id: &str,
    request: &CreateProjectRequest,
) -> Result<DesignProject, AppError> {
    let mapping = project_mapping(state).await?;
    mapping.require(&["user", "type", "title", "content"])?;

    let row = mapping.external_to_row(vec![
        ("user", Value::String(owner_id.to_string())),
        ("type", Value::String(request.r#type.clone())),
        ("title", Value::String(request.title.clone())),
        ("content", request.content.clone()),
    ])?;

    let inserted = state.store.insert(PROJECT_TABLE, &row).await?;
    Ok(to_project(&mapping, &inserted))
}

/// Apply a partial update after the ownership check. The updated-at column,
/// when the table has one, is stamped on every update — an empty patch still
/// touches the row.
pub async fn update(
    state: &AppState,
    project_id: &str,
    owner_id: &str,
    patch: &UpdateProjectRequest,
) -> Result<DesignProject, AppError> {
    let mapping = project_mapping(state).await?;
    let user_col = mapping.require_physical("user")?;
    let id_col = mapping.lookup_key("id");

    let stored_owner = owner_of(state, id_col, user_col, project_id).await?;
    ensure_owner(&stored_owner, owner_id, "update")?;

    let mut fields: Vec<(&str, Value)> = Vec::new();
    if let Some(title) = &patch.title {
        fields.push(("title", Value::String(title.clone())));
    }
    if let Some(content) = &patch.content {
        fields.push(("content", content.clone()));
    }
    let mut row = mapping.external_to_row(fields)?;
    if let Some(updated_col) = mapping.physical("updated_at") {
        row.insert(updated_col.to_string(), Value::String(now_rfc3339()?));
    }

    let updated = state
        .store
        .update(PROJECT_TABLE, (id_col, project_id), &row)
        .await?;
    match updated.first() {
        Some(row) => Ok(to_project(&mapping, row)),
        None => Err(AppError::Internal(anyhow::anyhow!(
            "update of {PROJECT_TABLE} returned no data"
        ))),
    }
}

/// Delete after the same ownership check sequence as update.
pub async fn delete(state: &AppState, project_id: &str, owner_id: &str) -> Result<(), AppError> {
    let mapping = project_mapping(state).await?;
    let user_col = mapping.require_physical("user")?;
    let id_col = mapping.lookup_key("id");

    let stored_owner = owner_of(state, id_col, user_col, project_id).await?;
    ensure_owner(&stored_owner, owner_id, "delete")?;

    state
        .store
        .delete(PROJECT_TABLE, (id_col, project_id))
        .await?;
    Ok(())
}

/// Ownership probe: read just the ownership column of the addressed row.
/// This and the following mutation are two separate round trips; the window
/// between them is an accepted race.
async fn owner_of(
    state: &AppState,
    id_col: &str,
    user_col: &str,
    project_id: &str,
) -> Result<Value, AppError> {
    let rows = state
        .store
        .select(
            PROJECT_TABLE,
            Some(user_col),
            &[(id_col, project_id)],
            None,
        )
        .await?;
    match rows.first() {
        Some(row) => Ok(row.get(user_col).cloned().unwrap_or(Value::Null)),
        None => Err(AppError::NotFound("Project not found".to_string())),
    }
}

/// Strict string equality: a non-string owner value never matches, so
/// callers must pass already-stringified ids consistently.
fn ensure_owner(stored: &Value, owner_id: &str, action: &str) -> Result<(), AppError> {
    if stored.as_str() != Some(owner_id) {
        return Err(AppError::Forbidden(format!(
            "Not authorized to {action} this project"
        )));
    }
    Ok(())
}
