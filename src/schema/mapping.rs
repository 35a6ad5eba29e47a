use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::AppError;

/// One logical field of an entity: the stable name the external API speaks,
/// and the physical column names that may back it, in priority order.
pub struct FieldCandidates {
    pub logical: &'static str,
    /// Key used in the external JSON shape (and as the graceful-degradation
    /// lookup key when no candidate resolves).
    pub external: &'static str,
    pub candidates: &'static [&'static str],
}

pub const PROJECT_TABLE: &str = "projects";

/// Candidate priority is pinned: tests rely on the first present name
/// winning, so reordering these lists is a behavior change.
pub const PROJECT_FIELDS: &[FieldCandidates] = &[
    FieldCandidates {
        logical: "id",
        external: "id",
        candidates: &["id"],
    },
    FieldCandidates {
        logical: "user",
        external: "user_id",
        candidates: &["user_id", "owner_id", "created_by", "author_id", "uid"],
    },
    FieldCandidates {
        logical: "type",
        external: "type",
        candidates: &["type", "kind", "category"],
    },
    FieldCandidates {
        logical: "title",
        external: "title",
        candidates: &["name", "title"],
    },
    FieldCandidates {
        logical: "content",
        external: "content",
        candidates: &["settings", "content", "data", "payload"],
    },
    FieldCandidates {
        logical: "created_at",
        external: "created_at",
        candidates: &["created_at", "createdAt", "created_time"],
    },
    FieldCandidates {
        logical: "updated_at",
        external: "updated_at",
        candidates: &["updated_at", "updatedAt", "updated_time", "modified_at"],
    },
];

/// First candidate present in the discovered column set, or `None` when the
/// table backs none of them.
pub fn pick_column(columns: &HashSet<String>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| columns.contains(**candidate))
        .map(|candidate| (*candidate).to_string())
}

/// Resolved mapping between an entity's logical fields and a table's actual
/// columns. `None` means no candidate matched; consumers must handle it.
pub struct TableMapping {
    table: &'static str,
    fields: Vec<(&'static FieldCandidates, Option<String>)>,
}

impl TableMapping {
    pub fn build(
        table: &'static str,
        fields: &'static [FieldCandidates],
        columns: &HashSet<String>,
    ) -> Self {
        let fields = fields
            .iter()
            .map(|field| (field, pick_column(columns, field.candidates)))
            .collect();
        Self { table, fields }
    }

    fn field(&self, logical: &str) -> Option<&(&'static FieldCandidates, Option<String>)> {
        self.fields.iter().find(|(field, _)| field.logical == logical)
    }

    /// Physical column backing `logical`, if any candidate resolved.
    pub fn physical(&self, logical: &str) -> Option<&str> {
        self.field(logical)
            .and_then(|(_, physical)| physical.as_deref())
    }

    /// Key to read `logical` from a row: the resolved column, or the literal
    /// external key so lookups degrade to null instead of crashing.
    pub fn lookup_key<'a>(&'a self, logical: &'a str) -> &'a str {
        match self.field(logical) {
            Some((_, Some(physical))) => physical.as_str(),
            Some((field, None)) => field.external,
            None => logical,
        }
    }

    /// Physical column for `logical`, or `SchemaMismatch` naming it.
    pub fn require_physical(&self, logical: &str) -> Result<&str, AppError> {
        self.physical(logical).ok_or_else(|| AppError::SchemaMismatch {
            table: self.table.to_string(),
            fields: vec![logical.to_string()],
        })
    }

    /// Check that every listed logical field resolved, naming all the ones
    /// that did not in a single error.
    pub fn require(&self, logicals: &[&str]) -> Result<(), AppError> {
        let missing: Vec<String> = logicals
            .iter()
            .filter(|logical| self.physical(logical).is_none())
            .map(|logical| (*logical).to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::SchemaMismatch {
                table: self.table.to_string(),
                fields: missing,
            })
        }
    }

    /// Project a physical row into the fixed external shape. Unresolved
    /// fields read through the fallback key and come back as null.
    pub fn row_to_external(&self, row: &Value) -> Value {
        let mut external = Map::new();
        for (field, _) in &self.fields {
            let value = row
                .get(self.lookup_key(field.logical))
                .cloned()
                .unwrap_or(Value::Null);
            external.insert(field.external.to_string(), value);
        }
        Value::Object(external)
    }

    /// Translate external-shape fields into a physical row patch for a
    /// write. Fails when any supplied field has no backing column: the
    /// mapper never invents column names.
    pub fn external_to_row(
        &self,
        fields: Vec<(&str, Value)>,
    ) -> Result<Map<String, Value>, AppError> {
        let mut row = Map::new();
        let mut missing = Vec::new();
        for (logical, value) in fields {
            match self.physical(logical) {
                Some(physical) => {
                    row.insert(physical.to_string(), value);
                }
                None => missing.push(logical.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(row)
        } else {
            Err(AppError::MissingRequiredColumn {
                table: self.table.to_string(),
                fields: missing,
            })
        }
    }
}
