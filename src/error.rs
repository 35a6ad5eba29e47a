use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Error taxonomy surfaced by repositories, mappers and auth.
///
/// Every variant is a stable kind so handlers never have to re-classify a
/// failure before responding.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("schema description unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("table `{table}` is missing columns for: {}", .fields.join(", "))]
    SchemaMismatch { table: String, fields: Vec<String> },

    #[error("table `{table}` has no column to write for: {}", .fields.join(", "))]
    MissingRequiredColumn { table: String, fields: Vec<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::SchemaUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SchemaMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingRequiredColumn { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::SchemaUnavailable(_) => "SCHEMA_UNAVAILABLE",
            AppError::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            AppError::MissingRequiredColumn { .. } => "MISSING_REQUIRED_COLUMN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn to_json(&self) -> Value {
        match self {
            // Operator-facing detail: which logical fields the table lacks.
            AppError::SchemaMismatch { fields, .. }
            | AppError::MissingRequiredColumn { fields, .. } => json!({
                "error": true,
                "message": self.to_string(),
                "code": self.error_code(),
                "missing": fields,
            }),
            // Never leak upstream internals to the client.
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                json!({
                    "error": true,
                    "message": "An error occurred while processing your request",
                    "code": self.error_code(),
                })
            }
            _ => json!({
                "error": true,
                "message": self.to_string(),
                "code": self.error_code(),
            }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_json();
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_missing_fields() {
        let err = AppError::SchemaMismatch {
            table: "projects".into(),
            fields: vec!["user".into(), "content".into()],
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let msg = err.to_string();
        assert!(msg.contains("user"));
        assert!(msg.contains("content"));
    }

    #[test]
    fn credential_errors_are_unauthorized() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
