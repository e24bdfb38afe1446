//! # Error Handling
//!
//! This module provides unified error handling for the Holocron API,
//! implementing a consistent problem+json response format with trace ID propagation.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use utoipa::ToSchema;

use crate::repositories::RepositoryError;
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Extract current trace ID from the active tracing span (falls back to generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                // Fallback: generate a correlation ID for basic client-server log correlation
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Retry-After hint sent when the database cannot be reached
pub const DATABASE_RETRY_AFTER_SECONDS: u64 = 5;

/// Postgres SQLSTATE, then the SQLite extended codes for PRIMARY KEY and UNIQUE.
const UNIQUE_VIOLATION_CODES: &[&str] = &["23505", "1555", "2067"];

fn is_unique_violation(error: &DbErr) -> bool {
    let (DbErr::Query(RuntimeErr::SqlxError(sqlx_err)) | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))) =
        error
    else {
        return false;
    };

    sqlx_err.as_database_error().is_some_and(|db_error| {
        db_error.is_unique_violation()
            || db_error
                .code()
                .is_some_and(|code| UNIQUE_VIOLATION_CODES.contains(&&*code))
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        // Add Retry-After header if present
        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

// Error mappers for common sources

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        // Log the full error for debugging
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(err) => format!("Character payload does not match schema: {err}"),
            JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {err}"),
            JsonRejection::MissingJsonContentType(_) => {
                "Expected 'Content-Type: application/json'".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        validation_error(&message, serde_json::json!({ "body": rejection.body_text() }))
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Identity already stored");
            return Self::new(
                StatusCode::CONFLICT,
                "CONFLICT",
                "A character with this identity already exists",
            );
        }

        match error {
            DbErr::RecordNotFound(record) => not_found(&record),
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                tracing::error!(%error, "Database unreachable");
                database_unavailable()
            }
            other => {
                tracing::error!(error = %other, "Storage operation failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::InvalidArgument { message } => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
            RepositoryError::Schema { entity, message } => {
                tracing::error!(%entity, %message, "Entity schema misconfigured");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "An internal error occurred",
                )
            }
            RepositoryError::Storage(db_err) => db_err.into(),
        }
    }
}

/// 503 with a Retry-After hint, for when the store cannot be reached
pub fn database_unavailable() -> ApiError {
    ApiError::new(
        StatusCode::SERVICE_UNAVAILABLE,
        "SERVICE_UNAVAILABLE",
        "Character store unavailable",
    )
    .with_retry_after(DATABASE_RETRY_AFTER_SECONDS)
}

/// Create a not found error (404) for the given resource
pub fn not_found(resource: &str) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        &format!("{} not found", resource),
    )
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_api_error_basic() {
        let error = ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "Test error message",
        );

        assert_eq!(error.code, Box::from("VALIDATION_FAILED"));
        assert_eq!(error.message, Box::from("Test error message"));
        assert_eq!(error.details, None);
        assert_eq!(error.retry_after, None);
    }

    #[test]
    fn test_api_error_with_details() {
        let error = ApiError::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Test error message")
            .with_details(json!({"field": "value"}));

        assert_eq!(error.details, Some(Box::new(json!({"field": "value"}))));
    }

    #[test]
    fn test_from_anyhow() {
        let anyhow_error = anyhow::anyhow!("Something went wrong");
        let api_error: ApiError = anyhow_error.into();

        assert_eq!(api_error.code, Box::from("INTERNAL_SERVER_ERROR"));
        assert_eq!(api_error.message, Box::from("An internal error occurred"));
    }

    #[test]
    fn test_content_type_header() {
        let error = ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "Test error");

        let response = error.into_response();

        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
    }

    #[test]
    fn test_retry_after_header() {
        let error = ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database service unavailable",
        )
        .with_retry_after(60);

        let response = error.into_response();

        assert_eq!(response.headers().get("retry-after").unwrap(), "60");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_trace_id_generation() {
        let error = ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "Test error",
        );

        // Outside a request scope the fallback correlation ID is used
        let trace_id = error.trace_id.unwrap();
        assert!(trace_id.starts_with("corr-"));
        assert_eq!(trace_id.len(), 13);
    }

    #[tokio::test]
    async fn test_trace_id_from_active_context() {
        let context = telemetry::TraceContext {
            trace_id: "trace-123".to_string(),
        };

        let error = telemetry::with_trace_context(context, async {
            ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "missing")
        })
        .await;

        assert_eq!(error.trace_id, Some(Box::from("trace-123")));
    }

    #[test]
    fn test_database_error_mapping() {
        let db_error = sea_orm::DbErr::RecordNotFound("test_record".to_string());
        let api_error: ApiError = db_error.into();

        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.code, Box::from("NOT_FOUND"));
        assert!(api_error.message.contains("test_record"));
    }

    #[test]
    fn test_connection_error_is_retryable() {
        let db_error = sea_orm::DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".to_string()));
        let api_error: ApiError = db_error.into();

        assert_eq!(api_error.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api_error.code, Box::from("SERVICE_UNAVAILABLE"));
        assert_eq!(api_error.retry_after, Some(DATABASE_RETRY_AFTER_SECONDS));
    }

    #[test]
    fn test_non_sqlx_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&DbErr::Custom("boom".to_string())));
        assert!(!is_unique_violation(&DbErr::RecordNotFound(
            "characters".to_string()
        )));
    }

    #[tokio::test]
    async fn test_duplicate_identity_maps_to_conflict() {
        use sea_orm::{ConnectionTrait, Database};

        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.execute_unprepared("CREATE TABLE archive_entries (id INTEGER PRIMARY KEY)")
            .await
            .unwrap();
        db.execute_unprepared("INSERT INTO archive_entries (id) VALUES (1)")
            .await
            .unwrap();
        let duplicate = db
            .execute_unprepared("INSERT INTO archive_entries (id) VALUES (1)")
            .await
            .unwrap_err();

        assert!(is_unique_violation(&duplicate));
        let api_error: ApiError = duplicate.into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.code, Box::from("CONFLICT"));
    }

    #[test]
    fn test_invalid_argument_maps_to_bad_request() {
        let api_error: ApiError =
            RepositoryError::invalid_argument("page size must be greater than 0, got 0").into();

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.code, Box::from("VALIDATION_FAILED"));
        assert!(api_error.message.contains("page size"));
    }

    #[test]
    fn test_schema_error_hides_details() {
        let api_error: ApiError =
            RepositoryError::schema("pairs", "composite primary keys are not supported").into();

        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api_error.message.contains("pairs"));
    }

    #[test]
    fn test_storage_error_maps_like_database_error() {
        let api_error: ApiError = RepositoryError::Storage(sea_orm::DbErr::Custom(
            "disk I/O error".to_string(),
        ))
        .into();

        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.message, Box::from("Database error occurred"));
    }

    #[test]
    fn test_validation_error_with_details() {
        let field_errors = json!({ "field": "name" });

        let validation_error = validation_error("Validation failed", field_errors.clone());

        assert_eq!(validation_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation_error.code, Box::from("VALIDATION_FAILED"));
        assert_eq!(validation_error.details, Some(Box::new(field_errors)));
    }

    #[test]
    fn test_not_found_helper() {
        let error = not_found("Character 9999");
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.message, Box::from("Character 9999 not found"));
    }
}
