//! Typed error handling for the advertise admin backend
//!
//! Every failure a request can hit is expressed as an [`AdminError`], which
//! renders itself as a JSON body with a stable error code and the matching
//! HTTP status.
//!
//! # Error Categories
//!
//! - [`EntityError`]: missing records and conflicting writes
//! - [`ValidationError`]: field rules, relation payloads and hook rejections
//! - [`RequestError`]: authentication, authorization and malformed requests
//! - [`ConfigError`]: configuration loading
//! - [`StorageError`]: storage backend failures and unique index violations
//!
//! # Example
//!
//! ```rust,ignore
//! match service.update(&ctx, id, payload).await {
//!     Ok(order) => println!("updated {}", order.id),
//!     Err(AdminError::Validation(ValidationError::Rejected { messages })) => {
//!         for message in messages {
//!             eprintln!("rejected: {}", message);
//!         }
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Unexpected failure, usually a lookup or storage error without a
    /// more specific category
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AdminError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Entity(e) => e.status_code(),
            AdminError::Validation(e) => e.status_code(),
            AdminError::Request(e) => e.status_code(),
            AdminError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Storage(e) => e.status_code(),
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Entity(e) => e.error_code(),
            AdminError::Validation(e) => e.error_code(),
            AdminError::Request(e) => e.error_code(),
            AdminError::Config(_) => "CONFIG_ERROR",
            AdminError::Storage(e) => e.error_code(),
            AdminError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AdminError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            AdminError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            AdminError::Validation(ValidationError::Rejected { messages }) => {
                Some(serde_json::json!({ "messages": messages }))
            }
            AdminError::Storage(StorageError::UniqueViolation { field, value }) => {
                Some(serde_json::json!({ "field": field, "value": value }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Lookup and storage plumbing returns `anyhow` errors; typed errors that were
/// wrapped on the way up are recovered so they keep their status code.
impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<AdminError>() {
            Ok(admin) => return admin,
            Err(err) => err,
        };
        let err = match err.downcast::<StorageError>() {
            Ok(storage) => return AdminError::Storage(storage),
            Err(err) => err,
        };
        let err = match err.downcast::<EntityError>() {
            Ok(entity) => return AdminError::Entity(entity),
            Err(err) => err,
        };
        let err = match err.downcast::<ValidationError>() {
            Ok(validation) => return AdminError::Validation(validation),
            Err(err) => err,
        };
        AdminError::Internal(format!("{:#}", err))
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    /// The operation would break a relationship another record depends on
    #[error("{entity_type} with id '{id}' cannot be modified: {message}")]
    Conflict {
        entity_type: String,
        id: Uuid,
        message: String,
    },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::Conflict { .. } => "ENTITY_CONFLICT",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single failed field rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldErrorDetail {
    pub field: String,
    pub message: String,
}

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One field failed a rule
    #[error("Validation failed for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Several fields failed their rules
    #[error("Validation failed: {} field error(s)", .0.len())]
    FieldErrors(Vec<FieldErrorDetail>),

    /// A relation payload could not be normalized into a foreign key
    #[error("Invalid relation payload for '{field}': {message}")]
    InvalidRelation { field: String, message: String },

    /// Business rules reported one or more errors during `validate_input`
    #[error("Mutation rejected: {}", .messages.join("; "))]
    Rejected { messages: Vec<String> },
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldError { .. } | ValidationError::FieldErrors(_) => {
                "VALIDATION_ERROR"
            }
            ValidationError::InvalidRelation { .. } => "INVALID_RELATION",
            ValidationError::Rejected { .. } => "MUTATION_REJECTED",
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(details)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// No usable credentials on the request
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The caller's roles do not allow the operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Malformed path or query parameters
    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    Parse {
        file: Option<String>,
        message: String,
    },

    #[error("Invalid config: {message}")]
    Invalid { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref().map(|f| format!(" '{}'", f)).unwrap_or_default()
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse {
            file: None,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// A lock guarding in-memory state was poisoned by a panicking writer
    #[error("Storage lock poisoned: {message}")]
    LockPoisoned { message: String },

    /// A unique index rejected the write
    #[error("Unique constraint violated on '{field}' (value: {value})")]
    UniqueViolation { field: String, value: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::LockPoisoned { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            StorageError::UniqueViolation { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::LockPoisoned { .. } => "STORAGE_ERROR",
            StorageError::UniqueViolation { .. } => "UNIQUE_VIOLATION",
        }
    }
}
